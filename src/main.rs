use anyhow::Result;
use cascade_filter::{
    cli::{Cli, Commands, handle_config, handle_serve, handle_sync},
    console::init_console,
};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config commands may be repairing an invalid file, so they fall back to defaults.
    let config = match cli.command {
        Commands::Config { .. } => cli.load_config().unwrap_or_default(),
        _ => cli.load_config()?,
    };

    // Initialize console with effective verbosity (CLI takes precedence over config)
    init_console(cli.get_effective_verbosity(config.get_verbosity()));

    match cli.command {
        Commands::Sync {
            form,
            catalog,
            scope,
        } => {
            handle_sync(&config, form.as_deref(), catalog.as_deref(), scope).await?;
        }
        Commands::Serve { catalog, port } => {
            handle_serve(&config, catalog.as_deref(), port).await?;
        }
        Commands::Config { action } => {
            handle_config(action, cli.config.as_deref())?;
        }
    }

    Ok(())
}
