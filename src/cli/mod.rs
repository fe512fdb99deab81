pub mod config;
pub mod serve;
pub mod sync;

use crate::config::{AppConfig, ConfigResult};
use crate::console::VerbosityLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use config::handle_config;
pub use serve::handle_serve;
pub use sync::{FormFile, handle_sync};

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Increase verbosity (-v verbose, -vv debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode - only show errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose", global = true)]
    pub quiet: bool,

    /// Config file to use instead of ~/.config/cascade-filter/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bind the cascading filter to a form and print the dependent selectors
    Sync {
        /// TOML description of the form's selectors
        #[arg(long)]
        form: Option<PathBuf>,

        /// Answer requests from a local catalog instead of the HTTP endpoint
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Select this destination after binding ("" clears it)
        #[arg(long)]
        scope: Option<String>,
    },
    /// Run the development server
    Serve {
        /// Catalog backing the filtered-resources endpoint
        #[arg(long)]
        catalog: Option<PathBuf>,

        #[arg(short, long)]
        port: Option<u16>,
    },
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    Show,
    Set { key: String, value: String },
}

impl Cli {
    pub fn get_verbosity(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else {
            match self.verbose {
                0 => VerbosityLevel::Normal,
                1 => VerbosityLevel::Verbose,
                _ => VerbosityLevel::Debug,
            }
        }
    }

    pub fn get_effective_verbosity(&self, config_verbosity: VerbosityLevel) -> VerbosityLevel {
        if self.quiet || self.verbose > 0 {
            // CLI verbosity specified, use it
            self.get_verbosity()
        } else {
            // No CLI verbosity specified, use config
            config_verbosity
        }
    }

    /// Config from `--config` or the default location, with environment
    /// overrides applied.
    pub fn load_config(&self) -> ConfigResult<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load_from(path)?,
            None => AppConfig::load()?,
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }
}
