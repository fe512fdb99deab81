use std::path::Path;

use crate::cli::ConfigAction;
use crate::config::AppConfig;
use crate::console::console;

pub fn handle_config(action: ConfigAction, path: Option<&Path>) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let config = match path {
                Some(path) => AppConfig::load_from(path)?,
                None => AppConfig::load()?,
            };
            let rendered = toml::to_string_pretty(&config)?;
            for line in rendered.lines() {
                console().plain(line);
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = match path {
                Some(path) if path.exists() => AppConfig::load_from(path)?,
                Some(_) => AppConfig::default(),
                None => AppConfig::load()?,
            };

            if let Err(e) = config.set_value(&key, &value) {
                console().error(&e.to_string());
                return Ok(());
            }

            match path {
                Some(path) => config.save_to(path)?,
                None => config.save()?,
            }
            console().success(&format!("{} updated successfully", key));
        }
    }

    Ok(())
}
