use std::path::PathBuf;
use thiserror::Error;

use super::CONFIG_KEYS;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No cascade-filter config at {path}")]
    NotFound { path: PathBuf },

    #[error("Config file is not valid TOML: {0}")]
    InvalidToml(#[from] toml::de::Error),

    #[error("'{value}' is not a valid value for {field}")]
    InvalidValue { field: String, value: String },

    #[error("Cannot locate ~/.config/cascade-filter: no home directory")]
    NoHomeDirectory,

    #[error("Unknown config key '{key}' (valid keys: {})", CONFIG_KEYS.join(", "))]
    UnknownConfigKey { key: String },

    #[error("Could not render config as TOML: {0}")]
    SerializationError(String),

    #[error("Config file I/O failed: {0}")]
    IoError(#[from] std::io::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
