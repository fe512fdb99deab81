pub mod error;

use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

use crate::client::EndpointConfig;
use crate::console::VerbosityLevel;
use crate::form::{FieldNames, ReadinessPolicy};

pub use error::{ConfigError, ConfigResult};

/// Dotted keys accepted by `config set`.
pub const CONFIG_KEYS: &[&str] = &[
    "verbosity",
    "endpoint.base_url",
    "endpoint.path",
    "endpoint.query_param",
    "endpoint.timeout_secs",
    "fields.primary",
    "fields.attractions",
    "fields.restaurants",
    "fields.hotels",
    "fields.placeholder_label",
    "readiness.poll_interval_ms",
    "readiness.max_attempts",
    "server.host",
    "server.port",
    "server.allowed_hosts",
    "server.catalog",
    "proxy.prefix",
    "proxy.target",
    "proxy.target_env",
    "proxy.change_origin",
    "proxy.secure",
];

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_hosts: Vec<String>,
    pub catalog: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5173,
            allowed_hosts: vec!["localhost".to_string(), "127.0.0.1".to_string()],
            catalog: None,
        }
    }
}

/// Reverse-proxy rule of the development server.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ProxyConfig {
    pub prefix: String,
    pub target: String,
    /// Environment variable that overrides `target` when set.
    pub target_env: String,
    pub change_origin: bool,
    /// Verify the upstream's TLS certificate.
    pub secure: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            prefix: "/api".to_string(),
            target: "http://localhost:7000".to_string(),
            target_env: "VITE_API_URL".to_string(),
            change_origin: true,
            secure: false,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub verbosity: Option<String>,
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub fields: FieldNames,
    #[serde(default)]
    pub readiness: ReadinessPolicy,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
}

impl AppConfig {
    /// Loads the user config, writing the defaults on first use.
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializationError(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> ConfigResult<PathBuf> {
        let mut path = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
        path.push(".config");
        path.push("cascade-filter");
        path.push("config.toml");
        Ok(path)
    }

    /// Get the configured verbosity level, falling back to Normal if not set
    pub fn get_verbosity(&self) -> VerbosityLevel {
        self.verbosity
            .as_deref()
            .and_then(VerbosityLevel::parse)
            .unwrap_or(VerbosityLevel::Normal)
    }

    /// Environment overrides, looked up through `lookup` so callers decide
    /// where values come from.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(target) = lookup(&self.proxy.target_env).filter(|v| !v.trim().is_empty()) {
            self.proxy.target = target;
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(verbosity) = &self.verbosity {
            if VerbosityLevel::parse(verbosity).is_none() {
                return Err(invalid("verbosity", verbosity));
            }
        }
        if !is_http_url(&self.endpoint.base_url) {
            return Err(invalid("endpoint.base_url", &self.endpoint.base_url));
        }
        if !self.endpoint.path.starts_with('/') {
            return Err(invalid("endpoint.path", &self.endpoint.path));
        }
        if self.endpoint.query_param.is_empty() {
            return Err(invalid("endpoint.query_param", &self.endpoint.query_param));
        }
        if !self.proxy.prefix.starts_with('/') || self.proxy.prefix.len() < 2 {
            return Err(invalid("proxy.prefix", &self.proxy.prefix));
        }
        if !is_http_url(&self.proxy.target) {
            return Err(invalid("proxy.target", &self.proxy.target));
        }
        let names = [
            &self.fields.primary,
            &self.fields.attractions,
            &self.fields.restaurants,
            &self.fields.hotels,
        ];
        for (i, name) in names.iter().enumerate() {
            if name.is_empty() || names[..i].contains(name) {
                return Err(invalid("fields", name));
            }
        }
        Ok(())
    }

    /// Sets one dotted key, e.g. `proxy.target` or `readiness.max_attempts`.
    pub fn set_value(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        let owned = value.to_string();
        match key {
            "verbosity" => {
                if VerbosityLevel::parse(value).is_none() {
                    return Err(invalid(key, value));
                }
                self.verbosity = Some(owned);
            }
            "endpoint.base_url" => self.endpoint.base_url = owned,
            "endpoint.path" => self.endpoint.path = owned,
            "endpoint.query_param" => self.endpoint.query_param = owned,
            "endpoint.timeout_secs" => self.endpoint.timeout_secs = parse(key, value)?,
            "fields.primary" => self.fields.primary = owned,
            "fields.attractions" => self.fields.attractions = owned,
            "fields.restaurants" => self.fields.restaurants = owned,
            "fields.hotels" => self.fields.hotels = owned,
            "fields.placeholder_label" => self.fields.placeholder_label = owned,
            "readiness.poll_interval_ms" => self.readiness.poll_interval_ms = parse(key, value)?,
            "readiness.max_attempts" => self.readiness.max_attempts = parse(key, value)?,
            "server.host" => self.server.host = owned,
            "server.port" => self.server.port = parse(key, value)?,
            "server.allowed_hosts" => {
                self.server.allowed_hosts = value
                    .split(',')
                    .map(str::trim)
                    .filter(|h| !h.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            "server.catalog" => self.server.catalog = Some(PathBuf::from(value)),
            "proxy.prefix" => self.proxy.prefix = owned,
            "proxy.target" => self.proxy.target = owned,
            "proxy.target_env" => self.proxy.target_env = owned,
            "proxy.change_origin" => self.proxy.change_origin = parse(key, value)?,
            "proxy.secure" => self.proxy.secure = parse(key, value)?,
            _ => {
                return Err(ConfigError::UnknownConfigKey {
                    key: key.to_string(),
                });
            }
        }
        self.validate()
    }
}

fn invalid(field: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
