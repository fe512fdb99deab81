// Configuration loading, overrides, validation and `config set` keys.

use super::*;
use tempfile::TempDir;

#[test]
fn default_config_matches_dev_server_contract() {
    let config = AppConfig::default();

    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 5173);
    assert_eq!(config.server.allowed_hosts, vec!["localhost", "127.0.0.1"]);
    assert_eq!(config.proxy.prefix, "/api");
    assert_eq!(config.proxy.target, "http://localhost:7000");
    assert!(config.proxy.change_origin);
    assert!(!config.proxy.secure);
    assert_eq!(config.endpoint.path, "/admin/get_filtered_resources/");
    assert_eq!(config.endpoint.query_param, "destination_id");
    assert!(config.validate().is_ok());
}

#[test]
fn partial_file_fills_in_defaults() {
    let config: AppConfig = toml::from_str(
        r#"
        verbosity = "verbose"

        [endpoint]
        base_url = "http://admin.internal:8000"

        [proxy]
        secure = true
        "#,
    )
    .unwrap();

    assert_eq!(config.get_verbosity(), VerbosityLevel::Verbose);
    assert_eq!(config.endpoint.base_url, "http://admin.internal:8000");
    assert_eq!(config.endpoint.path, "/admin/get_filtered_resources/");
    assert!(config.proxy.secure);
    assert_eq!(config.proxy.target, "http://localhost:7000");
    assert_eq!(config.fields, FieldNames::default());
}

#[test]
fn unknown_verbosity_falls_back_to_normal() {
    let config = AppConfig {
        verbosity: Some("chatty".to_string()),
        ..AppConfig::default()
    };
    assert_eq!(config.get_verbosity(), VerbosityLevel::Normal);
    assert!(config.validate().is_err());
}

#[test]
fn env_override_replaces_proxy_target() {
    let mut config = AppConfig::default();

    config.apply_env_overrides(|key| {
        (key == "VITE_API_URL").then(|| "https://api.example.com".to_string())
    });

    assert_eq!(config.proxy.target, "https://api.example.com");
}

#[test]
fn blank_env_override_is_ignored() {
    let mut config = AppConfig::default();

    config.apply_env_overrides(|_| Some("  ".to_string()));

    assert_eq!(config.proxy.target, "http://localhost:7000");
}

#[test]
fn env_override_uses_configured_variable_name() {
    let mut config = AppConfig::default();
    config.proxy.target_env = "UPSTREAM".to_string();

    config.apply_env_overrides(|key| match key {
        "UPSTREAM" => Some("http://upstream:9000".to_string()),
        _ => Some("http://wrong:1".to_string()),
    });

    assert_eq!(config.proxy.target, "http://upstream:9000");
}

#[test]
fn save_and_load_round_trip_through_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let mut config = AppConfig::default();
    config.server.port = 8080;
    config.fields.placeholder_label = "(none)".to_string();

    config.save_to(&path).unwrap();
    let loaded = AppConfig::load_from(&path).unwrap();

    assert_eq!(loaded, config);
}

#[test]
fn load_from_missing_path_is_not_found() {
    let dir = TempDir::new().unwrap();
    let err = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }));
}

#[test]
fn load_from_rejects_bad_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[server\nport = ").unwrap();

    let err = AppConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidToml(_)));
}

#[test]
fn load_from_rejects_invalid_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[proxy]\nprefix = \"api\"\n").unwrap();

    let err = AppConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "proxy.prefix"));
}

#[test]
fn duplicate_field_names_are_rejected() {
    let mut config = AppConfig::default();
    config.fields.hotels = config.fields.attractions.clone();
    assert!(config.validate().is_err());
}

#[test]
fn set_value_updates_known_keys() {
    let mut config = AppConfig::default();

    config.set_value("server.port", "9000").unwrap();
    config.set_value("proxy.change_origin", "false").unwrap();
    config.set_value("readiness.max_attempts", "5").unwrap();
    config
        .set_value("server.allowed_hosts", "localhost, stq.example.online,")
        .unwrap();
    config.set_value("verbosity", "debug").unwrap();

    assert_eq!(config.server.port, 9000);
    assert!(!config.proxy.change_origin);
    assert_eq!(config.readiness.max_attempts, 5);
    assert_eq!(
        config.server.allowed_hosts,
        vec!["localhost", "stq.example.online"]
    );
    assert_eq!(config.get_verbosity(), VerbosityLevel::Debug);
}

#[test]
fn set_value_rejects_unknown_key() {
    let mut config = AppConfig::default();
    let err = config.set_value("proxy.timeout", "3").unwrap_err();
    assert!(matches!(err, ConfigError::UnknownConfigKey { .. }));
    assert!(err.to_string().contains("proxy.target_env"));
}

#[test]
fn every_listed_key_is_settable() {
    let samples = [
        ("verbosity", "quiet"),
        ("endpoint.timeout_secs", "5"),
        ("readiness.poll_interval_ms", "10"),
        ("readiness.max_attempts", "3"),
        ("server.port", "8080"),
        ("proxy.change_origin", "true"),
        ("proxy.secure", "true"),
        ("endpoint.base_url", "http://admin:8000"),
        ("endpoint.path", "/filter/"),
        ("proxy.prefix", "/backend"),
        ("proxy.target", "http://api:7000"),
    ];
    for key in CONFIG_KEYS {
        let mut config = AppConfig::default();
        let value = samples
            .iter()
            .find(|(k, _)| k == key)
            .map_or_else(|| format!("custom_{}", key.replace('.', "_")), |(_, v)| v.to_string());
        let result = config.set_value(key, &value);
        assert!(
            !matches!(result, Err(ConfigError::UnknownConfigKey { .. })),
            "{} rejected as unknown",
            key
        );
    }
}

#[test]
fn set_value_rejects_unparseable_numbers() {
    let mut config = AppConfig::default();
    let err = config.set_value("server.port", "seventy").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
    assert_eq!(config.server.port, 5173);
}

#[test]
fn set_value_rejects_non_http_target() {
    let mut config = AppConfig::default();
    assert!(config.set_value("proxy.target", "localhost:7000").is_err());
}
