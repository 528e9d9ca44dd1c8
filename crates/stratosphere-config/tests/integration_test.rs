//! Integration tests for stratosphere-config crate.

use std::io::Write;
use stratosphere_common::{DateZone, LogFormat};
use stratosphere_config::{Config, ConfigError, ConfigLoader};
use tempfile::NamedTempFile;

fn complete_config() -> Config {
    let mut config = Config::default();
    config.notion.api_key = "secret_test".to_string();
    config.notion.channels_database_id = "channels-db".to_string();
    config.notion.state_database_id = "state-db".to_string();
    config.notion.timeseries_database_id = "timeseries-db".to_string();
    config
}

#[test]
fn test_default_config_validation() {
    // Defaults leave the Notion credentials and database IDs unset
    let config = Config::default();
    let errors = config.validate_all().unwrap_err();
    assert!(errors.errors().contains_key("notion"));

    assert!(complete_config().validate_all().is_ok());
}

#[test]
fn test_invalid_timezone_and_level_rejected() {
    let mut config = complete_config();
    config.sync.timezone = "Mars/Olympus".to_string();
    config.logging.level = String::new();

    let errors = config.validate_all().unwrap_err();
    let fields = errors.field_errors();
    assert!(fields.contains_key("timezone"));
    assert!(fields.contains_key("level"));
}

#[test]
fn test_blank_gateway_token_rejected() {
    let mut config = complete_config();
    config.telegram.api_token = Some("  ".to_string());

    let errors = config.validate_all().unwrap_err();
    assert!(errors.field_errors().contains_key("api_token"));
}

#[test]
fn test_yaml_partial_sections_take_defaults() {
    let yaml = r#"
notion:
  api_key: secret_yaml
  channels_database_id: channels
  state_database_id: state
  timeseries_database_id: timeseries
sync:
  timezone: Asia/Tokyo
logging:
  format: compact
"#;

    let config = ConfigLoader::parse_yaml(yaml).unwrap();
    assert_eq!(config.notion.api_key, "secret_yaml");
    assert_eq!(config.notion.version, "2022-06-28");
    assert_eq!(config.notion.requests_per_second, 3);
    assert_eq!(config.telegram.session_name, "main_session");
    assert_eq!(config.logging.format, LogFormat::Compact);
    assert_eq!(config.logging.level, "warn");
    assert!(matches!(config.date_zone().unwrap(), DateZone::Named(_)));
    assert!(config.validate_all().is_ok());
}

#[test]
fn test_load_config_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "notion:\n  api_key: k\n  channels_database_id: c\n  state_database_id: s\n  timeseries_database_id: t\ntelegram:\n  gateway_url: http://gateway.internal:8700\n  timeout_seconds: 20"
    )
    .unwrap();

    let config = ConfigLoader::load_config(file.path()).unwrap();
    assert_eq!(config.telegram.gateway_url, "http://gateway.internal:8700");
    assert_eq!(config.telegram.timeout_seconds, 20);
}

#[test]
fn test_load_config_rejects_bad_yaml() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "notion: [unterminated").unwrap();

    let err = ConfigLoader::load_config(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
fn test_load_config_reports_validation_failure() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "notion:\n  requests_per_second: 0").unwrap();

    let err = ConfigLoader::load_config(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
}

#[test]
fn test_logging_settings_conversion() {
    let mut config = complete_config();
    config.logging.level = "info".to_string();

    assert_eq!(config.logging.to_logging_config(false).level, "info");
    assert_eq!(config.logging.to_logging_config(true).level, "debug");
    assert!(!config.logging.to_logging_config(false).include_spans);
    assert!(config.logging.to_logging_config(false).include_targets);
}
