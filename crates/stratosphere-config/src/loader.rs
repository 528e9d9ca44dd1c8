//! Configuration loading: YAML file, `.env`, then environment overrides.

use crate::schema::Config;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use stratosphere_common::{LogFormat, Result as CommonResult, StratosphereError};
use thiserror::Error;
use tracing::debug;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_VAR: &str = "STRATOSPHERE_CONFIG_PATH";

/// File names probed in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["stratosphere.yaml", "stratosphere.yml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        /// Variable name.
        var: String,
        /// Underlying parse failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),
}

impl From<ConfigError> for StratosphereError {
    fn from(err: ConfigError) -> Self {
        StratosphereError::config(err.to_string())
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Resolves and loads the configuration.
    ///
    /// Lookup order: `explicit`, then `STRATOSPHERE_CONFIG_PATH`, then
    /// `stratosphere.yaml` / `stratosphere.yml` in the working directory,
    /// then defaults. Environment overrides are applied in every case.
    pub fn load(explicit: Option<&Path>) -> CommonResult<Config> {
        dotenvy::dotenv().ok();

        let config = match Self::resolve_path(explicit) {
            Some(path) => Self::load_config(&path)?,
            None => {
                debug!("No configuration file found, using defaults");
                let mut config = Config::default();
                Self::apply_env_overrides(&mut config)?;
                config.validate_all().map_err(ConfigError::ValidationError)?;
                config
            }
        };

        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::MissingConfig(format!(
                "configuration file '{}' does not exist",
                path.display()
            )));
        }

        debug!(path = %path.display(), "Loading configuration file");
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse_yaml(&content)?;

        Self::apply_env_overrides(&mut config)?;

        config.validate_all().map_err(ConfigError::ValidationError)?;

        Ok(config)
    }

    /// Parses YAML into a configuration; missing sections take defaults.
    /// An empty document yields the default configuration.
    pub fn parse_yaml(content: &str) -> Result<Config, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        if let Ok(path) = env::var(CONFIG_PATH_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        DEFAULT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|candidate| candidate.exists())
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        Self::apply_overrides_from(config, |var| env::var(var).ok())
    }

    /// Applies overrides read through `lookup`, which maps a variable name
    /// to its value when set.
    pub fn apply_overrides_from<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Telegram gateway
        if let Some(url) = lookup("TELEGRAM_GATEWAY_URL") {
            config.telegram.gateway_url = url;
        }
        if let Some(token) = lookup("TELEGRAM_GATEWAY_TOKEN") {
            config.telegram.api_token = Some(token);
        }
        if let Some(session) = lookup("TELEGRAM_SESSION_NAME") {
            config.telegram.session_name = session;
        }
        if let Some(timeout) = lookup("TELEGRAM_TIMEOUT") {
            config.telegram.timeout_seconds = parse_var("TELEGRAM_TIMEOUT", &timeout)?;
        }

        // Notion
        if let Some(api_key) = lookup("NOTION_API_KEY") {
            config.notion.api_key = api_key;
        }
        if let Some(base_url) = lookup("NOTION_BASE_URL") {
            config.notion.base_url = base_url;
        }
        if let Some(version) = lookup("NOTION_VERSION") {
            config.notion.version = version;
        }
        if let Some(id) = lookup("NOTION_CHANNELS_DATABASE_ID") {
            config.notion.channels_database_id = id;
        }
        if let Some(id) = lookup("NOTION_STATE_DATABASE_ID") {
            config.notion.state_database_id = id;
        }
        if let Some(id) = lookup("NOTION_TIMESERIES_DATABASE_ID") {
            config.notion.timeseries_database_id = id;
        }
        if let Some(rate) = lookup("NOTION_REQUESTS_PER_SECOND") {
            config.notion.requests_per_second = parse_var("NOTION_REQUESTS_PER_SECOND", &rate)?;
        }
        if let Some(timeout) = lookup("NOTION_TIMEOUT") {
            config.notion.timeout_seconds = parse_var("NOTION_TIMEOUT", &timeout)?;
        }

        // Pipeline
        if let Some(timezone) = lookup("SYNC_TIMEZONE") {
            config.sync.timezone = timezone;
        }

        // Logging
        if let Some(level) = lookup("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            config.logging.format = parse_var::<LogFormat>("LOG_FORMAT", &format)?;
        }
        if let Some(file) = lookup("LOG_FILE") {
            config.logging.file = if file.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(file))
            };
        }
        if let Some(spans) = lookup("LOG_SPANS") {
            config.logging.spans = parse_var("LOG_SPANS", &spans)?;
        }

        Ok(())
    }
}

fn parse_var<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse().map_err(|e| ConfigError::EnvParseError {
        var: var.to_string(),
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_overrides_applied() {
        let mut config = Config::default();
        let lookup = lookup_from(&[
            ("NOTION_API_KEY", "secret_abc"),
            ("NOTION_STATE_DATABASE_ID", "state-db"),
            ("NOTION_REQUESTS_PER_SECOND", "5"),
            ("TELEGRAM_TIMEOUT", " 45 "),
            ("SYNC_TIMEZONE", "Europe/Berlin"),
            ("LOG_FORMAT", "json"),
            ("LOG_SPANS", "true"),
        ]);

        ConfigLoader::apply_overrides_from(&mut config, lookup).unwrap();

        assert_eq!(config.notion.api_key, "secret_abc");
        assert_eq!(config.notion.state_database_id, "state-db");
        assert_eq!(config.notion.requests_per_second, 5);
        assert_eq!(config.telegram.timeout_seconds, 45);
        assert_eq!(config.sync.timezone, "Europe/Berlin");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.logging.spans);
        assert!(config.logging.to_logging_config(false).include_spans);
    }

    #[test]
    fn test_override_parse_error_names_variable() {
        let mut config = Config::default();
        let lookup = lookup_from(&[("NOTION_TIMEOUT", "soon")]);

        let err = ConfigLoader::apply_overrides_from(&mut config, lookup).unwrap_err();
        match err {
            ConfigError::EnvParseError { var, .. } => assert_eq!(var, "NOTION_TIMEOUT"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_log_file_clears_path() {
        let mut config = Config::default();
        config.logging.file = Some(PathBuf::from("/tmp/stratosphere.log"));

        ConfigLoader::apply_overrides_from(&mut config, lookup_from(&[("LOG_FILE", "")])).unwrap();
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_parse_empty_yaml_is_default() {
        let config = ConfigLoader::parse_yaml("   \n").unwrap();
        assert_eq!(config.notion.version, crate::defaults::DEFAULT_NOTION_VERSION);
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::load_config("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::MissingConfig(_)));
    }
}
