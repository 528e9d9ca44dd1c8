//! Configuration schema definitions using serde with validation attributes.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use stratosphere_common::{DateZone, LogFormat, LoggingConfig, Result as CommonResult};
use validator::{Validate, ValidationError, ValidationErrors};

/// Main configuration structure for Stratosphere.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    /// Telegram statistics gateway configuration.
    #[validate]
    pub telegram: TelegramConfig,
    /// Notion API configuration.
    #[validate]
    pub notion: NotionConfig,
    /// Pipeline configuration.
    pub sync: SyncConfig,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

/// Telegram statistics gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TelegramConfig {
    /// Base URL of the statistics gateway.
    #[validate(url(message = "Telegram gateway URL must be a valid URL"))]
    pub gateway_url: String,
    /// Optional bearer token for the gateway.
    pub api_token: Option<String>,
    /// Name of the logged-in user session held by the gateway.
    #[validate(length(min = 1, message = "Telegram session name cannot be empty"))]
    pub session_name: String,
    /// Request timeout in seconds.
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,
}

/// Notion API configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct NotionConfig {
    /// Notion integration secret.
    #[validate(length(min = 1, message = "NOTION_API_KEY is not set"))]
    pub api_key: String,
    /// Notion API base URL.
    #[validate(url(message = "Notion base URL must be a valid URL"))]
    pub base_url: String,
    /// Value of the `Notion-Version` header.
    #[validate(length(min = 1, message = "Notion API version cannot be empty"))]
    pub version: String,
    /// Database listing the channels to process.
    #[validate(length(min = 1, message = "Channels list database ID is not set"))]
    pub channels_database_id: String,
    /// Destination database for state rows.
    #[validate(length(min = 1, message = "Channel state database ID is not set"))]
    pub state_database_id: String,
    /// Destination database for timeseries rows.
    #[validate(length(min = 1, message = "Channel timeseries database ID is not set"))]
    pub timeseries_database_id: String,
    /// Request pacing.
    #[validate(range(min = 1, max = 100, message = "Requests per second must be between 1 and 100"))]
    pub requests_per_second: u32,
    /// Request timeout in seconds.
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,
}

/// Pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Zone used for run dates and graph timestamps: `UTC`, `local` or an
    /// IANA name.
    pub timezone: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log filter directives (trace, debug, info, warn, error or
    /// `target=level` lists).
    pub level: String,
    /// Output format.
    pub format: LogFormat,
    /// Optional log file path.
    pub file: Option<PathBuf>,
    /// Log span open/close events, useful for per-channel timing.
    pub spans: bool,
    /// Include the target module in each line.
    pub targets: bool,
}

impl Config {
    /// Comprehensive validation of the entire configuration.
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if let Err(err) = crate::validation::validate_timezone(&self.sync.timezone) {
            errors.add("timezone", err);
        }

        if let Err(err) = crate::validation::validate_log_level(&self.logging.level) {
            errors.add("level", err);
        }

        if let Some(token) = &self.telegram.api_token {
            if token.trim().is_empty() {
                let mut err = ValidationError::new("empty_api_token");
                err.message = Some("Telegram gateway token is set but empty".into());
                errors.add("api_token", err);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Zone used for run dates and graph timestamps.
    pub fn date_zone(&self) -> CommonResult<DateZone> {
        self.sync.timezone.parse()
    }
}

impl LoggingSettings {
    /// Converts to the logging setup understood by `stratosphere-common`.
    pub fn to_logging_config(&self, debug: bool) -> LoggingConfig {
        LoggingConfig {
            level: self.level.clone(),
            format: self.format,
            file_path: self.file.clone(),
            include_spans: self.spans,
            include_targets: self.targets,
        }
        .with_debug(debug)
    }
}
