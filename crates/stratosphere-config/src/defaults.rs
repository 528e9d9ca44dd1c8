//! Default values for every configuration section.

use crate::schema::*;
use stratosphere_common::LogFormat;

/// Default Notion API base URL.
pub const DEFAULT_NOTION_BASE_URL: &str = "https://api.notion.com/v1";

/// Default `Notion-Version` header value.
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";

/// Notion's documented average request limit.
pub const DEFAULT_NOTION_REQUESTS_PER_SECOND: u32 = 3;

/// Default session name of the statistics gateway.
pub const DEFAULT_TELEGRAM_SESSION: &str = "main_session";

impl Default for Config {
    fn default() -> Self {
        Self {
            telegram: TelegramConfig::default(),
            notion: NotionConfig::default(),
            sync: SyncConfig::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            gateway_url: "http://localhost:8700".to_string(),
            api_token: None,
            session_name: DEFAULT_TELEGRAM_SESSION.to_string(),
            timeout_seconds: 60,
        }
    }
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_NOTION_BASE_URL.to_string(),
            version: DEFAULT_NOTION_VERSION.to_string(),
            channels_database_id: String::new(),
            state_database_id: String::new(),
            timeseries_database_id: String::new(),
            requests_per_second: DEFAULT_NOTION_REQUESTS_PER_SECOND,
            timeout_seconds: 30,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Pretty,
            file: None,
            spans: false,
            targets: true,
        }
    }
}
