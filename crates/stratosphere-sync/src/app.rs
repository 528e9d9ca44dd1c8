//! Wiring of concrete clients from a validated configuration.

use crate::{
    error::{SyncError, SyncResult},
    orchestrator::{Orchestrator, SyncTables},
};
use std::sync::Arc;
use stratosphere_common::TableId;
use stratosphere_config::Config;
use stratosphere_notion::{NotionClient, NotionClientConfig};
use stratosphere_telegram::{TelegramClientConfig, TelegramStatsClient};
use tracing::info;

/// Gateway client settings from the configuration.
pub fn telegram_client_config(config: &Config) -> TelegramClientConfig {
    let mut client = TelegramClientConfig::new(&config.telegram.gateway_url)
        .with_session(&config.telegram.session_name)
        .with_timeout(config.telegram.timeout_seconds);
    if let Some(token) = &config.telegram.api_token {
        client = client.with_token(token);
    }
    client
}

/// Notion client settings from the configuration.
pub fn notion_client_config(config: &Config) -> NotionClientConfig {
    NotionClientConfig::new(&config.notion.api_key, &config.notion.channels_database_id)
        .with_base_url(&config.notion.base_url)
        .with_version(&config.notion.version)
        .with_rate_limit(config.notion.requests_per_second)
        .with_timeout(config.notion.timeout_seconds)
}

/// Destination tables from the configuration.
pub fn sync_tables(config: &Config) -> SyncTables {
    SyncTables {
        state: TableId::new(&config.notion.state_database_id),
        timeseries: TableId::new(&config.notion.timeseries_database_id),
    }
}

/// Builds an orchestrator over the real Telegram and Notion clients.
pub fn build_orchestrator(config: &Config) -> SyncResult<Orchestrator> {
    let zone = config.date_zone().map_err(SyncError::Config)?;

    let telegram = TelegramStatsClient::new(telegram_client_config(config)).map_err(SyncError::Config)?;
    let notion = Arc::new(NotionClient::new(notion_client_config(config)).map_err(SyncError::Config)?);

    info!(%zone, gateway = %config.telegram.gateway_url, "Clients initialized");

    Ok(Orchestrator::new(
        notion.clone(),
        Arc::new(telegram),
        notion,
        sync_tables(config),
        zone,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        let mut config = Config::default();
        config.telegram.api_token = Some("gw-token".to_string());
        config.notion.api_key = "secret".to_string();
        config.notion.channels_database_id = "channels".to_string();
        config.notion.state_database_id = "state".to_string();
        config.notion.timeseries_database_id = "timeseries".to_string();
        config
    }

    #[test]
    fn test_client_configs_follow_settings() {
        let config = config();

        let telegram = telegram_client_config(&config);
        assert_eq!(telegram.api_token.as_deref(), Some("gw-token"));
        assert_eq!(telegram.timeout_secs, 60);

        let notion = notion_client_config(&config);
        assert_eq!(notion.channels_database_id, "channels");
        assert_eq!(notion.rate_limit_per_sec, 3);
        assert_eq!(notion.version, "2022-06-28");

        let tables = sync_tables(&config);
        assert_eq!(tables.state.as_str(), "state");
        assert_eq!(tables.timeseries.as_str(), "timeseries");
    }

    #[test]
    fn test_build_orchestrator() {
        let orchestrator = build_orchestrator(&config()).unwrap();
        assert_eq!(orchestrator.phase(), crate::Phase::Idle);
    }

    #[test]
    fn test_build_rejects_missing_api_key() {
        let mut config = config();
        config.notion.api_key.clear();
        assert!(matches!(build_orchestrator(&config), Err(SyncError::Config(_))));
    }
}
