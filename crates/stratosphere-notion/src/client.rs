//! Notion API client serving the channel list and the upload tables.

use crate::body::{self, QueryResponse};
use async_trait::async_trait;
use chrono::NaiveDate;
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::Client;
use serde_json::Value;
use std::{num::NonZeroU32, sync::Arc, time::Duration};
use stratosphere_common::{
    ChannelSource, Handle, RecordSink, Result, RowFields, StratosphereError, TableId,
};
use tracing::{debug, info, instrument, warn};

/// Default Notion API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";

/// Default `Notion-Version` header.
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";

/// Configuration for the Notion API client
#[derive(Debug, Clone)]
pub struct NotionClientConfig {
    /// Integration secret
    pub api_key: String,
    /// API base URL (default: "https://api.notion.com/v1")
    pub base_url: String,
    /// `Notion-Version` header value
    pub version: String,
    /// Database listing the channels to process
    pub channels_database_id: String,
    /// Rate limit: requests per second (default: 3)
    pub rate_limit_per_sec: u32,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for NotionClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            version: DEFAULT_NOTION_VERSION.to_string(),
            channels_database_id: String::new(),
            rate_limit_per_sec: 3,
            timeout_secs: 30,
        }
    }
}

impl NotionClientConfig {
    /// Create a configuration with the minimum required parameters
    pub fn new(api_key: impl Into<String>, channels_database_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            channels_database_id: channels_database_id.into(),
            ..Default::default()
        }
    }

    /// Set the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the `Notion-Version` header
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the rate limit
    pub fn with_rate_limit(mut self, rate_limit_per_sec: u32) -> Self {
        self.rate_limit_per_sec = rate_limit_per_sec;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Notion API client with request pacing
#[derive(Debug, Clone)]
pub struct NotionClient {
    client: Client,
    config: NotionClientConfig,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl NotionClient {
    /// Create a new Notion client with the given configuration
    pub fn new(config: NotionClientConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(StratosphereError::config("NOTION_API_KEY is not set"));
        }
        if config.channels_database_id.trim().is_empty() {
            return Err(StratosphereError::config("Channels list database ID is not set"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StratosphereError::network_with_source("Failed to create HTTP client", e))?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.rate_limit_per_sec)
                .ok_or_else(|| StratosphereError::config("Rate limit must be greater than 0"))?,
        );
        let rate_limiter = Arc::new(DefaultDirectRateLimiter::direct(quota));

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Sends a paced, authenticated POST and returns the JSON response.
    #[instrument(skip(self, payload), fields(path = %path))]
    async fn post(&self, path: &str, payload: &Value) -> Result<Value> {
        self.rate_limiter.until_ready().await;

        let url = self.endpoint(path);
        debug!("Making request to: {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header("Notion-Version", &self.config.version)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| StratosphereError::network_with_source("Failed to read response body", e))?;

        if !status.is_success() {
            let detail = body::error_detail(&text);
            warn!(status = status.as_u16(), "Notion request failed: {}", detail);
            return Err(StratosphereError::notion_with_status(
                format!("{} returned {}: {}", path, status, detail),
                status.as_u16(),
            ));
        }

        serde_json::from_str(&text).map_err(|e| {
            StratosphereError::notion_with_status(format!("{} returned invalid JSON: {}", path, e), status.as_u16())
        })
    }

    /// Runs one page of a query against `database_id`.
    pub async fn query_database(&self, database_id: &str, payload: &Value) -> Result<QueryResponse> {
        let value = self.post(&format!("databases/{}/query", database_id), payload).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Creates a row in `database_id`.
    pub async fn add_database_entry(&self, database_id: &str, fields: &RowFields) -> Result<()> {
        let payload = body::create_page(database_id, fields)?;
        self.post("pages", &payload).await?;
        Ok(())
    }

    /// Titles of every page in the channels database, in query order.
    #[instrument(skip(self))]
    pub async fn list_channels(&self) -> Result<Vec<Handle>> {
        let database_id = self.config.channels_database_id.as_str();
        let mut handles = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .query_database(database_id, &body::list_query(cursor.as_deref()))
                .await?;

            for row in &page.results {
                match row.title().map(Handle::new) {
                    Some(Ok(handle)) => handles.push(handle),
                    _ => warn!(page_id = %row.id, "Skipping channel row without a title"),
                }
            }

            match (page.has_more, page.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                (true, None) => {
                    warn!("Query reported more results without a cursor, stopping");
                    break;
                }
                (false, _) => break,
            }
        }

        info!(count = handles.len(), "Fetched channels to process");
        Ok(handles)
    }

    /// Whether `table` holds a row for `handle` on `date`.
    #[instrument(skip(self), fields(table = %table))]
    pub async fn is_present(&self, table: &TableId, handle: &str, date: NaiveDate) -> Result<bool> {
        let response = self
            .query_database(table.as_str(), &body::exists_query(handle, date))
            .await?;
        Ok(!response.results.is_empty())
    }
}

#[async_trait]
impl ChannelSource for NotionClient {
    async fn channels_to_process(&self) -> Result<Vec<Handle>> {
        self.list_channels().await
    }
}

#[async_trait]
impl RecordSink for NotionClient {
    async fn exists(&self, table: &TableId, handle: &str, date: NaiveDate) -> Result<bool> {
        self.is_present(table, handle, date).await
    }

    async fn insert(&self, table: &TableId, fields: &RowFields) -> Result<()> {
        self.add_database_entry(table.as_str(), fields).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = NotionClientConfig::new("secret", "channels")
            .with_base_url("http://localhost:9999/v1/")
            .with_version("2025-01-01")
            .with_rate_limit(10)
            .with_timeout(5);

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.channels_database_id, "channels");
        assert_eq!(config.version, "2025-01-01");
        assert_eq!(config.rate_limit_per_sec, 10);
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_endpoint_joins_base() {
        let client = NotionClient::new(
            NotionClientConfig::new("secret", "channels").with_base_url("http://localhost:9999/v1/"),
        )
        .unwrap();
        assert_eq!(client.endpoint("pages"), "http://localhost:9999/v1/pages");
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(NotionClient::new(NotionClientConfig::new("", "channels")).is_err());
        assert!(NotionClient::new(NotionClientConfig::new("secret", " ")).is_err());
        assert!(NotionClient::new(NotionClientConfig::new("secret", "channels").with_rate_limit(0)).is_err());
    }

    #[tokio::test]
    async fn test_rate_limiter_admits_burst() {
        let client = NotionClient::new(NotionClientConfig::new("secret", "channels").with_rate_limit(3)).unwrap();
        client.rate_limiter.until_ready().await;
        client.rate_limiter.until_ready().await;
        client.rate_limiter.until_ready().await;
    }
}
