//! HTTP client for the Telegram statistics gateway.
//!
//! The gateway holds a logged-in user session and exposes the platform's
//! `stats.getBroadcastStats` / `stats.getMegagroupStats` results as tagged
//! JSON objects, one per channel handle.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::{fmt, time::Duration};
use stratosphere_common::{truncate_string, Handle, Result, StatsObject, StatsSource, StratosphereError};
use tracing::{debug, error, info, instrument};
use url::Url;

/// Default session name held by the gateway.
pub const DEFAULT_SESSION_NAME: &str = "main_session";

/// Configuration for the statistics gateway client
#[derive(Debug, Clone)]
pub struct TelegramClientConfig {
    /// Base URL of the gateway (e.g., "http://localhost:8700")
    pub gateway_url: String,
    /// Optional bearer token
    pub api_token: Option<String>,
    /// Session to query through
    pub session_name: String,
    /// Request timeout in seconds (default: 60)
    pub timeout_secs: u64,
    /// Connection pool max idle connections per host (default: 2)
    pub max_idle_per_host: usize,
}

impl Default for TelegramClientConfig {
    fn default() -> Self {
        Self {
            gateway_url: "http://localhost:8700".to_string(),
            api_token: None,
            session_name: DEFAULT_SESSION_NAME.to_string(),
            timeout_secs: 60,
            max_idle_per_host: 2,
        }
    }
}

impl TelegramClientConfig {
    /// Create a configuration for the given gateway
    pub fn new(gateway_url: impl Into<String>) -> Self {
        Self {
            gateway_url: gateway_url.into(),
            ..Default::default()
        }
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Set the session name
    pub fn with_session(mut self, session_name: impl Into<String>) -> Self {
        self.session_name = session_name.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Shape of a statistics object, from its top-level discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsKind {
    /// `stats.BroadcastStats`
    Broadcast,
    /// `stats.MegagroupStats`
    Megagroup,
    /// Anything else
    Unknown,
}

impl StatsKind {
    /// Reads the discriminator of a statistics object.
    pub fn of(stats: &StatsObject) -> Self {
        match stats.get("_").and_then(Value::as_str) {
            Some("stats.BroadcastStats") => Self::Broadcast,
            Some("stats.MegagroupStats") => Self::Megagroup,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for StatsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Broadcast => f.write_str("broadcast"),
            Self::Megagroup => f.write_str("megagroup"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// Error body returned by the gateway on failure
#[derive(Debug, Deserialize)]
struct GatewayError {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Statistics gateway client
#[derive(Debug, Clone)]
pub struct TelegramStatsClient {
    client: Client,
    config: TelegramClientConfig,
    base_url: Url,
}

impl TelegramStatsClient {
    /// Create a new client with the given configuration
    pub fn new(config: TelegramClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.gateway_url).map_err(|e| {
            StratosphereError::config_with_source(format!("Invalid gateway URL '{}'", config.gateway_url), e)
        })?;

        if base_url.cannot_be_a_base() {
            return Err(StratosphereError::config(format!(
                "Gateway URL '{}' cannot be used as a base",
                config.gateway_url
            )));
        }

        if config.session_name.trim().is_empty() {
            return Err(StratosphereError::config("Telegram session name cannot be empty"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()
            .map_err(|e| StratosphereError::network_with_source("Failed to create HTTP client", e))?;

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    /// Gateway URL of the statistics of `handle`.
    pub fn stats_url(&self, handle: &Handle) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StratosphereError::config("Gateway URL cannot be used as a base"))?
            .pop_if_empty()
            .extend([
                "v1",
                "sessions",
                self.config.session_name.as_str(),
                "channels",
                handle.as_str(),
                "stats",
            ]);
        Ok(url)
    }

    /// Fetches the statistics object of `handle`.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn fetch_stats(&self, handle: &Handle) -> Result<StatsObject> {
        let url = self.stats_url(handle)?;
        debug!("Requesting statistics from {}", url);

        let mut request = self.client.get(url);
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            error!("Statistics request failed: {}", e);
            StratosphereError::from(e)
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StratosphereError::network_with_source("Failed to read response body", e))?;

        if !status.is_success() {
            return Err(status_error(handle, status, &body));
        }

        let stats = parse_stats_body(handle, &body)?;
        info!(kind = %StatsKind::of(&stats), fields = stats.len(), "Fetched channel statistics");
        Ok(stats)
    }
}

#[async_trait]
impl StatsSource for TelegramStatsClient {
    async fn get_stats(&self, handle: &Handle) -> Result<StatsObject> {
        self.fetch_stats(handle).await
    }
}

/// Maps a non-2xx gateway response to an error.
pub fn status_error(handle: &Handle, status: StatusCode, body: &str) -> StratosphereError {
    let detail = serde_json::from_str::<GatewayError>(body)
        .ok()
        .and_then(|e| e.message.or(e.error))
        .unwrap_or_else(|| truncate_string(body.trim(), 200));

    let message = match status {
        StatusCode::NOT_FOUND => format!("Channel '{}' could not be resolved", handle),
        StatusCode::FORBIDDEN => format!(
            "Statistics are not available for '{}' (admin rights and a large enough audience are required): {}",
            handle, detail
        ),
        StatusCode::UNAUTHORIZED => format!("Gateway rejected the session credentials: {}", detail),
        _ => format!("Statistics gateway returned {} for '{}': {}", status, handle, detail),
    };

    error!(status = status.as_u16(), "{}", message);
    StratosphereError::telegram_with_status(message, status.as_u16())
}

/// Parses a successful response body; anything but a JSON object is a
/// contract violation.
pub fn parse_stats_body(handle: &Handle, body: &str) -> Result<StatsObject> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(stats)) => Ok(stats),
        Ok(other) => Err(StratosphereError::contract(format!(
            "Statistics for '{}' are not an object: {}",
            handle,
            truncate_string(&other.to_string(), 80)
        ))),
        Err(e) => Err(StratosphereError::contract(format!(
            "Statistics for '{}' are not valid JSON: {}",
            handle, e
        ))),
    }
}
