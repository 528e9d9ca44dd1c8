//! Error types and utilities for Stratosphere

use thiserror::Error;

/// Result type alias for Stratosphere operations
pub type Result<T> = std::result::Result<T, StratosphereError>;

/// Main error type for Stratosphere operations
#[derive(Error, Debug)]
pub enum StratosphereError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network related errors (HTTP transport, timeouts, etc.)
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Telegram statistics API errors
    #[error("Telegram API error: {message}")]
    Telegram {
        message: String,
        status_code: Option<u16>,
    },

    /// Notion API errors
    #[error("Notion API error: {message}")]
    Notion {
        message: String,
        status_code: Option<u16>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Input that breaks a required contract (missing field, wrong type,
    /// empty identifier). Never retried.
    #[error("Contract violation: {message}")]
    Contract {
        message: String,
        field: Option<String>,
    },

    /// Logging setup errors
    #[error("Logging error: {message}")]
    Logging { message: String },
}

impl StratosphereError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new network error with source
    pub fn network_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new Telegram API error with the HTTP status
    pub fn telegram_with_status(msg: impl Into<String>, status: u16) -> Self {
        Self::Telegram {
            message: msg.into(),
            status_code: Some(status),
        }
    }

    /// Create a new Notion API error with the HTTP status
    pub fn notion_with_status(msg: impl Into<String>, status: u16) -> Self {
        Self::Notion {
            message: msg.into(),
            status_code: Some(status),
        }
    }

    /// Create a new contract violation
    pub fn contract(msg: impl Into<String>) -> Self {
        Self::Contract {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new contract violation naming the offending field
    pub fn contract_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Contract {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new logging setup error
    pub fn logging(msg: impl Into<String>) -> Self {
        Self::Logging {
            message: msg.into(),
        }
    }

    /// HTTP status attached to an API error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Telegram { status_code, .. } | Self::Notion { status_code, .. } => *status_code,
            _ => None,
        }
    }

    /// Whether this error is a contract violation
    pub fn is_contract(&self) -> bool {
        matches!(self, Self::Contract { .. })
    }
}

/// Convert from reqwest::Error to StratosphereError
impl From<reqwest::Error> for StratosphereError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network_with_source("Request timeout", err)
        } else if err.is_connect() {
            Self::network_with_source("Connection failed", err)
        } else if err.is_status() {
            let status_code = err.status().map(|s| s.as_u16()).unwrap_or(0);
            Self::network_with_source(format!("HTTP error: {}", status_code), err)
        } else {
            Self::network_with_source("Network request failed", err)
        }
    }
}
