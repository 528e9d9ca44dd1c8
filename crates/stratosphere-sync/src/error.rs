//! Application-wide error types using thiserror.

use chrono::NaiveDate;
use stratosphere_common::{StratosphereError, TableId};

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum SyncError {
    /// Configuration or client construction error.
    #[error("Configuration error: {0}")]
    Config(#[source] StratosphereError),

    /// The channel list could not be fetched.
    #[error("Failed to fetch channels to process: {0}")]
    ChannelList(#[source] StratosphereError),

    /// Fetching or transforming a channel's statistics failed.
    #[error("Failed to process channel '{handle}': {source}")]
    Channel {
        /// Channel being processed.
        handle: String,
        /// Underlying failure.
        #[source]
        source: StratosphereError,
    },

    /// Checking or inserting a row failed.
    #[error("Failed to upload row for '{handle}' on {date} to {table}: {source}")]
    Upload {
        /// Destination table.
        table: TableId,
        /// Row handle.
        handle: String,
        /// Row date.
        date: NaiveDate,
        /// Underlying failure.
        #[source]
        source: StratosphereError,
    },
}

impl SyncError {
    /// Failure that broke an input contract rather than a network call.
    pub fn is_contract(&self) -> bool {
        match self {
            Self::Config(source) | Self::ChannelList(source) => source.is_contract(),
            Self::Channel { source, .. } | Self::Upload { source, .. } => source.is_contract(),
        }
    }
}

/// Result type for the sync application.
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_upload_error_display_and_source() {
        let err = SyncError::Upload {
            table: TableId::new("state-db"),
            handle: "alpha".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            source: StratosphereError::notion_with_status("boom", 500),
        };

        let text = err.to_string();
        assert!(text.contains("alpha"));
        assert!(text.contains("2024-06-10"));
        assert!(text.contains("state-db"));
        assert!(err.source().is_some());
        assert!(!err.is_contract());
    }

    #[test]
    fn test_contract_classification() {
        let err = SyncError::Channel {
            handle: "alpha".to_string(),
            source: StratosphereError::contract("bad graph"),
        };
        assert!(err.is_contract());
    }
}
