//! Collaborator contracts the sync pipeline depends on.
//!
//! Concrete adapters live in `stratosphere-telegram` and
//! `stratosphere-notion`; the pipeline only sees these traits.

use crate::{
    error::Result,
    types::{Handle, RowFields, StatsObject, TableId},
};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Source of the channels to process in one run.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait ChannelSource: Send + Sync {
    /// Returns channel handles in processing order.
    async fn channels_to_process(&self) -> Result<Vec<Handle>>;
}

/// Source of raw per-channel statistics.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Fetches the statistics object of a broadcast channel or megagroup.
    ///
    /// Fails when the handle cannot be resolved or the platform refuses to
    /// serve statistics for it.
    async fn get_stats(&self, handle: &Handle) -> Result<StatsObject>;
}

/// Destination store keyed by `(handle, date)`.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Whether a row for `handle` on `date` already exists in `table`.
    async fn exists(&self, table: &TableId, handle: &str, date: NaiveDate) -> Result<bool>;

    /// Inserts one row into `table`.
    async fn insert(&self, table: &TableId, fields: &RowFields) -> Result<()>;
}
