//! # Stratosphere Sync
//!
//! Periodic job copying Telegram channel statistics into two Notion
//! databases: a state table (followers and per-post engagement, today and a
//! week ago) and a timeseries table (daily joined, left, muted and total
//! followers).
//!
//! Channels are processed one after the other; each channel is fetched,
//! reshaped and uploaded before the next one starts. Rows whose
//! `(handle, date)` key already exists are left alone, so re-running the
//! job is safe.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod cli;
pub mod error;
pub mod orchestrator;

pub use app::build_orchestrator;
pub use cli::Cli;
pub use error::*;
pub use orchestrator::*;
