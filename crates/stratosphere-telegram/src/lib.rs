//! # Stratosphere Telegram
//!
//! Source adapter fetching per-channel statistics from a Telegram
//! statistics gateway.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod client;

pub use client::{StatsKind, TelegramClientConfig, TelegramStatsClient, DEFAULT_SESSION_NAME};
