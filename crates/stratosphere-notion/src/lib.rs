//! # Stratosphere Notion
//!
//! Sink adapter for Notion databases. The same client serves the list of
//! channels to process and checks/inserts rows in the state and
//! timeseries databases.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod body;
pub mod client;

pub use body::{NotionErrorBody, Page, QueryResponse};
pub use client::{NotionClient, NotionClientConfig, DEFAULT_BASE_URL, DEFAULT_NOTION_VERSION};
