//! # Stratosphere Stats
//!
//! Turns a raw channel statistics object into the rows uploaded to the
//! state and timeseries tables.
//!
//! The flow is classify, transform, assemble:
//!
//! 1. [`classifier::classify`] keeps the supported current/previous metrics
//!    and fully loaded graphs, dropping everything else.
//! 2. [`state::transform_state_metric`] dates each metric's `current` and
//!    `previous` values; [`graph::decode_graph`] decodes each graph into
//!    per-day points.
//! 3. [`assembler`] merges both into [`StateRecord`]s and
//!    [`TimeseriesRecord`]s keyed by date.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod assembler;
pub mod classifier;
pub mod graph;
pub mod model;
pub mod records;
pub mod state;

pub use assembler::{assemble_state, assemble_timeseries, transform_stats, ChannelRows};
pub use classifier::{classify, ClassifiedStats};
pub use graph::{decode_graph, DecodedGraph};
pub use model::*;
pub use records::{StateRecord, TimeseriesRecord, UploadRecord};
pub use state::transform_state_metric;
