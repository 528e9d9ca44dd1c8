//! # Stratosphere Common
//!
//! Shared types, utilities, and common functionality for Stratosphere.
//!
//! This crate provides the error type, logging setup, domain newtypes and
//! the collaborator traits (channel source, statistics source, record sink)
//! used across all other crates in the workspace.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

#[allow(missing_docs)]
pub mod error;
pub mod logging;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::{Result, StratosphereError};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use traits::*;
pub use types::*;
pub use utils::*;
