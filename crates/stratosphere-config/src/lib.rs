//! # Stratosphere Config
//!
//! Validated configuration for the Stratosphere sync job.
//!
//! Settings come from an optional YAML file, a `.env` file and environment
//! variables, in that order of increasing precedence, and are validated as
//! a whole before the run starts.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validation;

pub use defaults::*;
pub use loader::*;
pub use schema::*;
pub use validation::*;
