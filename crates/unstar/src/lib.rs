//! unstar - rewrite Python wildcard imports into explicit import lists.
//!
//! This crate provides the `unstar` binary and the run orchestration behind
//! it.
//!
//! ## Modules
//!
//! - `cli` - Run orchestration: configuration, file collection, formatter
//! - `splash` - Startup banner

pub mod cli;
pub mod splash;

// Re-export core types for convenience
pub use unstar_core::config::UnstarConfig;
pub use unstar_core::error::{OutputErrorCode, UnstarError};
pub use unstar_core::output::{ErrorResponse, RunReport, SCHEMA_VERSION};
pub use unstar_python;
