//! Python support for unstar.
//!
//! This crate turns `from module import *` into explicit imports. It
//! includes:
//! - A tree-sitter based syntax tree reader
//! - Import extraction and `__all__` reading
//! - Export-set resolution across project source and installed libraries
//! - The rewrite engine that splices new import lines into files

pub mod env;
pub mod error_bridges;
pub mod exports;
pub mod files;
pub mod imports;
pub mod loader;
pub mod ops;
pub mod registry;
pub mod resolve;
pub mod rewrite;
pub mod syntax;
pub mod types;
pub mod usage;
pub mod validation;
