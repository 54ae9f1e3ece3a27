//! Core infrastructure for unstar.
//!
//! This crate provides the language-agnostic pieces:
//! - Error types and stable exit codes
//! - `[tool.unstar]` configuration loading
//! - Unified diff generation for preview mode
//! - Run reports for text and JSON output

pub mod config;
pub mod diff;
pub mod error;
pub mod output;
