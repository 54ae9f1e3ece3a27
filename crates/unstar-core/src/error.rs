//! Error types and error code constants for unstar.
//!
//! This module provides a unified error type (`UnstarError`) that bridges
//! domain-specific errors from the Python subsystem (file collection,
//! rewriting, configuration) into a common format suitable for output.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad input from caller, bad configuration)
//! - `3`: Resolution errors (target path not found)
//! - `4`: Apply errors (file list unreadable, failed to write changes)
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! Per-file and per-import failures are not errors at this level: they are
//! recorded in the run report and the run exits successfully.

use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes used as process exit codes and in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed configuration).
    InvalidArguments = 2,
    /// Resolution errors (target path not found).
    ResolutionError = 3,
    /// Apply errors (failed to enumerate or write files).
    ApplyError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for fatal, run-level failures.
#[derive(Debug, Error)]
pub enum UnstarError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Target path not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// Configuration could not be loaded.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Failed to enumerate or apply changes.
    #[error("apply error: {message}")]
    ApplyError {
        message: String,
        file: Option<String>,
    },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&UnstarError> for OutputErrorCode {
    fn from(err: &UnstarError) -> Self {
        match err {
            UnstarError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            UnstarError::FileNotFound { .. } => OutputErrorCode::ResolutionError,
            UnstarError::Config { .. } => OutputErrorCode::InvalidArguments,
            UnstarError::ApplyError { .. } => OutputErrorCode::ApplyError,
            UnstarError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<UnstarError> for OutputErrorCode {
    fn from(err: UnstarError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Bridge: ConfigError -> UnstarError
// ============================================================================

impl From<ConfigError> for UnstarError {
    fn from(err: ConfigError) -> Self {
        UnstarError::Config {
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl UnstarError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        UnstarError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        UnstarError::FileNotFound { path: path.into() }
    }

    /// Create an apply error, optionally naming the file involved.
    pub fn apply(message: impl Into<String>, file: Option<String>) -> Self {
        UnstarError::ApplyError {
            message: message.into(),
            file,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        UnstarError::InternalError {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
