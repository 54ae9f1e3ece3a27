//! Error bridge implementations for Python-side errors.
//!
//! This module provides `impl From<X> for UnstarError` conversions for the
//! errors that can end a run as a whole. Per-file and per-import errors are
//! recorded in the run report instead and never reach `UnstarError`.

use unstar_core::error::UnstarError;

use crate::env::PythonEnvError;
use crate::files::FileError;

// ============================================================================
// Bridge: FileError -> UnstarError
// ============================================================================

impl From<FileError> for UnstarError {
    fn from(err: FileError) -> Self {
        match err {
            FileError::NotADirectory { .. } => UnstarError::invalid_args(err.to_string()),
            FileError::Walk { ref path, .. } => {
                let file = Some(path.clone());
                UnstarError::apply(err.to_string(), file)
            }
        }
    }
}

// ============================================================================
// Bridge: PythonEnvError -> UnstarError
// ============================================================================

impl From<PythonEnvError> for UnstarError {
    fn from(err: PythonEnvError) -> Self {
        match err {
            PythonEnvError::NotFound { .. } | PythonEnvError::NotExecutable { .. } => {
                UnstarError::invalid_args(err.to_string())
            }
            other => UnstarError::internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;
    use unstar_core::error::OutputErrorCode;

    #[test]
    fn not_a_directory_is_invalid_args() {
        let err: UnstarError = FileError::NotADirectory {
            path: "pkg/a.py".to_string(),
        }
        .into();
        assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
        assert_eq!(err.to_string(), "invalid arguments: not a directory: pkg/a.py");
    }

    #[test]
    fn walk_failure_is_apply_error() {
        let err: UnstarError = FileError::Walk {
            path: "pkg".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        assert_eq!(err.error_code(), OutputErrorCode::ApplyError);
    }

    #[test]
    fn bad_python_flag_is_invalid_args() {
        let err: UnstarError = PythonEnvError::NotFound {
            path: PathBuf::from("/nope/python"),
        }
        .into();
        assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);

        let err: UnstarError = PythonEnvError::Timeout {
            path: PathBuf::from("/usr/bin/python3"),
            seconds: 10,
        }
        .into();
        assert_eq!(err.error_code(), OutputErrorCode::InternalError);
    }
}
