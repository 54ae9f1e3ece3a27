//! Python identifier validation.
//!
//! Export sets must only ever contain names that can appear in an import
//! list, so every name that comes from a string literal or from an
//! interpreter is checked here first.

use thiserror::Error;

/// Error for validation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid Python identifier name.
    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Python keywords that cannot be used as identifiers.
pub const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class", "continue",
    "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if", "import",
    "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while",
    "with", "yield",
];

/// Check if a name is a Python keyword.
pub fn is_python_keyword(name: &str) -> bool {
    PYTHON_KEYWORDS.contains(&name)
}

/// Validate that a string is a valid Python identifier.
///
/// Checks:
/// - Non-empty
/// - Starts with letter or underscore
/// - Contains only alphanumeric and underscore
/// - Not a Python keyword
pub fn validate_python_identifier(name: &str) -> ValidationResult<()> {
    let invalid = |reason: String| ValidationError::InvalidName {
        name: name.to_string(),
        reason,
    };

    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(invalid("name cannot be empty".to_string()));
    };
    if !first.is_alphabetic() && first != '_' {
        return Err(invalid("must start with letter or underscore".to_string()));
    }
    if let Some(ch) = chars.find(|ch| !ch.is_alphanumeric() && *ch != '_') {
        return Err(invalid(format!("invalid character: '{}'", ch)));
    }
    if is_python_keyword(name) {
        return Err(invalid(
            "cannot use Python keyword as identifier".to_string(),
        ));
    }
    Ok(())
}

/// Whether `name` is a valid identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    validate_python_identifier(name).is_ok()
}

/// Whether a wildcard import binds `name` when the module has no `__all__`.
pub fn is_public_name(name: &str) -> bool {
    !name.starts_with('_')
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod valid_identifiers {
        use super::*;

        #[test]
        fn simple_names() {
            assert!(validate_python_identifier("foo").is_ok());
            assert!(validate_python_identifier("Widget").is_ok());
            assert!(validate_python_identifier("x").is_ok());
        }

        #[test]
        fn underscore_names() {
            assert!(validate_python_identifier("_private").is_ok());
            assert!(validate_python_identifier("_").is_ok());
            assert!(validate_python_identifier("__dunder__").is_ok());
        }

        #[test]
        fn unicode_names() {
            assert!(validate_python_identifier("café").is_ok());
            assert!(validate_python_identifier("名前").is_ok());
        }

        #[test]
        fn soft_keywords_are_identifiers() {
            assert!(validate_python_identifier("match").is_ok());
            assert!(validate_python_identifier("type").is_ok());
        }
    }

    mod invalid_identifiers {
        use super::*;

        #[test]
        fn empty_name() {
            let err = validate_python_identifier("").unwrap_err();
            assert!(err.to_string().contains("cannot be empty"));
        }

        #[test]
        fn starts_with_digit() {
            assert!(validate_python_identifier("123foo").is_err());
        }

        #[test]
        fn contains_separator() {
            assert!(validate_python_identifier("foo bar").is_err());
            assert!(validate_python_identifier("os.path").is_err());
            assert!(validate_python_identifier("a-b").is_err());
        }

        #[test]
        fn keywords() {
            assert!(validate_python_identifier("class").is_err());
            assert!(validate_python_identifier("None").is_err());
        }
    }

    #[test]
    fn public_names() {
        assert!(is_public_name("Widget"));
        assert!(!is_public_name("_helper"));
        assert!(!is_public_name("__version__"));
    }
}
