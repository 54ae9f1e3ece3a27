//! Shared types for Python import analysis.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Source span of a node.
///
/// Lines are 1-indexed. Columns are 0-indexed byte offsets within their line,
/// with `end_col` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineSpan {
    pub start_line: u32,
    pub end_line: u32,
    pub start_col: u32,
    pub end_col: u32,
}

impl LineSpan {
    /// Create a span, clamping `end_line` so it never precedes `start_line`.
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        LineSpan {
            start_line,
            end_line: end_line.max(start_line),
            start_col,
            end_col,
        }
    }

    /// Number of source lines covered.
    pub fn line_count(&self) -> u32 {
        self.end_line - self.start_line + 1
    }
}

/// A module as written in an import statement.
///
/// Equality is syntactic: `from .b import *` in two different packages
/// produces equal refs that name different modules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleRef {
    /// Number of leading dots (0 for absolute imports).
    pub level: usize,
    /// Dotted name after the dots; empty for `from . import *`.
    pub name: String,
}

impl ModuleRef {
    /// An absolute reference such as `os.path`.
    pub fn absolute(name: impl Into<String>) -> Self {
        ModuleRef {
            level: 0,
            name: name.into(),
        }
    }

    /// A relative reference such as `..utils` (`level` = 2).
    pub fn relative(level: usize, name: impl Into<String>) -> Self {
        ModuleRef {
            level,
            name: name.into(),
        }
    }

    /// Whether the reference starts with dots.
    pub fn is_relative(&self) -> bool {
        self.level > 0
    }

    /// The dotted name split into its segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.name.split('.').filter(|s| !s.is_empty())
    }
}

impl fmt::Display for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", ".".repeat(self.level), self.name)
    }
}

/// The resolved identity of a module, used for cycle detection and caching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModuleIdentity {
    /// A module backed by a source file (canonicalized when possible).
    File(PathBuf),
    /// A compiled or built-in library known only by its dotted name.
    Library(String),
}

impl ModuleIdentity {
    /// Identity for a source file, canonicalizing the path when it exists.
    pub fn for_file(path: &Path) -> Self {
        ModuleIdentity::File(path.canonicalize().unwrap_or_else(|_| path.to_path_buf()))
    }
}

impl fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleIdentity::File(path) => write!(f, "{}", path.display()),
            ModuleIdentity::Library(name) => write!(f, "<library {}>", name),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_ref_display_keeps_dots() {
        assert_eq!(ModuleRef::absolute("pkg.b").to_string(), "pkg.b");
        assert_eq!(ModuleRef::relative(1, "sub").to_string(), ".sub");
        assert_eq!(ModuleRef::relative(2, "").to_string(), "..");
    }

    #[test]
    fn module_ref_equality_is_syntactic() {
        assert_eq!(ModuleRef::relative(1, "b"), ModuleRef::relative(1, "b"));
        assert_ne!(ModuleRef::relative(1, "b"), ModuleRef::absolute("b"));
    }

    #[test]
    fn module_ref_segments_skip_empty() {
        let empty = ModuleRef::relative(1, "");
        assert_eq!(empty.segments().count(), 0);
        let dotted = ModuleRef::absolute("a.b.c");
        assert_eq!(dotted.segments().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn line_span_clamps_end() {
        let span = LineSpan::new(5, 0, 3, 10);
        assert_eq!(span.end_line, 5);
        assert_eq!(span.line_count(), 1);
    }
}
