//! Python file collection.
//!
//! Finds the files to process under a target directory and orders them
//! deepest directory first.

use std::cmp::Reverse;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

// ============================================================================
// Error Types
// ============================================================================

/// Error type for file operations.
#[derive(Debug, Error)]
pub enum FileError {
    /// The target directory does not exist or is not a directory.
    #[error("not a directory: {path}")]
    NotADirectory { path: String },

    /// The target directory could not be walked.
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Result type for file operations.
pub type FileResult<T> = Result<T, FileError>;

/// Directory names that never hold project source.
const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "__pycache__",
    "venv",
    "node_modules",
    "build",
    "dist",
];

// ============================================================================
// File Collection
// ============================================================================

/// A Python file found under the target directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path to the file (target directory joined with `relative`).
    pub path: PathBuf,
    /// Path relative to the target directory.
    pub relative: PathBuf,
    /// Dotted module name, prefixed with the package name.
    pub module_name: String,
}

impl SourceFile {
    /// Number of directories between the target and this file.
    pub fn depth(&self) -> usize {
        self.relative.components().count().saturating_sub(1)
    }
}

/// Collect `*.py` files under `root`, deepest directories first.
///
/// `package` is the dotted name of `root` itself and prefixes every module
/// name. Hidden directories, the usual virtualenv and build directories and
/// anything matching `exclude` are skipped.
///
/// # Exclusion Pattern Syntax
///
/// - `"tests/"` - Exclude any path containing a `tests` directory component
/// - `"test_*.py"` - Exclude files matching glob pattern (supports `*` wildcard)
/// - `"conftest.py"` - Exclude exact filename match in any directory
pub fn collect_python_files(
    root: &Path,
    package: &str,
    exclude: &[String],
) -> FileResult<Vec<SourceFile>> {
    if !root.is_dir() {
        return Err(FileError::NotADirectory {
            path: root.display().to_string(),
        });
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded_dir(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(FileError::Walk {
                    path: root.display().to_string(),
                    source: e.into(),
                });
            }
            Err(e) => {
                warn!("skipping unreadable entry: {}", e);
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "py") {
            continue;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let rel_str = relative.to_string_lossy();
        if matches_any_exclusion_pattern(&rel_str, exclude) {
            continue;
        }

        files.push(SourceFile {
            path: path.to_path_buf(),
            relative: relative.to_path_buf(),
            module_name: module_name(package, relative),
        });
    }

    files.sort_by(|a, b| {
        (Reverse(a.depth()), &a.relative).cmp(&(Reverse(b.depth()), &b.relative))
    });
    Ok(files)
}

fn is_excluded_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || DEFAULT_EXCLUDED_DIRS.contains(&&*name)
}

/// Dotted module name for a path relative to the package directory.
///
/// `sub/a.py` in package `pkg` is `pkg.sub.a`; `sub/__init__.py` is
/// `pkg.sub`.
pub fn module_name(package: &str, relative: &Path) -> String {
    let mut parts: Vec<String> = package
        .split('.')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    for component in relative.with_extension("").components() {
        parts.push(component.as_os_str().to_string_lossy().into_owned());
    }
    if parts.last().is_some_and(|last| last == "__init__") {
        parts.pop();
    }
    parts.join(".")
}

/// Check if a path matches any of the exclusion patterns.
///
/// Pattern types:
/// - Directory patterns (end with `/`): Match if any path component equals the dir name
/// - Glob patterns (contain `*`): Match filename against simple glob
/// - Exact patterns: Match if filename equals the pattern
fn matches_any_exclusion_pattern(path: &str, patterns: &[String]) -> bool {
    let path_obj = Path::new(path);
    let filename = path_obj
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    patterns.iter().any(|pattern| {
        if let Some(dir_name) = pattern.strip_suffix('/') {
            path_obj
                .components()
                .any(|c| c.as_os_str().to_str() == Some(dir_name))
        } else if pattern.contains('*') {
            matches_simple_glob(&filename, pattern)
        } else {
            filename == *pattern
        }
    })
}

/// Simple glob matching supporting a single `*` as wildcard.
fn matches_simple_glob(text: &str, pattern: &str) -> bool {
    match pattern.split_once('*') {
        Some((prefix, suffix)) => {
            text.len() >= prefix.len() + suffix.len()
                && text.starts_with(prefix)
                && text.ends_with(suffix)
        }
        None => text == pattern,
    }
}

// ============================================================================
// Tests
// ============================================================================
