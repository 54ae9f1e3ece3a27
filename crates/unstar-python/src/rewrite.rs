//! Rewrite engine.
//!
//! Turns resolved export sets into replacement import lines and splices them
//! into the original file text. Every byte outside the replaced import
//! statements is preserved, including each line's own terminator.
//!
//! A file is either rewritten as a whole (temp file + rename in the same
//! directory) or not at all.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};
use unstar_core::diff::unified_diff;

use crate::imports::ImportRecord;
use crate::registry::ModuleRegistry;
use crate::resolve::ExportSet;
use crate::types::{LineSpan, ModuleIdentity, ModuleRef};

// ============================================================================
// Errors
// ============================================================================

/// Errors from reading, splicing or writing a file.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("replacements overlap at lines {first_start}-{first_end} and {second_start}-{second_end}")]
    Overlap {
        first_start: u32,
        first_end: u32,
        second_start: u32,
        second_end: u32,
    },

    #[error("replacement span {start}-{end} is outside the file ({lines} lines)")]
    OutOfRange { start: u32, end: u32, lines: usize },

    #[error("replacement column {column} on line {line} is not a character boundary")]
    InvalidColumn { line: u32, column: u32 },
}

// ============================================================================
// Buffer
// ============================================================================

/// A source file's lines, each with its original terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBuffer {
    path: PathBuf,
    lines: Vec<String>,
}

impl FileBuffer {
    /// Read `path` once.
    pub fn read(path: &Path) -> Result<Self, RewriteError> {
        let text = fs::read_to_string(path).map_err(|source| RewriteError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_text(path, &text))
    }

    pub fn from_text(path: &Path, text: &str) -> Self {
        FileBuffer {
            path: path.to_path_buf(),
            lines: text.split_inclusive('\n').map(str::to_string).collect(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The full text.
    pub fn text(&self) -> String {
        self.lines.concat()
    }

    /// Text covered by `span`, from `start_col` on its first line through
    /// `end_col` on its last.
    fn span_text(&self, span: &LineSpan) -> Option<String> {
        let start = span.start_line as usize;
        let end = span.end_line as usize;
        if start == 0 || end > self.lines.len() {
            return None;
        }
        let mut text = self.lines[start - 1..end].concat();
        let last_len = self.lines[end - 1].len();
        let tail_len = last_len - content_len(&self.lines[end - 1]).min(span.end_col as usize);
        text.truncate(text.len() - tail_len);
        text.get(span.start_col as usize..).map(str::to_string)
    }
}

/// Length of a line without its terminator.
fn content_len(line: &str) -> usize {
    line.trim_end_matches(['\n', '\r']).len()
}

// ============================================================================
// Replacements
// ============================================================================

/// A span of the original buffer to overwrite with one import line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub span: LineSpan,
    /// The new statement, without indentation or terminator.
    pub text: String,
    /// The module as written in the statement being replaced.
    pub module_ref: ModuleRef,
}

/// Build the explicit import that replaces `record`.
///
/// The module is written without its leading dots; the relative marker is
/// recovered from the original text when the replacement is applied. Names
/// are always listed in case-insensitive order.
pub fn build_replacement(record: &ImportRecord, exports: &ExportSet) -> Replacement {
    Replacement {
        span: record.span,
        text: format!(
            "from {} import {}",
            record.module_ref.name,
            exports.sorted_names().join(", ")
        ),
        module_ref: record.module_ref.clone(),
    }
}

/// The leading-dot marker of `module` in the statement text, if it has one.
fn relative_marker(statement: &str, module: &ModuleRef) -> Option<String> {
    let name = module
        .segments()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s*\.\s*");
    let pattern = if name.is_empty() {
        r"\bfrom(?:\s|\\)+(\.+)(?:\s|\\)*import\b".to_string()
    } else {
        format!(r"\bfrom(?:\s|\\)+(\.+)(?:\s|\\)*{}\b", name)
    };
    let re = Regex::new(&pattern).ok()?;
    re.captures(statement)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Give `replacement` the same relative marker its original statement had.
fn with_relative_marker(replacement: &Replacement, original: &str) -> String {
    let level = replacement.module_ref.level;
    let marker = relative_marker(original, &replacement.module_ref)
        .or_else(|| (level > 0).then(|| ".".repeat(level)));
    match marker {
        Some(dots) => {
            let bare = format!("from {}", replacement.module_ref.name);
            let dotted = format!("from {}{}", dots, replacement.module_ref.name);
            replacement.text.replacen(&bare, &dotted, 1)
        }
        None => replacement.text.clone(),
    }
}

// ============================================================================
// Apply
// ============================================================================

/// Whether a rewrite is written to disk or shown as a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteMode {
    Commit,
    Preview,
}

/// Result of [`apply_replacements`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteOutcome {
    Unchanged,
    Changed { replaced: usize },
}

/// Apply `replacements` to `buffer`.
///
/// In commit mode the file is replaced atomically and `registry` forgets the
/// module; in preview mode a unified diff is written to `sink` instead.
/// Nothing is written when any replacement is invalid.
pub fn apply_replacements(
    buffer: &FileBuffer,
    replacements: Vec<Replacement>,
    mode: RewriteMode,
    registry: &mut dyn ModuleRegistry,
    sink: &mut dyn Write,
) -> Result<RewriteOutcome, RewriteError> {
    if replacements.is_empty() {
        return Ok(RewriteOutcome::Unchanged);
    }

    let original = buffer.text();
    let modified = splice(buffer, replacements.clone())?;
    if modified == original {
        return Ok(RewriteOutcome::Unchanged);
    }

    match mode {
        RewriteMode::Preview => {
            let label = buffer.path.display().to_string();
            sink.write_all(unified_diff(&label, &original, &modified).as_bytes())
                .map_err(|source| RewriteError::Write {
                    path: buffer.path.clone(),
                    source,
                })?;
        }
        RewriteMode::Commit => {
            write_atomic(&buffer.path, &modified)?;
            info!(path = %buffer.path.display(), "rewrote {} import(s)", replacements.len());
            registry.invalidate(&ModuleIdentity::for_file(&buffer.path));
        }
    }

    Ok(RewriteOutcome::Changed {
        replaced: replacements.len(),
    })
}

/// Apply `replacements` to a copy of the buffer's lines, bottom-up and
/// right to left within a line.
pub fn splice(
    buffer: &FileBuffer,
    mut replacements: Vec<Replacement>,
) -> Result<String, RewriteError> {
    replacements.sort_by_key(|r| (r.span.start_line, r.span.start_col));
    validate(buffer, &replacements)?;

    let mut lines = buffer.lines.clone();
    for replacement in replacements.iter().rev() {
        let span = &replacement.span;
        let original = buffer.span_text(span).ok_or(RewriteError::InvalidColumn {
            line: span.start_line,
            column: span.start_col,
        })?;
        let text = with_relative_marker(replacement, &original);

        // Edits already applied lie below or to the right, so columns
        // before them still match the original text.
        let first = &lines[span.start_line as usize - 1];
        let last = &lines[span.end_line as usize - 1];
        let prefix = first
            .get(..span.start_col as usize)
            .ok_or(RewriteError::InvalidColumn {
                line: span.start_line,
                column: span.start_col,
            })?;
        let end_col = content_len(last).min(span.end_col as usize);
        let suffix = last.get(end_col..).ok_or(RewriteError::InvalidColumn {
            line: span.end_line,
            column: span.end_col,
        })?;

        debug!(line = span.start_line, "{} -> {}", original.trim(), text);
        let merged = format!("{}{}{}", prefix, text, suffix);
        lines.splice(
            span.start_line as usize - 1..span.end_line as usize,
            std::iter::once(merged),
        );
    }
    Ok(lines.concat())
}

/// Reject spans outside the buffer and spans that overlap.
fn validate(buffer: &FileBuffer, sorted: &[Replacement]) -> Result<(), RewriteError> {
    for replacement in sorted {
        let span = &replacement.span;
        if span.start_line == 0 || span.end_line as usize > buffer.lines.len() {
            return Err(RewriteError::OutOfRange {
                start: span.start_line,
                end: span.end_line,
                lines: buffer.lines.len(),
            });
        }
    }
    for pair in sorted.windows(2) {
        let (a, b) = (&pair[0].span, &pair[1].span);
        let overlaps = b.start_line < a.end_line
            || (b.start_line == a.end_line && b.start_col < a.end_col);
        if overlaps {
            return Err(RewriteError::Overlap {
                first_start: a.start_line,
                first_end: a.end_line,
                second_start: b.start_line,
                second_end: b.end_line,
            });
        }
    }
    Ok(())
}

/// Replace `path` with `content` via a temp file in the same directory.
fn write_atomic(path: &Path, content: &str) -> Result<(), RewriteError> {
    let write_err = |source: io::Error| RewriteError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(tmp.path(), metadata.permissions()).map_err(write_err)?;
    }
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
