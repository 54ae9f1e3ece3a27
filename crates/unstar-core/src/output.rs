//! Run reports for CLI output.
//!
//! A run over a directory produces one [`RunReport`]: an outcome per file
//! and the list of wildcard imports that were left unresolved. The report
//! renders either as a short text summary or as pretty-printed JSON.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{OutputErrorCode, UnstarError};

/// Current schema version for all JSON responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Per-file Types
// ============================================================================

/// What happened to a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// At least one wildcard import was replaced (or would be, in preview mode).
    Changed,
    /// Nothing to do, or nothing could be resolved.
    Unchanged,
    /// The file could not be read, parsed or written.
    Failed,
}

/// Outcome of processing one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    /// File path as given to the engine.
    pub file: String,
    /// Dotted module name, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// Final status.
    pub status: FileStatus,
    /// Wildcard imports replaced by explicit lists.
    pub resolved: u32,
    /// Wildcard imports left as they were.
    pub unresolved: u32,
    /// Failure message for `Failed` files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileOutcome {
    /// Create an outcome for a file that was processed.
    pub fn processed(
        file: impl Into<String>,
        module: Option<String>,
        changed: bool,
        resolved: u32,
        unresolved: u32,
    ) -> Self {
        FileOutcome {
            file: file.into(),
            module,
            status: if changed {
                FileStatus::Changed
            } else {
                FileStatus::Unchanged
            },
            resolved,
            unresolved,
            error: None,
        }
    }

    /// Create an outcome for a file that failed.
    pub fn failed(file: impl Into<String>, module: Option<String>, error: impl Into<String>) -> Self {
        FileOutcome {
            file: file.into(),
            module,
            status: FileStatus::Failed,
            resolved: 0,
            unresolved: 0,
            error: Some(error.into()),
        }
    }
}

/// A wildcard import that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedImport {
    /// File containing the import.
    pub file: String,
    /// 1-indexed line of the import statement.
    pub line: u32,
    /// Module as written, including leading dots.
    pub module: String,
    /// Why it was left alone.
    pub reason: String,
}

// ============================================================================
// Run Report
// ============================================================================

/// Aggregate counts for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub files_scanned: u32,
    pub files_changed: u32,
    pub files_failed: u32,
    pub imports_resolved: u32,
    pub imports_unresolved: u32,
}

/// Report for a whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Always "ok"; fatal errors produce an [`ErrorResponse`] instead.
    pub status: String,
    pub schema_version: String,
    /// True when nothing was written (preview mode).
    pub dry_run: bool,
    pub summary: RunSummary,
    pub files: Vec<FileOutcome>,
    pub unresolved: Vec<UnresolvedImport>,
}

impl RunReport {
    /// Create an empty report.
    pub fn new(dry_run: bool) -> Self {
        RunReport {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            dry_run,
            summary: RunSummary::default(),
            files: Vec::new(),
            unresolved: Vec::new(),
        }
    }

    /// Record a file outcome and the imports it left unresolved.
    pub fn record(&mut self, outcome: FileOutcome, unresolved: Vec<UnresolvedImport>) {
        self.summary.files_scanned += 1;
        match outcome.status {
            FileStatus::Changed => self.summary.files_changed += 1,
            FileStatus::Failed => self.summary.files_failed += 1,
            FileStatus::Unchanged => {}
        }
        self.summary.imports_resolved += outcome.resolved;
        self.summary.imports_unresolved += outcome.unresolved;
        self.files.push(outcome);
        self.unresolved.extend(unresolved);
    }

    /// Write a short human-readable summary.
    pub fn render_text(&self, writer: &mut impl Write) -> io::Result<()> {
        for outcome in self.files.iter().filter(|o| o.status == FileStatus::Failed) {
            writeln!(
                writer,
                "failed: {}: {}",
                outcome.file,
                outcome.error.as_deref().unwrap_or("unknown error")
            )?;
        }
        for import in &self.unresolved {
            writeln!(
                writer,
                "unresolved: {}:{}: from {} import *: {}",
                import.file, import.line, import.module, import.reason
            )?;
        }
        let s = &self.summary;
        let verb = if self.dry_run { "would change" } else { "changed" };
        writeln!(
            writer,
            "{} files scanned, {} {}, {} failed; {} wildcard imports resolved, {} unresolved",
            s.files_scanned, verb, s.files_changed, s.files_failed, s.imports_resolved, s.imports_unresolved
        )
    }
}

// ============================================================================
// Error Response
// ============================================================================

/// Error information for error responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code (also the process exit code).
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// File involved, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl ErrorInfo {
    /// Create from an UnstarError.
    pub fn from_error(err: &UnstarError) -> Self {
        let file = match err {
            UnstarError::FileNotFound { path } => Some(path.clone()),
            UnstarError::ApplyError { file, .. } => file.clone(),
            _ => None,
        };
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
            file,
        }
    }
}

/// Response emitted when a run fails as a whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response for a fatal error.
    pub fn new(err: &UnstarError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

/// Emit a response as pretty-printed JSON to a writer.
///
/// The output is deterministic: same input produces identical bytes.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn unresolved(file: &str, module: &str) -> UnresolvedImport {
        UnresolvedImport {
            file: file.to_string(),
            line: 3,
            module: module.to_string(),
            reason: "module not found".to_string(),
        }
    }

    mod report {
        use super::*;

        #[test]
        fn record_updates_summary() {
            let mut report = RunReport::new(false);
            report.record(
                FileOutcome::processed("pkg/a.py", Some("pkg.a".into()), true, 2, 1),
                vec![unresolved("pkg/a.py", "missing")],
            );
            report.record(
                FileOutcome::processed("pkg/b.py", Some("pkg.b".into()), false, 0, 0),
                vec![],
            );
            report.record(FileOutcome::failed("pkg/c.py", None, "invalid syntax"), vec![]);

            assert_eq!(
                report.summary,
                RunSummary {
                    files_scanned: 3,
                    files_changed: 1,
                    files_failed: 1,
                    imports_resolved: 2,
                    imports_unresolved: 1,
                }
            );
            assert_eq!(report.unresolved.len(), 1);
        }

        #[test]
        fn render_text_lists_failures_and_unresolved() {
            let mut report = RunReport::new(true);
            report.record(
                FileOutcome::processed("a.py", None, true, 1, 1),
                vec![unresolved("a.py", ".missing")],
            );
            report.record(FileOutcome::failed("b.py", None, "invalid syntax"), vec![]);

            let mut out = Vec::new();
            report.render_text(&mut out).unwrap();
            let text = String::from_utf8(out).unwrap();

            assert!(text.contains("failed: b.py: invalid syntax"));
            assert!(text.contains("unresolved: a.py:3: from .missing import *: module not found"));
            assert!(text.contains("2 files scanned, would change 1, 1 failed"));
        }

        #[test]
        fn json_uses_snake_case_status() {
            let mut report = RunReport::new(false);
            report.record(FileOutcome::processed("a.py", None, true, 1, 0), vec![]);

            let mut out = Vec::new();
            emit_response(&report, &mut out).unwrap();
            let json: serde_json::Value = serde_json::from_slice(&out).unwrap();

            assert_eq!(json["status"], "ok");
            assert_eq!(json["schema_version"], SCHEMA_VERSION);
            assert_eq!(json["files"][0]["status"], "changed");
            assert!(json["files"][0].get("error").is_none());
            assert_eq!(json["summary"]["files_changed"], 1);
        }
    }

    mod error_response {
        use super::*;

        #[test]
        fn carries_code_and_file() {
            let err = UnstarError::apply("disk full", Some("pkg/a.py".to_string()));
            let response = ErrorResponse::new(&err);
            assert_eq!(response.status, "error");
            assert_eq!(response.error.code, 4);
            assert_eq!(response.error.file.as_deref(), Some("pkg/a.py"));
        }
    }
}
