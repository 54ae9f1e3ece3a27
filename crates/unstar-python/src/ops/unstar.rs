//! The wildcard-import rewrite pass.
//!
//! For each file: read it, find its wildcard imports, resolve each one, and
//! splice in explicit imports for those that resolved. Failures are
//! per-import or per-file; nothing here aborts a run.

use std::io::Write;

use tracing::{debug, info, info_span, warn};
use unstar_core::output::{FileOutcome, RunReport, UnresolvedImport};

use crate::files::SourceFile;
use crate::imports::extract_imports;
use crate::loader::ModuleLoader;
use crate::ops::UnstarOptions;
use crate::resolve::{ExportResolver, ResolveContext, ResolveError};
use crate::rewrite::{apply_replacements, build_replacement, FileBuffer, RewriteOutcome};
use crate::syntax::parse_source;
use crate::types::ModuleIdentity;

/// What happened to one file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub outcome: FileOutcome,
    pub unresolved: Vec<UnresolvedImport>,
}

impl FileReport {
    fn failed(file: &SourceFile, error: impl Into<String>) -> Self {
        FileReport {
            outcome: FileOutcome::failed(file_label(file), Some(file.module_name.clone()), error),
            unresolved: Vec::new(),
        }
    }
}

fn file_label(file: &SourceFile) -> String {
    file.path.display().to_string()
}

/// Process every file in order and collect a report.
///
/// Diffs (preview mode) go to `sink`.
pub fn unstar_files<L: ModuleLoader>(
    files: &[SourceFile],
    loader: &mut L,
    options: &UnstarOptions,
    sink: &mut dyn Write,
) -> RunReport {
    info!("found {} files to process", files.len());
    let mut report = RunReport::new(options.is_preview());
    for file in files {
        let FileReport {
            outcome,
            unresolved,
        } = unstar_file(file, loader, options, sink);
        report.record(outcome, unresolved);
    }
    report
}

/// Replace the wildcard imports of one file.
pub fn unstar_file<L: ModuleLoader>(
    file: &SourceFile,
    loader: &mut L,
    options: &UnstarOptions,
    sink: &mut dyn Write,
) -> FileReport {
    let buffer = match FileBuffer::read(&file.path) {
        Ok(buffer) => buffer,
        Err(e) => {
            warn!("skipping {}: {}", file_label(file), e);
            return FileReport::failed(file, e.to_string());
        }
    };
    let tree = match parse_source(&buffer.text()) {
        Ok(tree) => tree,
        Err(e) => {
            warn!("skipping {}: {}", file_label(file), e);
            return FileReport::failed(file, e.to_string());
        }
    };

    let imports = extract_imports(&tree);
    if imports.wildcards.is_empty() {
        return FileReport {
            outcome: FileOutcome::processed(file_label(file), Some(file.module_name.clone()), false, 0, 0),
            unresolved: Vec::new(),
        };
    }

    let _span = info_span!("file", module = %file.module_name).entered();
    info!("processing {}", file.module_name);

    let identity = ModuleIdentity::for_file(&file.path);
    let mut replacements = Vec::new();
    let mut unresolved = Vec::new();
    {
        let mut resolver = ExportResolver::new(loader, options.resolve);
        for record in &imports.wildcards {
            let ctx = ResolveContext::new(&tree, identity.clone());
            match resolver.resolve(&record.module_ref, &file.path, &ctx) {
                Ok(exports) => {
                    info!(
                        "from {} import *: {} name(s), {}",
                        record.module_ref,
                        exports.len(),
                        exports.origin()
                    );
                    replacements.push(build_replacement(record, &exports));
                }
                Err(e) => {
                    if matches!(e, ResolveError::CycleDetected { .. }) {
                        debug!("from {} import *: {}", record.module_ref, e);
                    } else {
                        warn!(
                            "{}:{}: from {} import * left unchanged: {}",
                            file_label(file),
                            record.start_line(),
                            record.module_ref,
                            e
                        );
                    }
                    unresolved.push(UnresolvedImport {
                        file: file_label(file),
                        line: record.start_line(),
                        module: record.module_ref.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    let resolved = replacements.len() as u32;
    let unresolved_count = unresolved.len() as u32;
    match apply_replacements(&buffer, replacements, options.mode, loader, sink) {
        Ok(outcome) => FileReport {
            outcome: FileOutcome::processed(
                file_label(file),
                Some(file.module_name.clone()),
                matches!(outcome, RewriteOutcome::Changed { .. }),
                resolved,
                unresolved_count,
            ),
            unresolved,
        },
        Err(e) => {
            warn!("failed to rewrite {}: {}", file_label(file), e);
            FileReport {
                unresolved,
                ..FileReport::failed(file, e.to_string())
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::collect_python_files;
    use crate::loader::ProjectLoader;
    use std::fs;
    use std::path::Path;
    use unstar_core::output::FileStatus;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn run(root: &Path, options: UnstarOptions) -> (RunReport, String) {
        let target = root.join("pkg");
        let files = collect_python_files(&target, "pkg", &[]).unwrap();
        let mut loader = ProjectLoader::new(vec![root.to_path_buf(), target.clone()]);
        let mut sink = Vec::new();
        let report = unstar_files(&files, &mut loader, &options, &mut sink);
        (report, String::from_utf8(sink).unwrap())
    }

    #[test]
    fn rewrites_declared_exports() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "pkg/__init__.py", "");
        write(dir.path(), "pkg/a.py", "from pkg.b import *\n\nWidget()\n");
        write(dir.path(), "pkg/b.py", "__all__ = [\"Widget\", \"Gadget\"]\n");

        let (report, diff) = run(dir.path(), UnstarOptions::commit());

        assert!(diff.is_empty());
        assert_eq!(
            fs::read_to_string(dir.path().join("pkg/a.py")).unwrap(),
            "from pkg.b import Gadget, Widget\n\nWidget()\n"
        );
        assert_eq!(report.summary.files_scanned, 3);
        assert_eq!(report.summary.files_changed, 1);
        assert_eq!(report.summary.imports_resolved, 1);
    }

    #[test]
    fn preview_prints_diff_only() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "pkg/a.py", "from .b import *\n");
        write(dir.path(), "pkg/b.py", "__all__ = ['x']\n");

        let (report, diff) = run(dir.path(), UnstarOptions::preview());

        assert!(report.dry_run);
        assert!(diff.contains("+from .b import x\n"));
        assert_eq!(
            fs::read_to_string(dir.path().join("pkg/a.py")).unwrap(),
            "from .b import *\n"
        );
    }

    #[test]
    fn unresolved_import_is_reported_and_kept() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "pkg/a.py", "from nowhere_to_be_found import *\nfrom .b import *\n");
        write(dir.path(), "pkg/b.py", "__all__ = ['x']\n");

        let (report, _) = run(dir.path(), UnstarOptions::commit());

        assert_eq!(
            fs::read_to_string(dir.path().join("pkg/a.py")).unwrap(),
            "from nowhere_to_be_found import *\nfrom .b import x\n"
        );
        assert_eq!(report.unresolved.len(), 1);
        assert_eq!(report.unresolved[0].line, 1);
        assert_eq!(report.unresolved[0].reason, "module not found: nowhere_to_be_found");
    }

    #[test]
    fn parse_failure_fails_only_that_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "pkg/bad.py", "def (:\n");
        write(dir.path(), "pkg/good.py", "from .b import *\n");
        write(dir.path(), "pkg/b.py", "__all__ = ['x']\n");

        let (report, _) = run(dir.path(), UnstarOptions::commit());

        assert_eq!(report.summary.files_failed, 1);
        assert_eq!(report.summary.files_changed, 1);
        let bad = report
            .files
            .iter()
            .find(|f| f.file.ends_with("bad.py"))
            .unwrap();
        assert_eq!(bad.status, FileStatus::Failed);
        assert!(bad.error.as_deref().unwrap().starts_with("invalid syntax"));
    }

    #[test]
    fn second_run_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "pkg/sub/leaf.py", "__all__ = ['Leaf']\n");
        write(dir.path(), "pkg/sub/__init__.py", "from .leaf import *\n");
        write(dir.path(), "pkg/a.py", "from .sub import *\nLeaf()\n");

        let (first, _) = run(dir.path(), UnstarOptions::commit());
        assert_eq!(first.summary.files_changed, 2);
        let snapshot = fs::read_to_string(dir.path().join("pkg/a.py")).unwrap();
        assert_eq!(snapshot, "from .sub import Leaf\nLeaf()\n");

        let (second, _) = run(dir.path(), UnstarOptions::commit());
        assert_eq!(second.summary.files_changed, 0);
        assert_eq!(fs::read_to_string(dir.path().join("pkg/a.py")).unwrap(), snapshot);
    }
}
