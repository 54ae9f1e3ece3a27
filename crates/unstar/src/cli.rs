//! Run orchestration for the `unstar` binary.
//!
//! Turns command-line options into a complete run:
//! - validate the target directory and load `[tool.unstar]` configuration
//! - locate a Python interpreter and the library search path
//! - collect files deepest-first and rewrite them
//! - run the formatter over the directory
//!
//! ## Error Handling
//!
//! Only run-level failures (bad arguments, bad configuration, an unreadable
//! file list) are returned as `UnstarError`. Everything that goes wrong for
//! a single file or import ends up in the returned `RunReport`.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, warn};

use unstar_core::config::UnstarConfig;
use unstar_core::error::UnstarError;
use unstar_core::output::RunReport;
use unstar_python::env::{find_python, query_sys_path, PythonEnv};
use unstar_python::files::collect_python_files;
use unstar_python::loader::ProjectLoader;
use unstar_python::ops::unstar::unstar_files;
use unstar_python::ops::UnstarOptions;
use unstar_python::resolve::ResolveOptions;
use unstar_python::rewrite::RewriteMode;

/// Options given on the command line.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    /// Directory to process.
    pub path: PathBuf,
    /// Dotted package name of `path` (default: the directory name).
    pub module: Option<String>,
    /// Print diffs instead of writing.
    pub dry_run: bool,
    pub no_infer_imports: bool,
    pub infer_definitions: bool,
    pub no_introspect: bool,
    pub no_format: bool,
    /// Interpreter override.
    pub python: Option<PathBuf>,
}

impl RunRequest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RunRequest {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Apply command-line overrides on top of file configuration.
    pub fn merge_into(&self, mut config: UnstarConfig) -> UnstarConfig {
        if self.no_infer_imports {
            config.infer_imports = false;
        }
        if self.infer_definitions {
            config.infer_definitions = true;
        }
        if self.no_introspect {
            config.introspect = false;
        }
        if self.no_format || self.dry_run {
            config.format = false;
        }
        if let Some(python) = &self.python {
            config.python = Some(python.clone());
        }
        config
    }
}

/// Process a directory.
///
/// Preview diffs are written to `diff_sink`.
pub fn run_unstar(request: &RunRequest, diff_sink: &mut dyn Write) -> Result<RunReport, UnstarError> {
    let target = validate_target(&request.path)?;

    let file_config = UnstarConfig::load(&target)?;
    if let Some((path, _)) = &file_config {
        info!("using configuration from {}", path.display());
    }
    let config = request.merge_into(file_config.map(|(_, c)| c).unwrap_or_default());

    let package = match &request.module {
        Some(module) => module.clone(),
        None => package_name(&target),
    };
    info!("processing directory {} as package {}", target.display(), package);

    let python = find_python(config.python.as_deref())?;
    match &python {
        Some(env) => debug!("using Python {} ({})", env.interpreter.display(), env.source),
        None => debug!("no Python interpreter found; library lookup uses search_paths only"),
    }

    let mut search_paths = config.search_paths.clone();
    if let Some(env) = &python {
        search_paths.extend(library_path(env));
    }

    let files = collect_python_files(&target, &package, &config.exclude)?;

    let mut roots = Vec::new();
    if let Some(parent) = target.parent() {
        roots.push(parent.to_path_buf());
    }
    roots.push(target.clone());

    let introspection = if config.introspect { python } else { None };
    let mut loader = ProjectLoader::new(roots)
        .with_search_paths(search_paths)
        .with_introspection(introspection);

    let options = UnstarOptions {
        resolve: ResolveOptions {
            infer_imports: config.infer_imports,
            infer_definitions: config.infer_definitions,
        },
        mode: if request.dry_run {
            RewriteMode::Preview
        } else {
            RewriteMode::Commit
        },
    };

    let report = unstar_files(&files, &mut loader, &options, diff_sink);

    if config.format {
        run_formatter(&config.formatter, &target);
    } else {
        debug!("skipping formatter");
    }

    Ok(report)
}

fn validate_target(path: &Path) -> Result<PathBuf, UnstarError> {
    if !path.exists() {
        return Err(UnstarError::file_not_found(path.display().to_string()));
    }
    if !path.is_dir() {
        return Err(UnstarError::invalid_args(format!(
            "path is not a directory: {}",
            path.display()
        )));
    }
    path.canonicalize()
        .map_err(|e| UnstarError::internal(format!("failed to resolve {}: {}", path.display(), e)))
}

/// Default package name: the directory's own name.
fn package_name(target: &Path) -> String {
    target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn library_path(env: &PythonEnv) -> Vec<PathBuf> {
    match query_sys_path(env) {
        Ok(paths) => paths.into_iter().filter(|p| p.is_dir()).collect(),
        Err(e) => {
            warn!("could not read sys.path from {}: {}", env.interpreter.display(), e);
            Vec::new()
        }
    }
}

// ============================================================================
// Formatter
// ============================================================================

/// What happened when the formatter was invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatterOutcome {
    /// The command list was empty.
    NotConfigured,
    /// The formatter binary is not on `$PATH`.
    Missing { program: String },
    /// The formatter ran and exited non-zero (or could not be started).
    Failed { program: String, detail: String },
    Succeeded,
}

/// Run `command` with `target` appended. Failures are warnings.
pub fn run_formatter(command: &[String], target: &Path) -> FormatterOutcome {
    let Some((program, args)) = command.split_first() else {
        return FormatterOutcome::NotConfigured;
    };

    let Ok(binary) = which::which(program) else {
        warn!("formatter '{}' not found; skipping", program);
        return FormatterOutcome::Missing {
            program: program.clone(),
        };
    };

    info!("running {} on {}", program, target.display());
    let result = Command::new(binary).args(args).arg(target).output();
    match result {
        Ok(output) if output.status.success() => FormatterOutcome::Succeeded,
        Ok(output) => {
            let detail = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("formatter '{}' exited with {}: {}", program, output.status, detail);
            FormatterOutcome::Failed {
                program: program.clone(),
                detail,
            }
        }
        Err(e) => {
            warn!("failed to run formatter '{}': {}", program, e);
            FormatterOutcome::Failed {
                program: program.clone(),
                detail: e.to_string(),
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
    use std::fs;
    use unstar_core::error::OutputErrorCode;

    fn quiet_request(path: &Path) -> RunRequest {
        RunRequest {
            no_format: true,
            no_introspect: true,
            ..RunRequest::new(path)
        }
    }

    mod overrides {
        use super::*;

        #[test]
        fn flags_override_file() {
            let request = RunRequest {
                no_infer_imports: true,
                infer_definitions: true,
                no_introspect: true,
                python: Some(PathBuf::from("/opt/py")),
                ..RunRequest::new("pkg")
            };
            let merged = request.merge_into(UnstarConfig::default());
            assert!(!merged.infer_imports);
            assert!(merged.infer_definitions);
            assert!(!merged.introspect);
            assert!(merged.format);
            assert_eq!(merged.python, Some(PathBuf::from("/opt/py")));
        }

        #[test]
        fn dry_run_never_formats() {
            let request = RunRequest {
                dry_run: true,
                ..RunRequest::new("pkg")
            };
            assert!(!request.merge_into(UnstarConfig::default()).format);
        }
    }

    mod target {
        use super::*;

        #[test]
        fn missing_path_is_resolution_error() {
            let mut sink = Vec::new();
            let err = run_unstar(&quiet_request(Path::new("/no/such/pkg")), &mut sink).unwrap_err();
            assert_eq!(err.error_code(), OutputErrorCode::ResolutionError);
        }

        #[test]
        fn file_path_is_invalid_args() {
            let dir = tempfile::tempdir().unwrap();
            let file = dir.path().join("a.py");
            fs::write(&file, "").unwrap();
            let mut sink = Vec::new();
            let err = run_unstar(&quiet_request(&file), &mut sink).unwrap_err();
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
        }

        #[test]
        fn package_name_is_directory_name() {
            assert_eq!(package_name(Path::new("/src/mypkg")), "mypkg");
        }
    }

    mod formatter {
        use super::*;

        #[test]
        fn empty_command_is_not_configured() {
            assert_eq!(
                run_formatter(&[], Path::new(".")),
                FormatterOutcome::NotConfigured
            );
        }

        #[test]
        fn missing_binary_is_reported() {
            let outcome = run_formatter(
                &["definitely-not-a-formatter-xyz".to_string()],
                Path::new("."),
            );
            assert!(matches!(outcome, FormatterOutcome::Missing { .. }));
        }
    }

    #[test]
    fn run_rewrites_package() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join("pkg");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("a.py"), "from pkg.b import *\n\nWidget()\n").unwrap();
        fs::write(pkg.join("b.py"), "__all__ = [\"Widget\", \"Gadget\"]\n").unwrap();

        let mut sink = Vec::new();
        let report = run_unstar(&quiet_request(&pkg), &mut sink).unwrap();

        assert_eq!(report.summary.files_changed, 1);
        assert_eq!(
            fs::read_to_string(pkg.join("a.py")).unwrap(),
            "from pkg.b import Gadget, Widget\n\nWidget()\n"
        );
    }
}
