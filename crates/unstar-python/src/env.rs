//! Python environment resolution.
//!
//! A Python interpreter is optional. When one is found it supplies the
//! library search path (`sys.path`) and introspects compiled modules that
//! have no source to read.
//!
//! ## Resolution Order
//!
//! 1. Explicit `--python` flag or `python` config key
//! 2. `$UNSTAR_PYTHON` environment variable
//! 3. `$VIRTUAL_ENV/bin/python` (user's active venv)
//! 4. `$CONDA_PREFIX/bin/python` (user's active conda)
//! 5. `python3`, then `python`, from `$PATH`

use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use wait_timeout::ChildExt;

/// Environment variable naming an interpreter.
pub const PYTHON_ENV_VAR: &str = "UNSTAR_PYTHON";

/// How long a single introspection subprocess may run.
pub const INTROSPECT_TIMEOUT: Duration = Duration::from_secs(10);

#[cfg(not(windows))]
const VENV_BIN_DIR: &str = "bin";
#[cfg(windows)]
const VENV_BIN_DIR: &str = "Scripts";

const PYTHON_NAMES: &[&str] = &["python3", "python"];

const SYS_PATH_SCRIPT: &str = "import json, sys; print(json.dumps([p for p in sys.path if p]))";

const INTROSPECT_SCRIPT: &str = r#"
import importlib, json, sys
try:
    mod = importlib.import_module(sys.argv[1])
except BaseException:
    print("null")
    sys.exit(0)
exported = getattr(mod, "__all__", None)
if exported is not None:
    try:
        exported = [str(n) for n in exported]
    except TypeError:
        exported = None
print(json.dumps({"all": exported, "attributes": sorted(dir(mod))}))
"#;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while locating or running Python.
#[derive(Debug, Error)]
pub enum PythonEnvError {
    /// An explicitly requested interpreter does not exist.
    #[error("Python interpreter not found at {path}")]
    NotFound { path: PathBuf },

    /// Python binary exists but is not executable.
    #[error("Python at {path} is not executable")]
    NotExecutable { path: PathBuf },

    /// Failed to execute Python.
    #[error("failed to execute Python at {path}: {reason}")]
    ExecutionFailed { path: PathBuf, reason: String },

    /// The subprocess ran past its deadline and was killed.
    #[error("Python at {path} timed out after {seconds}s")]
    Timeout { path: PathBuf, seconds: u64 },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The subprocess printed something other than the expected JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for Python environment operations.
pub type PythonEnvResult<T> = Result<T, PythonEnvError>;

// ============================================================================
// Environment
// ============================================================================

/// Where an interpreter came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// `--python` flag or `python` config key.
    Explicit,
    /// `$UNSTAR_PYTHON`.
    EnvVar,
    /// `$VIRTUAL_ENV`.
    VirtualEnv,
    /// `$CONDA_PREFIX`.
    CondaPrefix,
    /// Found on `$PATH`.
    Path,
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResolutionSource::Explicit => "explicit",
            ResolutionSource::EnvVar => "$UNSTAR_PYTHON",
            ResolutionSource::VirtualEnv => "$VIRTUAL_ENV",
            ResolutionSource::CondaPrefix => "$CONDA_PREFIX",
            ResolutionSource::Path => "$PATH",
        };
        write!(f, "{}", s)
    }
}

/// A resolved interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonEnv {
    pub interpreter: PathBuf,
    pub source: ResolutionSource,
}

impl PythonEnv {
    /// Wrap a known interpreter path.
    pub fn new(interpreter: impl Into<PathBuf>, source: ResolutionSource) -> Self {
        PythonEnv {
            interpreter: interpreter.into(),
            source,
        }
    }
}

/// What introspection learned about a compiled module.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModuleIntrospection {
    /// The module's `__all__`, when it has one.
    pub all: Option<Vec<String>>,
    /// `dir(module)`, sorted.
    pub attributes: Vec<String>,
}

/// Locate an interpreter.
///
/// An explicit path must exist and be executable. Otherwise the first hit of
/// the resolution order wins, and `Ok(None)` means there is no Python at all.
pub fn find_python(explicit: Option<&Path>) -> PythonEnvResult<Option<PythonEnv>> {
    if let Some(path) = explicit {
        let canonical = path.canonicalize().map_err(|_| PythonEnvError::NotFound {
            path: path.to_path_buf(),
        })?;
        if !is_executable(&canonical) {
            return Err(PythonEnvError::NotExecutable { path: canonical });
        }
        return Ok(Some(PythonEnv::new(canonical, ResolutionSource::Explicit)));
    }

    if let Ok(path_str) = std::env::var(PYTHON_ENV_VAR) {
        if let Some(path) = usable(Path::new(&path_str)) {
            return Ok(Some(PythonEnv::new(path, ResolutionSource::EnvVar)));
        }
        debug!("${} is set but not usable: {}", PYTHON_ENV_VAR, path_str);
    }

    for (var, source) in [
        ("VIRTUAL_ENV", ResolutionSource::VirtualEnv),
        ("CONDA_PREFIX", ResolutionSource::CondaPrefix),
    ] {
        if let Ok(prefix) = std::env::var(var) {
            for name in PYTHON_NAMES {
                let candidate = PathBuf::from(&prefix).join(VENV_BIN_DIR).join(name);
                if let Some(path) = usable(&candidate) {
                    return Ok(Some(PythonEnv::new(path, source)));
                }
            }
        }
    }

    for name in PYTHON_NAMES {
        if let Ok(found) = which::which(name) {
            if let Some(path) = usable(&found) {
                return Ok(Some(PythonEnv::new(path, ResolutionSource::Path)));
            }
        }
    }

    Ok(None)
}

fn usable(path: &Path) -> Option<PathBuf> {
    let canonical = path.canonicalize().ok()?;
    is_executable(&canonical).then_some(canonical)
}

/// The interpreter's `sys.path`, without the empty current-directory entry.
pub fn query_sys_path(env: &PythonEnv) -> PythonEnvResult<Vec<PathBuf>> {
    let stdout = run_python(env, &["-c", SYS_PATH_SCRIPT], INTROSPECT_TIMEOUT)?;
    let paths: Vec<String> = serde_json::from_str(stdout.trim())?;
    Ok(paths.into_iter().map(PathBuf::from).collect())
}

/// Import `module` in a subprocess and report its `__all__` and `dir()`.
///
/// Returns `Ok(None)` when the module cannot be imported.
pub fn introspect_module(
    env: &PythonEnv,
    module: &str,
    timeout: Duration,
) -> PythonEnvResult<Option<ModuleIntrospection>> {
    let stdout = run_python(env, &["-c", INTROSPECT_SCRIPT, module], timeout)?;
    parse_introspection(&stdout)
}

fn parse_introspection(stdout: &str) -> PythonEnvResult<Option<ModuleIntrospection>> {
    let last_line = stdout.lines().last().unwrap_or("null");
    Ok(serde_json::from_str(last_line.trim())?)
}

/// Run the interpreter, killing it if it outlives `timeout`.
fn run_python(env: &PythonEnv, args: &[&str], timeout: Duration) -> PythonEnvResult<String> {
    let path = &env.interpreter;
    let mut child = Command::new(path)
        .args(args)
        .env("PYTHONDONTWRITEBYTECODE", "1")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| PythonEnvError::ExecutionFailed {
            path: path.clone(),
            reason: e.to_string(),
        })?;

    // Drain stdout on a thread so a chatty module cannot fill the pipe.
    let reader = child.stdout.take().map(|mut stdout| {
        std::thread::spawn(move || {
            let mut buf = String::new();
            stdout.read_to_string(&mut buf).map(|_| buf)
        })
    });

    let status = match child.wait_timeout(timeout)? {
        Some(status) => status,
        None => {
            child.kill()?;
            child.wait()?;
            return Err(PythonEnvError::Timeout {
                path: path.clone(),
                seconds: timeout.as_secs(),
            });
        }
    };

    let stdout = match reader {
        Some(handle) => handle
            .join()
            .map_err(|_| PythonEnvError::ExecutionFailed {
                path: path.clone(),
                reason: "stdout reader panicked".to_string(),
            })??,
        None => String::new(),
    };

    if !status.success() {
        return Err(PythonEnvError::ExecutionFailed {
            path: path.clone(),
            reason: format!("exited with {}", status),
        });
    }
    Ok(stdout)
}

/// Check if a path is executable.
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path)
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

// ============================================================================
// Tests
// ============================================================================
