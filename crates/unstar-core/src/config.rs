//! Configuration handling for unstar.
//!
//! Settings live in the `[tool.unstar]` table of a `pyproject.toml`. Every
//! key is optional; command-line flags override whatever the file says.
//!
//! ```toml
//! [tool.unstar]
//! infer_imports = true
//! infer_definitions = false
//! introspect = true
//! format = true
//! formatter = ["black", "--quiet"]
//! python = ".venv/bin/python"
//! search_paths = ["vendor"]
//! exclude = ["migrations/", "*_pb2.py"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has wrongly-typed keys.
    #[error("invalid config in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

/// Settings for a run, as read from `[tool.unstar]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UnstarConfig {
    /// Infer export lists from a module's own imports when it has no `__all__`.
    pub infer_imports: bool,

    /// Also treat public top-level definitions as exports when inferring.
    pub infer_definitions: bool,

    /// Ask the Python interpreter about compiled libraries with no source.
    pub introspect: bool,

    /// Run the formatter after all files are processed.
    pub format: bool,

    /// Formatter command; the target directory is appended as the last argument.
    pub formatter: Vec<String>,

    /// Python interpreter used for `sys.path` discovery and introspection.
    pub python: Option<PathBuf>,

    /// Extra library search directories, searched before `sys.path`.
    pub search_paths: Vec<PathBuf>,

    /// Path component patterns to skip while collecting files.
    pub exclude: Vec<String>,
}

impl Default for UnstarConfig {
    fn default() -> Self {
        UnstarConfig {
            infer_imports: true,
            infer_definitions: false,
            introspect: true,
            format: true,
            formatter: vec!["black".to_string()],
            python: None,
            search_paths: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PyProject {
    #[serde(default)]
    tool: Option<ToolTable>,
}

#[derive(Debug, Deserialize)]
struct ToolTable {
    #[serde(default)]
    unstar: Option<UnstarConfig>,
}

impl UnstarConfig {
    /// Parse the `[tool.unstar]` table out of pyproject.toml content.
    ///
    /// Returns `Ok(None)` when the file has no such table.
    pub fn from_pyproject_str(content: &str, path: &Path) -> Result<Option<Self>, ConfigError> {
        let pyproject: PyProject = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;
        Ok(pyproject.tool.and_then(|tool| tool.unstar))
    }

    /// Load configuration for a target directory.
    ///
    /// Looks for `pyproject.toml` in `dir`, then in its parent. The first
    /// file with a `[tool.unstar]` table wins. Relative `python` and
    /// `search_paths` entries are resolved against that file's directory.
    pub fn load(dir: &Path) -> Result<Option<(PathBuf, Self)>, ConfigError> {
        let candidates = std::iter::once(dir).chain(dir.parent());
        for candidate in candidates {
            let path = candidate.join("pyproject.toml");
            if !path.is_file() {
                continue;
            }
            let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            if let Some(config) = Self::from_pyproject_str(&content, &path)? {
                tracing::debug!(path = %path.display(), "loaded [tool.unstar] config");
                return Ok(Some((path, config.resolved_against(candidate))));
            }
        }
        Ok(None)
    }

    fn resolved_against(mut self, base: &Path) -> Self {
        self.python = self.python.map(|p| absolutize(base, p));
        self.search_paths = self
            .search_paths
            .into_iter()
            .map(|p| absolutize(base, p))
            .collect();
        self
    }
}

fn absolutize(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

// ============================================================================
// Tests
// ============================================================================
