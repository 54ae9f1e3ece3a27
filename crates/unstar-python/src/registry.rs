//! Loaded-module registry.
//!
//! Resolution reads the same modules over and over while a directory is
//! processed. [`SourceCache`] keeps each module's text and parsed tree
//! until a rewrite changes the file and invalidates it.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use thiserror::Error;
use tracing::trace;

use crate::syntax::{parse_source, ParseError, SyntaxTree};
use crate::types::ModuleIdentity;

/// Something that holds loaded modules and must forget them when their
/// source changes.
pub trait ModuleRegistry {
    /// Drop any cached state for `identity`.
    fn invalidate(&mut self, identity: &ModuleIdentity);
}

/// Errors reading a module through the cache.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

/// A module's source text and parsed tree.
#[derive(Debug)]
pub struct CachedSource {
    pub path: PathBuf,
    pub text: String,
    pub tree: SyntaxTree,
}

/// Cache of module sources keyed by canonical path.
#[derive(Debug, Default)]
pub struct SourceCache {
    entries: HashMap<PathBuf, Rc<CachedSource>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse `path`, or return the cached copy.
    pub fn load(&mut self, path: &Path) -> Result<Rc<CachedSource>, SourceError> {
        let key = canonical(path);
        if let Some(entry) = self.entries.get(&key) {
            trace!(path = %key.display(), "source cache hit");
            return Ok(Rc::clone(entry));
        }

        let text = fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tree = parse_source(&text).map_err(|source| SourceError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let entry = Rc::new(CachedSource {
            path: path.to_path_buf(),
            text,
            tree,
        });
        self.entries.insert(key, Rc::clone(&entry));
        Ok(entry)
    }

    /// Whether `path` is currently cached.
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(&canonical(path))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ModuleRegistry for SourceCache {
    fn invalidate(&mut self, identity: &ModuleIdentity) {
        if let ModuleIdentity::File(path) = identity {
            if self.entries.remove(&canonical(path)).is_some() {
                trace!(path = %path.display(), "source cache invalidated");
            }
        }
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
