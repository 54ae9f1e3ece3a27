//! Module loading.
//!
//! Maps a [`ModuleRef`] written in some importing file to either project
//! source or an installed library. Project source is searched relative to
//! the importing file and under the project roots; libraries are searched on
//! the library path and, for compiled modules with no source, introspected
//! through the Python interpreter.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::env::{introspect_module, PythonEnv, INTROSPECT_TIMEOUT};
use crate::exports::{explicit_exports, public_bindings};
use crate::imports::extract_imports;
use crate::registry::{CachedSource, ModuleRegistry, SourceCache, SourceError};
use crate::types::{ModuleIdentity, ModuleRef};

/// Errors from [`ModuleLoader::load`].
#[derive(Debug, Error)]
pub enum LoadError {
    /// Neither project source nor a library matched.
    #[error("module '{module}' not found")]
    NotFound { module: String },

    /// A file matched but could not be read or parsed.
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// An installed library, reduced to what a wildcard import can see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryModule {
    /// Dotted module name.
    pub name: String,
    /// Declared `__all__`, if any.
    pub all: Option<Vec<String>>,
    /// Every attribute the module exposes, apart from `reexports`.
    pub attributes: Vec<String>,
    /// The library's own wildcard imports. Their names are attributes too,
    /// but only known once each module is loaded in turn.
    pub reexports: Vec<ModuleRef>,
    /// Source or stub file the library was read from; `None` when
    /// introspected.
    pub path: Option<PathBuf>,
}

impl LibraryModule {
    /// Read a library's surface statically from its source.
    pub fn from_source(name: impl Into<String>, source: &CachedSource) -> Self {
        let all = explicit_exports(&source.tree);
        let reexports = if all.is_some() {
            Vec::new()
        } else {
            extract_imports(&source.tree)
                .wildcards
                .into_iter()
                .map(|record| record.module_ref)
                .collect()
        };
        LibraryModule {
            name: name.into(),
            all,
            attributes: public_bindings(&source.tree),
            reexports,
            path: Some(source.path.clone()),
        }
    }
}

/// Result of loading a module.
#[derive(Debug, Clone)]
pub enum LoadedModule {
    /// Project source.
    Source {
        identity: ModuleIdentity,
        source: Rc<CachedSource>,
    },
    /// An installed library, from source on the search path or introspected.
    Library {
        identity: ModuleIdentity,
        module: LibraryModule,
    },
}

impl LoadedModule {
    pub fn identity(&self) -> &ModuleIdentity {
        match self {
            LoadedModule::Source { identity, .. } | LoadedModule::Library { identity, .. } => {
                identity
            }
        }
    }
}

/// Locates and loads modules for the resolver.
pub trait ModuleLoader: ModuleRegistry {
    /// Load `module` as imported from the file at `importer`.
    fn load(&mut self, module: &ModuleRef, importer: &Path) -> Result<LoadedModule, LoadError>;
}

/// Loader for a directory of Python source.
#[derive(Debug)]
pub struct ProjectLoader {
    project_roots: Vec<PathBuf>,
    search_paths: Vec<PathBuf>,
    python: Option<PythonEnv>,
    cache: SourceCache,
    introspected: HashMap<String, Option<LibraryModule>>,
}

impl ProjectLoader {
    /// Create a loader resolving absolute references against `project_roots`.
    pub fn new(project_roots: Vec<PathBuf>) -> Self {
        ProjectLoader {
            project_roots,
            search_paths: Vec::new(),
            python: None,
            cache: SourceCache::new(),
            introspected: HashMap::new(),
        }
    }

    /// Directories searched for installed libraries.
    pub fn with_search_paths(mut self, search_paths: Vec<PathBuf>) -> Self {
        self.search_paths = search_paths;
        self
    }

    /// Interpreter used to introspect compiled libraries.
    pub fn with_introspection(mut self, python: Option<PythonEnv>) -> Self {
        self.python = python;
        self
    }

    pub fn project_roots(&self) -> &[PathBuf] {
        &self.project_roots
    }

    pub fn cache(&self) -> &SourceCache {
        &self.cache
    }

    /// Find project source for `module`.
    fn find_source(&self, module: &ModuleRef, importer: &Path) -> Option<PathBuf> {
        let importer_dir = importer.parent().unwrap_or(Path::new("."));
        let segments: Vec<&str> = module.segments().collect();

        if module.is_relative() {
            let mut base = importer_dir;
            for _ in 1..module.level {
                base = base.parent()?;
            }
            // Inside a stub package, siblings are stubs too.
            let in_stub = importer.extension().is_some_and(|ext| ext == "pyi");
            return find_module_file(base, &segments, in_stub);
        }

        std::iter::once(importer_dir)
            .chain(self.project_roots.iter().map(PathBuf::as_path))
            .find_map(|dir| find_module_file(dir, &segments, false))
    }

    fn load_library(&mut self, module: &ModuleRef) -> Result<Option<LoadedModule>, LoadError> {
        let segments: Vec<&str> = module.segments().collect();
        if module.is_relative() || segments.is_empty() {
            return Ok(None);
        }

        let found = self
            .search_paths
            .iter()
            .find_map(|dir| find_module_file(dir, &segments, true));
        if let Some(path) = found {
            debug!(module = %module, path = %path.display(), "library source found");
            let source = self.cache.load(&path)?;
            let library = LibraryModule::from_source(module.name.clone(), &source);
            if library.all.is_none() && !library.reexports.is_empty() {
                // The runtime view already includes every re-exported name.
                if let Some(introspected) = self.introspect(&module.name) {
                    debug!(module = %module, "re-exporting library introspected");
                    return Ok(Some(LoadedModule::Library {
                        identity: ModuleIdentity::Library(introspected.name.clone()),
                        module: introspected,
                    }));
                }
            }
            return Ok(Some(LoadedModule::Library {
                identity: ModuleIdentity::for_file(&path),
                module: library,
            }));
        }

        Ok(self
            .introspect(&module.name)
            .map(|library| LoadedModule::Library {
                identity: ModuleIdentity::Library(library.name.clone()),
                module: library,
            }))
    }

    fn introspect(&mut self, name: &str) -> Option<LibraryModule> {
        let python = self.python.as_ref()?;
        if let Some(cached) = self.introspected.get(name) {
            return cached.clone();
        }

        let library = match introspect_module(python, name, INTROSPECT_TIMEOUT) {
            Ok(Some(info)) => Some(LibraryModule {
                name: name.to_string(),
                all: info.all,
                attributes: info.attributes,
                reexports: Vec::new(),
                path: None,
            }),
            Ok(None) => None,
            Err(e) => {
                warn!(module = name, "introspection failed: {}", e);
                None
            }
        };
        self.introspected.insert(name.to_string(), library.clone());
        library
    }
}

impl ModuleRegistry for ProjectLoader {
    fn invalidate(&mut self, identity: &ModuleIdentity) {
        self.cache.invalidate(identity);
        if let ModuleIdentity::Library(name) = identity {
            self.introspected.remove(name);
        }
    }
}

impl ModuleLoader for ProjectLoader {
    fn load(&mut self, module: &ModuleRef, importer: &Path) -> Result<LoadedModule, LoadError> {
        if let Some(path) = self.find_source(module, importer) {
            let source = self.cache.load(&path)?;
            return Ok(LoadedModule::Source {
                identity: ModuleIdentity::for_file(&path),
                source,
            });
        }

        self.load_library(module)?.ok_or_else(|| LoadError::NotFound {
            module: module.to_string(),
        })
    }
}

/// Find `a/b.py` or `a/b/__init__.py` (and the `.pyi` forms when
/// `allow_stub`) under `dir`. No segments means the package at `dir` itself.
fn find_module_file(dir: &Path, segments: &[&str], allow_stub: bool) -> Option<PathBuf> {
    let extensions: &[&str] = if allow_stub { &["py", "pyi"] } else { &["py"] };

    let Some((last, parents)) = segments.split_last() else {
        return extensions
            .iter()
            .map(|ext| dir.join(format!("__init__.{}", ext)))
            .find(|p| p.is_file());
    };

    let mut base = dir.to_path_buf();
    for part in parents {
        base.push(part);
    }
    for ext in extensions {
        let file = base.join(format!("{}.{}", last, ext));
        if file.is_file() {
            return Some(file);
        }
        let package = base.join(last).join(format!("__init__.{}", ext));
        if package.is_file() {
            return Some(package);
        }
    }
    None
}
