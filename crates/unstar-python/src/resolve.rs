//! Export-set resolution.
//!
//! Given the module named by a wildcard import, work out which names the
//! import really binds. In priority order:
//!
//! 1. A statically declared `__all__` in the module's source.
//! 2. Recursive inference over the module's own imports (and, optionally,
//!    its public definitions), following nested wildcard imports.
//! 3. For installed libraries: the library's public names narrowed to those
//!    the importing file uses.
//!
//! Recursion carries an explicit visited-set of module identities. Each
//! branch extends its own copy, so sibling branches may visit the same
//! module but a branch can never revisit one of its ancestors.

use std::collections::BTreeSet;
use std::fmt;
use std::io;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, debug_span, info};

use crate::exports::{explicit_exports, public_bindings};
use crate::imports::extract_imports;
use crate::loader::{LibraryModule, LoadError, LoadedModule, ModuleLoader};
use crate::registry::{CachedSource, SourceError};
use crate::syntax::{ParseError, SyntaxTree};
use crate::types::{ModuleIdentity, ModuleRef};
use crate::usage::find_used_names;
use crate::validation::{is_public_name, is_valid_identifier};

// ============================================================================
// Errors
// ============================================================================

/// Why a wildcard import could not be resolved.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("module not found: {module}")]
    ModuleNotFound { module: String },

    #[error("import cycle through {module}")]
    CycleDetected { module: String },

    #[error("no export list found for {module}")]
    NoExportList { module: String },

    /// A declared `__all__` that is empty.
    #[error("{module} declares an empty export list")]
    EmptyExportList { module: String },

    /// A library none of whose public names the importing file uses.
    #[error("no names from {module} are used")]
    NoNamesUsed { module: String },

    /// A library re-exports another module whose names cannot be listed.
    #[error("cannot list every name {module} exports: {reason}")]
    IncompleteExports { module: String, reason: String },

    #[error("failed to parse {module}: {source}")]
    Parse {
        module: String,
        #[source]
        source: ParseError,
    },

    #[error("failed to read {module}: {source}")]
    Io {
        module: String,
        #[source]
        source: io::Error,
    },
}

impl ResolveError {
    fn from_load(module: &ModuleRef, err: LoadError) -> Self {
        let module = module.to_string();
        match err {
            LoadError::NotFound { .. } => ResolveError::ModuleNotFound { module },
            LoadError::Source(SourceError::Parse { source, .. }) => {
                ResolveError::Parse { module, source }
            }
            LoadError::Source(SourceError::Io { source, .. }) => {
                ResolveError::Io { module, source }
            }
        }
    }
}

// ============================================================================
// Export Sets
// ============================================================================

/// Where an export set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOrigin {
    /// A declared `__all__`.
    Declared,
    /// Inferred from the module's imports and definitions.
    Inferred,
    /// A library's public names narrowed to those in use.
    UsageNarrowed,
}

impl fmt::Display for ExportOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExportOrigin::Declared => "declared",
            ExportOrigin::Inferred => "inferred",
            ExportOrigin::UsageNarrowed => "usage-narrowed",
        };
        write!(f, "{}", s)
    }
}

/// The names a wildcard import binds.
///
/// Never contains duplicates or invalid identifiers. Declared sets keep
/// their declared order; all others are sorted case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSet {
    names: Vec<String>,
    origin: ExportOrigin,
}

impl ExportSet {
    /// A declared export list, order preserved.
    pub fn declared(names: Vec<String>) -> Self {
        let mut seen = BTreeSet::new();
        let names = names
            .into_iter()
            .filter(|n| is_valid_identifier(n) && seen.insert(n.clone()))
            .collect();
        ExportSet {
            names,
            origin: ExportOrigin::Declared,
        }
    }

    /// An unordered collection of names, de-duplicated and sorted.
    pub fn collected(names: impl IntoIterator<Item = String>, origin: ExportOrigin) -> Self {
        let unique: BTreeSet<String> = names
            .into_iter()
            .filter(|n| is_valid_identifier(n))
            .collect();
        let mut names: Vec<String> = unique.into_iter().collect();
        sort_case_insensitive(&mut names);
        ExportSet { names, origin }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn origin(&self) -> ExportOrigin {
        self.origin
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in case-insensitive order, as written into an import line.
    pub fn sorted_names(&self) -> Vec<String> {
        let mut names = self.names.clone();
        sort_case_insensitive(&mut names);
        names
    }
}

/// Sort names case-insensitively; ties between case variants fall back to
/// byte order so the result is total.
pub fn sort_case_insensitive(names: &mut [String]) {
    names.sort_by_cached_key(|n| (n.to_lowercase(), n.clone()));
}

// ============================================================================
// Resolver
// ============================================================================

/// Switches for the inference steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Follow a module's imports when it has no `__all__`.
    pub infer_imports: bool,
    /// Also count a module's public top-level definitions when inferring.
    pub infer_definitions: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            infer_imports: true,
            infer_definitions: false,
        }
    }
}

/// State for one top-level resolution.
#[derive(Debug, Clone)]
pub struct ResolveContext<'t> {
    /// Tree of the file being rewritten. Library usage is always measured
    /// against it, however deep the recursion.
    root_tree: &'t SyntaxTree,
    visited: BTreeSet<ModuleIdentity>,
}

impl<'t> ResolveContext<'t> {
    /// Start resolving wildcard imports of the file `root`.
    pub fn new(root_tree: &'t SyntaxTree, root: ModuleIdentity) -> Self {
        ResolveContext {
            root_tree,
            visited: BTreeSet::from([root]),
        }
    }

    /// A copy of this context that has also visited `identity`.
    pub fn visit(&self, identity: ModuleIdentity) -> Self {
        let mut next = self.clone();
        next.visited.insert(identity);
        next
    }

    pub fn has_visited(&self, identity: &ModuleIdentity) -> bool {
        self.visited.contains(identity)
    }

    pub fn depth(&self) -> usize {
        self.visited.len()
    }
}

/// Resolves wildcard imports to export sets.
pub struct ExportResolver<'l> {
    loader: &'l mut dyn ModuleLoader,
    options: ResolveOptions,
}

impl<'l> ExportResolver<'l> {
    pub fn new(loader: &'l mut dyn ModuleLoader, options: ResolveOptions) -> Self {
        ExportResolver { loader, options }
    }

    /// Resolve the export set of `module` as imported by the file at
    /// `importer`.
    pub fn resolve(
        &mut self,
        module: &ModuleRef,
        importer: &Path,
        ctx: &ResolveContext<'_>,
    ) -> Result<ExportSet, ResolveError> {
        let span = debug_span!("resolve", module = %module, depth = ctx.depth());
        let _enter = span.enter();

        let loaded = self
            .loader
            .load(module, importer)
            .map_err(|e| ResolveError::from_load(module, e))?;

        if ctx.has_visited(loaded.identity()) {
            debug!(identity = %loaded.identity(), "cycle detected");
            return Err(ResolveError::CycleDetected {
                module: module.to_string(),
            });
        }

        match loaded {
            LoadedModule::Source { identity, source } => {
                self.resolve_source(module, &source, &ctx.visit(identity))
            }
            LoadedModule::Library {
                identity,
                module: library,
            } => {
                let candidates = self.library_surface(module, &library, &ctx.visit(identity))?;
                narrow_to_usage(module, &candidates, ctx.root_tree)
            }
        }
    }

    /// Every name a wildcard import of `library` binds, following the
    /// library's own wildcard re-exports.
    fn library_surface(
        &mut self,
        module: &ModuleRef,
        library: &LibraryModule,
        ctx: &ResolveContext<'_>,
    ) -> Result<BTreeSet<String>, ResolveError> {
        if let Some(all) = &library.all {
            return Ok(all.iter().filter(|n| is_valid_identifier(n)).cloned().collect());
        }

        let mut names: BTreeSet<String> = library
            .attributes
            .iter()
            .filter(|n| is_public_name(n) && is_valid_identifier(n))
            .cloned()
            .collect();

        let Some(path) = &library.path else {
            return Ok(names);
        };
        for nested in &library.reexports {
            let loaded = self.loader.load(nested, path).map_err(|e| {
                ResolveError::IncompleteExports {
                    module: module.to_string(),
                    reason: e.to_string(),
                }
            })?;
            if ctx.has_visited(loaded.identity()) {
                continue;
            }
            let (identity, inner) = match loaded {
                LoadedModule::Source { identity, source } => (
                    identity,
                    LibraryModule::from_source(nested.to_string(), &source),
                ),
                LoadedModule::Library { identity, module } => (identity, module),
            };
            debug!(module = %nested, "following library re-export");
            names.extend(self.library_surface(module, &inner, &ctx.visit(identity))?);
        }
        Ok(names)
    }

    fn resolve_source(
        &mut self,
        module: &ModuleRef,
        source: &CachedSource,
        ctx: &ResolveContext<'_>,
    ) -> Result<ExportSet, ResolveError> {
        if let Some(declared) = explicit_exports(&source.tree) {
            if declared.is_empty() {
                return Err(ResolveError::EmptyExportList {
                    module: module.to_string(),
                });
            }
            debug!(count = declared.len(), "declared __all__");
            return Ok(ExportSet::declared(declared));
        }

        if !self.options.infer_imports && !self.options.infer_definitions {
            return Err(ResolveError::NoExportList {
                module: module.to_string(),
            });
        }

        let names = self.infer(source, ctx);
        if names.is_empty() {
            return Err(ResolveError::NoExportList {
                module: module.to_string(),
            });
        }
        info!(
            "no __all__ in {}; {} name{} inferred",
            module,
            names.len(),
            if names.len() == 1 { "" } else { "s" }
        );
        Ok(ExportSet::collected(names, ExportOrigin::Inferred))
    }

    /// Names a module without `__all__` hands to a wildcard importer.
    fn infer(&mut self, source: &CachedSource, ctx: &ResolveContext<'_>) -> BTreeSet<String> {
        let mut names = BTreeSet::new();

        if self.options.infer_definitions {
            names.extend(public_bindings(&source.tree));
        }
        if !self.options.infer_imports {
            return names;
        }

        let imports = extract_imports(&source.tree);
        names.extend(imports.plain.into_iter().filter(|n| is_public_name(n)));

        for record in &imports.wildcards {
            match self.resolve(&record.module_ref, &source.path, ctx) {
                Ok(nested) => names.extend(nested.names().iter().cloned()),
                Err(e) => debug!(module = %record.module_ref, "nested import contributes nothing: {}", e),
            }
        }
        names
    }
}

fn narrow_to_usage(
    module: &ModuleRef,
    candidates: &BTreeSet<String>,
    root_tree: &SyntaxTree,
) -> Result<ExportSet, ResolveError> {
    let used = find_used_names(root_tree, candidates);
    debug!(
        candidates = candidates.len(),
        used = used.len(),
        "library narrowed by usage"
    );
    if used.is_empty() {
        return Err(ResolveError::NoNamesUsed {
            module: module.to_string(),
        });
    }
    Ok(ExportSet::collected(used, ExportOrigin::UsageNarrowed))
}

// ============================================================================
// Tests
// ============================================================================
