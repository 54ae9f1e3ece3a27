//! Import extraction.
//!
//! Walks a [`SyntaxTree`] and classifies every import statement. Wildcard
//! imports become [`ImportRecord`]s, in source order; every other import
//! contributes the names it binds.

use serde::Serialize;

use crate::syntax::{ImportNames, NodeKind, SyntaxTree};
use crate::types::{LineSpan, ModuleRef};

/// One import statement as found in a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRecord {
    /// Statement span (first line through the line holding its last token).
    pub span: LineSpan,
    /// The module as written.
    pub module_ref: ModuleRef,
    /// True when the name list is exactly `*`.
    pub is_wildcard: bool,
}

impl ImportRecord {
    pub fn start_line(&self) -> u32 {
        self.span.start_line
    }

    pub fn end_line(&self) -> u32 {
        self.span.end_line
    }
}

/// Result of [`extract_imports`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedImports {
    /// Names bound by non-wildcard imports, first occurrence order.
    pub plain: Vec<String>,
    /// Wildcard imports, in source order.
    pub wildcards: Vec<ImportRecord>,
}

impl ExtractedImports {
    fn bind(&mut self, name: &str) {
        if !name.is_empty() && !self.plain.iter().any(|n| n == name) {
            self.plain.push(name.to_string());
        }
    }
}

/// Extract every import of `tree`, including those nested in functions,
/// classes and conditionals.
pub fn extract_imports(tree: &SyntaxTree) -> ExtractedImports {
    let mut out = ExtractedImports::default();
    for node in tree.walk() {
        match &node.kind {
            NodeKind::Import { names } => {
                for alias in names {
                    out.bind(alias.bound_name());
                }
            }
            NodeKind::ImportFrom { module, names } => match names {
                ImportNames::Wildcard => out.wildcards.push(ImportRecord {
                    span: node.span,
                    module_ref: module.clone(),
                    is_wildcard: true,
                }),
                ImportNames::Aliases(_) if is_future(module) => {}
                ImportNames::Aliases(aliases) => {
                    for alias in aliases {
                        out.bind(alias.bound_name());
                    }
                }
            },
            _ => {}
        }
    }
    out
}

fn is_future(module: &ModuleRef) -> bool {
    module.level == 0 && module.name == "__future__"
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_source;

    fn extract(source: &str) -> ExtractedImports {
        extract_imports(&parse_source(source).unwrap())
    }

    mod wildcards {
        use super::*;

        #[test]
        fn single_wildcard() {
            let imports = extract("from pkg.b import *\n");
            assert_eq!(imports.wildcards.len(), 1);
            let record = &imports.wildcards[0];
            assert!(record.is_wildcard);
            assert_eq!(record.module_ref, ModuleRef::absolute("pkg.b"));
            assert_eq!(record.start_line(), 1);
            assert_eq!(record.end_line(), 1);
            assert!(imports.plain.is_empty());
        }

        #[test]
        fn source_order_and_nesting() {
            let source = "\
from a import *
if flag:
    from .b import *
def f():
    from ..c import *
";
            let imports = extract(source);
            let modules: Vec<_> = imports
                .wildcards
                .iter()
                .map(|r| r.module_ref.to_string())
                .collect();
            assert_eq!(modules, vec!["a", ".b", "..c"]);
            assert_eq!(imports.wildcards[1].start_line(), 3);
            assert_eq!(imports.wildcards[2].span.start_col, 4);
        }

        #[test]
        fn explicit_list_is_not_wildcard() {
            let imports = extract("from m import a, b\n");
            assert!(imports.wildcards.is_empty());
            assert_eq!(imports.plain, vec!["a", "b"]);
        }
    }

    mod plain {
        use super::*;

        #[test]
        fn bound_names() {
            let source = "\
import os.path
import numpy as np
from collections import OrderedDict as OD, deque
";
            let imports = extract(source);
            assert_eq!(imports.plain, vec!["os", "np", "OD", "deque"]);
        }

        #[test]
        fn duplicates_are_collapsed() {
            let imports = extract("import os\nimport os.path\nfrom os import sep\n");
            assert_eq!(imports.plain, vec!["os", "sep"]);
        }

        #[test]
        fn future_imports_bind_nothing() {
            let imports = extract("from __future__ import annotations\nimport re\n");
            assert_eq!(imports.plain, vec!["re"]);
        }
    }
}
