//! Usage scanning.
//!
//! Finds which candidate names a module refers to. Used to narrow a library
//! module's public names down to the ones the importing file needs.

use std::collections::BTreeSet;

use crate::syntax::{ImportNames, NodeKind, SyntaxTree};

/// Names from `candidates` that `tree` references or declares.
///
/// Counted: `Name` nodes, function and class names, and names bound by
/// imports. Attribute members, call keywords and parameters are not
/// references to module-level names and never count.
pub fn find_used_names(tree: &SyntaxTree, candidates: &BTreeSet<String>) -> BTreeSet<String> {
    let mut used = BTreeSet::new();
    if candidates.is_empty() {
        return used;
    }

    let mut check = |name: &str| {
        if candidates.contains(name) {
            used.insert(name.to_string());
        }
    };

    for node in tree.walk() {
        match &node.kind {
            NodeKind::Name { id } => check(id),
            NodeKind::FunctionDef { name } | NodeKind::ClassDef { name } => check(name),
            NodeKind::Import { names } => {
                for alias in names {
                    check(alias.bound_name());
                }
            }
            NodeKind::ImportFrom {
                names: ImportNames::Aliases(aliases),
                ..
            } => {
                for alias in aliases {
                    check(alias.bound_name());
                }
            }
            _ => {}
        }
    }

    used
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_source;

    fn used(source: &str, candidates: &[&str]) -> Vec<String> {
        let tree = parse_source(source).unwrap();
        let candidates = candidates.iter().map(|s| s.to_string()).collect();
        find_used_names(&tree, &candidates).into_iter().collect()
    }

    #[test]
    fn referenced_names_count() {
        let source = "from external_lib import *\n\nFoo()\n";
        assert_eq!(used(source, &["Foo", "Bar", "Baz"]), vec!["Foo"]);
    }

    #[test]
    fn attributes_keywords_and_params_do_not_count() {
        let source = "\
def f(Bar):
    return obj.Baz(Qux=1)
";
        assert!(used(source, &["Bar", "Baz", "Qux"]).is_empty());
    }

    #[test]
    fn declarations_count() {
        let source = "class Foo:\n    pass\ndef bar():\n    pass\nimport baz\n";
        assert_eq!(used(source, &["Foo", "bar", "baz", "other"]), vec!["Foo", "bar", "baz"]);
    }

    #[test]
    fn nested_uses_count() {
        let source = "\
def outer():
    def inner():
        return [Deep(x) for x in items]
    return inner
";
        assert_eq!(used(source, &["Deep", "items"]), vec!["Deep", "items"]);
    }

    #[test]
    fn empty_candidates() {
        assert!(used("x = 1\n", &[]).is_empty());
    }
}
