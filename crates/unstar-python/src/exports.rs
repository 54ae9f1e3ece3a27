//! Module export lists.
//!
//! [`explicit_exports`] reads a statically declared `__all__`;
//! [`public_bindings`] lists what a module without one would hand to a
//! wildcard importer.

use tracing::warn;

use crate::syntax::{ImportNames, Node, NodeKind, SyntaxTree, Target, Value};
use crate::validation::{is_public_name, validate_python_identifier};

const ALL: &str = "__all__";

/// Statement kinds whose bodies still bind at module level.
const MODULE_LEVEL_BLOCKS: &[&str] = &[
    "if_statement",
    "elif_clause",
    "else_clause",
    "try_statement",
    "except_clause",
    "except_group_clause",
    "finally_clause",
    "with_statement",
    "block",
    "decorated_definition",
];

/// The declared `__all__` of a module, in declared order.
///
/// Only the first top-level assignment to the bare name `__all__` counts,
/// and only when its value is a list or tuple of plain string literals.
/// Later top-level `__all__ += [...]` literals are appended. Elements that
/// are not identifiers are dropped with a warning; duplicates keep their
/// first position.
///
/// Returns `None` when no such declaration exists.
pub fn explicit_exports(tree: &SyntaxTree) -> Option<Vec<String>> {
    let mut declared: Option<Vec<String>> = None;

    for node in tree.top_level() {
        match &node.kind {
            NodeKind::Assign { targets, value, .. } if targets_all(targets) => {
                if declared.is_some() {
                    continue;
                }
                match value {
                    Value::Strings(names) => {
                        let mut list = Vec::new();
                        extend_exports(&mut list, names, node);
                        declared = Some(list);
                    }
                    // A computed `__all__` cannot be read statically.
                    _ => return None,
                }
            }
            NodeKind::AugAssign {
                target: Target::Name(name),
                op,
                value: Value::Strings(names),
            } if name == ALL && op == "+=" => {
                if let Some(list) = declared.as_mut() {
                    extend_exports(list, names, node);
                }
            }
            _ => {}
        }
    }

    declared
}

fn targets_all(targets: &[Target]) -> bool {
    targets
        .iter()
        .any(|t| matches!(t, Target::Name(name) if name == ALL))
}

fn extend_exports(list: &mut Vec<String>, names: &[String], node: &Node) {
    for name in names {
        if let Err(e) = validate_python_identifier(name) {
            warn!(line = node.span.start_line, "dropping __all__ entry: {}", e);
            continue;
        }
        if !list.contains(name) {
            list.push(name.clone());
        }
    }
}

/// Public names bound at module level, in first-binding order.
///
/// Covers function and class definitions, assigned names and names bound by
/// imports, including those inside module-level `if`/`try`/`with` blocks.
/// Names starting with `_` are left out.
pub fn public_bindings(tree: &SyntaxTree) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut bind = |name: &str| {
        if is_public_name(name)
            && validate_python_identifier(name).is_ok()
            && !names.iter().any(|n| n == name)
        {
            names.push(name.to_string());
        }
    };

    let mut stack: Vec<&Node> = tree.top_level().collect();
    stack.reverse();
    while let Some(node) = stack.pop() {
        match &node.kind {
            NodeKind::FunctionDef { name } | NodeKind::ClassDef { name } => bind(name),
            NodeKind::Assign { targets, value, .. } => {
                if *value != Value::Absent {
                    for target in targets {
                        if let Target::Name(name) = target {
                            bind(name);
                        }
                    }
                }
            }
            NodeKind::Import { names } => {
                for alias in names {
                    bind(alias.bound_name());
                }
            }
            NodeKind::ImportFrom {
                module,
                names: ImportNames::Aliases(aliases),
            } if !(module.level == 0 && module.name == "__future__") => {
                for alias in aliases {
                    bind(alias.bound_name());
                }
            }
            NodeKind::Other { kind } if MODULE_LEVEL_BLOCKS.contains(kind) => {
                let mut children: Vec<&Node> = tree.children(node).collect();
                children.reverse();
                stack.extend(children);
            }
            _ => {}
        }
    }

    names
}

// ============================================================================
// Tests
// ============================================================================
