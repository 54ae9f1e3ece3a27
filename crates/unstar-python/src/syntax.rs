//! Syntax tree reader.
//!
//! Parses Python source with tree-sitter and lowers the concrete tree into a
//! small arena of tagged nodes. Each [`NodeKind`] variant carries only the
//! fields that node really has, so consumers match on variants instead of
//! probing for optional attributes.
//!
//! Nodes are stored in pre-order, which is also source order: iterating
//! [`SyntaxTree::walk`] visits every node, outer statements before the
//! statements nested inside them.
//!
//! # Usage
//!
//! ```
//! use unstar_python::syntax::{parse_source, NodeKind};
//!
//! let tree = parse_source("from os import *\nprint(sep)\n").unwrap();
//! let names: Vec<_> = tree
//!     .walk()
//!     .filter_map(|node| match &node.kind {
//!         NodeKind::Name { id } => Some(id.as_str()),
//!         _ => None,
//!     })
//!     .collect();
//! assert_eq!(names, vec!["print", "sep"]);
//! ```

use thiserror::Error;
use tree_sitter::Node as TsNode;

use crate::types::{LineSpan, ModuleRef};

/// Index of a node in its [`SyntaxTree`].
pub type NodeId = usize;

/// Error returned when source text is not valid Python.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid syntax at line {line}, column {column}: {message}")]
pub struct ParseError {
    /// 1-indexed line of the first error.
    pub line: u32,
    /// 1-indexed column of the first error.
    pub column: u32,
    pub message: String,
}

impl ParseError {
    fn at(node: TsNode<'_>, message: String) -> Self {
        let pos = node.start_position();
        ParseError {
            line: pos.row as u32 + 1,
            column: pos.column as u32 + 1,
            message,
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        ParseError {
            line: 0,
            column: 0,
            message: message.into(),
        }
    }
}

/// A name bound by an import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportAlias {
    /// The imported name; dotted for `import a.b`.
    pub name: String,
    /// The `as` alias, if any.
    pub asname: Option<String>,
}

impl ImportAlias {
    /// The name this alias binds in the importing namespace.
    ///
    /// `import a.b` binds `a`; `import a.b as c` and `from m import x as c`
    /// bind `c`.
    pub fn bound_name(&self) -> &str {
        match &self.asname {
            Some(alias) => alias,
            None => self.name.split('.').next().unwrap_or(&self.name),
        }
    }
}

/// The name list of a `from ... import ...` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportNames {
    /// `from m import *`
    Wildcard,
    /// `from m import a, b as c`
    Aliases(Vec<ImportAlias>),
}

/// Left-hand side of an assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A bare name.
    Name(String),
    /// Anything else: attributes, subscripts, unpacking patterns.
    Other,
}

/// Right-hand side of an assignment, as far as export lists care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A list or tuple literal made only of plain string constants.
    Strings(Vec<String>),
    /// Any other expression.
    Other,
    /// No value (`x: int`).
    Absent,
}

/// The variant of a syntax node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Module,
    /// An identifier in expression position, loaded or stored.
    Name { id: String },
    /// The member name of `obj.attr`.
    Attribute { attr: String },
    /// The keyword of `f(arg=...)`.
    Keyword { arg: String },
    /// A function or lambda parameter name.
    Param { name: String },
    FunctionDef { name: String },
    ClassDef { name: String },
    Assign {
        targets: Vec<Target>,
        value: Value,
        annotated: bool,
    },
    AugAssign {
        target: Target,
        op: String,
        value: Value,
    },
    Import { names: Vec<ImportAlias> },
    ImportFrom { module: ModuleRef, names: ImportNames },
    /// Any other construct, named by its grammar kind.
    Other { kind: &'static str },
}

/// A node in the arena.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub span: LineSpan,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// A parsed Python module.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
}

impl SyntaxTree {
    /// The `Module` node.
    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    /// Look up a node by id.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Every node, in pre-order.
    pub fn walk(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    /// Direct children of `node`, in source order.
    pub fn children<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Node> + 'a {
        node.children.iter().filter_map(move |&id| self.nodes.get(id))
    }

    /// Module-level statements.
    pub fn top_level(&self) -> impl Iterator<Item = &Node> + '_ {
        self.children(self.root())
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds only the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }
}

/// Parse Python source text into a [`SyntaxTree`].
pub fn parse_source(source: &str) -> Result<SyntaxTree, ParseError> {
    let mut parser = tree_sitter::Parser::new();
    let language: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
    parser
        .set_language(&language)
        .map_err(|e| ParseError::internal(e.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ParseError::internal("parser produced no tree"))?;
    let root = tree.root_node();

    if root.has_error() {
        return Err(first_error(root, source.as_bytes()));
    }

    let mut lowering = Lowering {
        source: source.as_bytes(),
        nodes: Vec::new(),
    };
    lowering.lower_module(root);
    Ok(SyntaxTree {
        nodes: lowering.nodes,
    })
}

/// Find the first ERROR or MISSING node, pruning clean subtrees.
fn first_error(root: TsNode<'_>, source: &[u8]) -> ParseError {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_missing() {
            return ParseError::at(node, format!("missing {}", node.kind()));
        }
        if node.is_error() {
            let text = node.utf8_text(source).unwrap_or("");
            let snippet: String = text.chars().take(20).collect();
            return ParseError::at(node, format!("unexpected `{}`", snippet.trim()));
        }
        // Push in reverse so the leftmost error is found first.
        let mut kids: Vec<_> = children_with_fields(node)
            .into_iter()
            .map(|(_, child)| child)
            .filter(|child| child.has_error())
            .collect();
        kids.reverse();
        stack.extend(kids);
    }
    ParseError::at(root, "invalid syntax".to_string())
}

fn children_with_fields<'t>(node: TsNode<'t>) -> Vec<(Option<&'static str>, TsNode<'t>)> {
    let mut cursor = node.walk();
    let mut out = Vec::new();
    if cursor.goto_first_child() {
        loop {
            out.push((cursor.field_name(), cursor.node()));
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }
    out
}

fn is_trivia(kind: &str) -> bool {
    matches!(kind, "comment" | "line_continuation")
}

fn span_of(node: TsNode<'_>) -> LineSpan {
    let start = node.start_position();
    let end = node.end_position();
    // A node ending at column 0 of a later line ends with the previous line's terminator.
    let (end_row, end_col) = if end.column == 0 && end.row > start.row {
        (end.row - 1, u32::MAX)
    } else {
        (end.row, end.column as u32)
    };
    LineSpan::new(
        start.row as u32 + 1,
        start.column as u32,
        end_row as u32 + 1,
        end_col,
    )
}

struct Lowering<'s> {
    source: &'s [u8],
    nodes: Vec<Node>,
}

impl<'s> Lowering<'s> {
    fn text(&self, node: TsNode<'_>) -> &'s str {
        node.utf8_text(self.source).unwrap_or("")
    }

    /// Dotted name text with any whitespace or line continuations removed.
    fn dotted(&self, node: TsNode<'_>) -> String {
        self.text(node)
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '\\')
            .collect()
    }

    fn push(&mut self, kind: NodeKind, span: LineSpan, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            id,
            kind,
            span,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent].children.push(id);
        }
        id
    }

    fn lower_module(&mut self, root: TsNode<'_>) {
        let id = self.push(NodeKind::Module, span_of(root), None);
        self.lower_children(root, id, false);
    }

    fn lower_children(&mut self, node: TsNode<'_>, id: NodeId, in_params: bool) {
        let node_kind = node.kind();
        let opens_params = matches!(node_kind, "parameters" | "lambda_parameters");
        for (field, child) in children_with_fields(node) {
            if !child.is_named() || is_trivia(child.kind()) {
                continue;
            }
            let child_in_params =
                opens_params || (in_params && !matches!(field, Some("type") | Some("value")));
            self.lower(child, id, field, node_kind, child_in_params);
        }
    }

    fn lower(
        &mut self,
        node: TsNode<'_>,
        parent: NodeId,
        field: Option<&str>,
        parent_kind: &str,
        in_params: bool,
    ) {
        let span = span_of(node);
        match node.kind() {
            "identifier" | "keyword_identifier" => {
                let text = self.text(node).to_string();
                let kind = match (parent_kind, field) {
                    ("attribute", Some("attribute")) => NodeKind::Attribute { attr: text },
                    ("keyword_argument", Some("name")) => NodeKind::Keyword { arg: text },
                    _ if in_params => NodeKind::Param { name: text },
                    _ => NodeKind::Name { id: text },
                };
                self.push(kind, span, Some(parent));
            }
            "function_definition" | "class_definition" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| self.text(n).to_string())
                    .unwrap_or_default();
                let kind = if node.kind() == "function_definition" {
                    NodeKind::FunctionDef { name }
                } else {
                    NodeKind::ClassDef { name }
                };
                let id = self.push(kind, span, Some(parent));
                for (field, child) in children_with_fields(node) {
                    if field == Some("name") || !child.is_named() || is_trivia(child.kind()) {
                        continue;
                    }
                    let child_in_params = child.kind() == "parameters";
                    if child_in_params {
                        let params = self.push(NodeKind::Other { kind: "parameters" }, span_of(child), Some(id));
                        self.lower_children(child, params, true);
                    } else {
                        self.lower(child, id, field, node.kind(), false);
                    }
                }
            }
            "import_statement" => {
                let names = self.aliases(node);
                self.push(NodeKind::Import { names }, span, Some(parent));
            }
            "import_from_statement" => {
                let module = node
                    .child_by_field_name("module_name")
                    .map(|m| self.module_ref(m))
                    .unwrap_or_else(|| ModuleRef::absolute(""));
                let wildcard = children_with_fields(node)
                    .iter()
                    .any(|(_, child)| child.kind() == "wildcard_import");
                let names = if wildcard {
                    ImportNames::Wildcard
                } else {
                    ImportNames::Aliases(self.aliases(node))
                };
                self.push(NodeKind::ImportFrom { module, names }, span, Some(parent));
            }
            "future_import_statement" => {
                let names = ImportNames::Aliases(self.aliases(node));
                let module = ModuleRef::absolute("__future__");
                self.push(NodeKind::ImportFrom { module, names }, span, Some(parent));
            }
            "expression_statement" => {
                let inner: Vec<_> = children_with_fields(node)
                    .into_iter()
                    .filter(|(_, c)| c.is_named() && !is_trivia(c.kind()))
                    .collect();
                match inner.as_slice() {
                    [(_, only)] if matches!(only.kind(), "assignment" | "augmented_assignment") => {
                        self.lower(*only, parent, None, parent_kind, false);
                    }
                    _ => {
                        let id = self.push(NodeKind::Other { kind: "expression_statement" }, span, Some(parent));
                        self.lower_children(node, id, false);
                    }
                }
            }
            "assignment" => {
                let target = self.target(node.child_by_field_name("left"));
                let value = match node.child_by_field_name("right") {
                    Some(right) => self.value(right),
                    None => Value::Absent,
                };
                let annotated = node.child_by_field_name("type").is_some();
                let kind = NodeKind::Assign {
                    targets: vec![target],
                    value,
                    annotated,
                };
                let id = self.push(kind, span, Some(parent));
                self.lower_children(node, id, false);
            }
            "augmented_assignment" => {
                let target = self.target(node.child_by_field_name("left"));
                let op = node
                    .child_by_field_name("operator")
                    .map(|o| self.text(o).to_string())
                    .unwrap_or_default();
                let value = node
                    .child_by_field_name("right")
                    .map(|r| self.value(r))
                    .unwrap_or(Value::Absent);
                let id = self.push(NodeKind::AugAssign { target, op, value }, span, Some(parent));
                self.lower_children(node, id, false);
            }
            "string" => {
                // Only interpolations can hold names.
                let id = self.push(NodeKind::Other { kind: "string" }, span, Some(parent));
                for (field, child) in children_with_fields(node) {
                    if child.kind() == "interpolation" {
                        self.lower(child, id, field, "string", false);
                    }
                }
            }
            kind => {
                let id = self.push(NodeKind::Other { kind }, span, Some(parent));
                self.lower_children(node, id, in_params);
            }
        }
    }

    fn module_ref(&self, node: TsNode<'_>) -> ModuleRef {
        if node.kind() != "relative_import" {
            return ModuleRef::absolute(self.dotted(node));
        }
        let mut level = 0;
        let mut name = String::new();
        for (_, child) in children_with_fields(node) {
            match child.kind() {
                "import_prefix" => level = self.text(child).matches('.').count(),
                "dotted_name" => name = self.dotted(child),
                _ => {}
            }
        }
        ModuleRef::relative(level, name)
    }

    /// Names listed under the `name` field of an import statement.
    fn aliases(&self, node: TsNode<'_>) -> Vec<ImportAlias> {
        children_with_fields(node)
            .into_iter()
            .filter(|(field, _)| *field == Some("name"))
            .map(|(_, child)| match child.kind() {
                "aliased_import" => ImportAlias {
                    name: child
                        .child_by_field_name("name")
                        .map(|n| self.dotted(n))
                        .unwrap_or_default(),
                    asname: child
                        .child_by_field_name("alias")
                        .map(|a| self.text(a).to_string()),
                },
                _ => ImportAlias {
                    name: self.dotted(child),
                    asname: None,
                },
            })
            .collect()
    }

    fn target(&self, node: Option<TsNode<'_>>) -> Target {
        match node {
            Some(n) if n.kind() == "identifier" => Target::Name(self.text(n).to_string()),
            _ => Target::Other,
        }
    }

    fn value(&self, node: TsNode<'_>) -> Value {
        if !matches!(node.kind(), "list" | "tuple" | "expression_list") {
            return Value::Other;
        }
        let mut strings = Vec::new();
        for (_, child) in children_with_fields(node) {
            if !child.is_named() || is_trivia(child.kind()) {
                continue;
            }
            match self.string_constant(child) {
                Some(s) => strings.push(s),
                None => return Value::Other,
            }
        }
        Value::Strings(strings)
    }

    /// Content of a plain (non-bytes, non-interpolated) string literal.
    fn string_constant(&self, node: TsNode<'_>) -> Option<String> {
        if node.kind() != "string" {
            return None;
        }
        let mut content = String::new();
        for (_, child) in children_with_fields(node) {
            match child.kind() {
                "string_start" => {
                    let prefix = self.text(child).trim_end_matches(['"', '\'']);
                    if prefix.contains(['b', 'B']) {
                        return None;
                    }
                }
                "string_content" => content.push_str(self.text(child)),
                "interpolation" => return None,
                _ => {}
            }
        }
        Some(content)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds<F, T>(tree: &SyntaxTree, f: F) -> Vec<T>
    where
        F: Fn(&NodeKind) -> Option<T>,
    {
        tree.walk().filter_map(|n| f(&n.kind)).collect()
    }

    fn names(tree: &SyntaxTree) -> Vec<String> {
        kinds(tree, |k| match k {
            NodeKind::Name { id } => Some(id.clone()),
            _ => None,
        })
    }

    mod parsing {
        use super::*;

        #[test]
        fn empty_source() {
            let tree = parse_source("").unwrap();
            assert_eq!(tree.root().kind, NodeKind::Module);
            assert!(tree.is_empty());
        }

        #[test]
        fn invalid_syntax_is_parse_error() {
            let err = parse_source("def broken(:\n    pass\n").unwrap_err();
            assert_eq!(err.line, 1);
            assert!(err.to_string().starts_with("invalid syntax at line 1"));
        }

        #[test]
        fn error_on_later_line_reports_that_line() {
            let err = parse_source("x = 1\ny = (\n").unwrap_err();
            assert!(err.line >= 2, "got line {}", err.line);
        }

        #[test]
        fn nodes_are_in_source_order() {
            let tree = parse_source("a = 1\nif a:\n    b = 2\nc = 3\n").unwrap();
            assert_eq!(names(&tree), vec!["a", "a", "b", "c"]);
        }
    }

    mod names {
        use super::*;

        #[test]
        fn attribute_member_is_not_a_name() {
            let tree = parse_source("os.path.join(x)\n").unwrap();
            assert_eq!(names(&tree), vec!["os", "x"]);
            let attrs = kinds(&tree, |k| match k {
                NodeKind::Attribute { attr } => Some(attr.clone()),
                _ => None,
            });
            assert_eq!(attrs, vec!["path", "join"]);
        }

        #[test]
        fn keyword_argument_is_not_a_name() {
            let tree = parse_source("f(sep=value)\n").unwrap();
            assert_eq!(names(&tree), vec!["f", "value"]);
        }

        #[test]
        fn parameters_are_params() {
            let tree = parse_source("def f(a, b: Tp = dflt, *args, **kw):\n    return a\n").unwrap();
            let params = kinds(&tree, |k| match k {
                NodeKind::Param { name } => Some(name.clone()),
                _ => None,
            });
            assert_eq!(params, vec!["a", "b", "args", "kw"]);
            assert_eq!(names(&tree), vec!["Tp", "dflt", "a"]);
        }

        #[test]
        fn lambda_parameters_are_params() {
            let tree = parse_source("g = lambda x, y=z: x + y\n").unwrap();
            assert_eq!(names(&tree), vec!["g", "z", "x", "y"]);
        }

        #[test]
        fn definitions_carry_their_names() {
            let tree = parse_source("class Widget(Base):\n    def render(self):\n        pass\n").unwrap();
            let defs = kinds(&tree, |k| match k {
                NodeKind::ClassDef { name } | NodeKind::FunctionDef { name } => Some(name.clone()),
                _ => None,
            });
            assert_eq!(defs, vec!["Widget", "render"]);
            assert_eq!(names(&tree), vec!["Base"]);
        }

        #[test]
        fn fstring_interpolations_are_names() {
            let tree = parse_source("msg = f\"{greeting}, {who!r}\"\n").unwrap();
            assert_eq!(names(&tree), vec!["msg", "greeting", "who"]);
        }
    }

    mod imports {
        use super::*;

        fn import_froms(tree: &SyntaxTree) -> Vec<(ModuleRef, ImportNames, LineSpan)> {
            tree.walk()
                .filter_map(|n| match &n.kind {
                    NodeKind::ImportFrom { module, names } => {
                        Some((module.clone(), names.clone(), n.span))
                    }
                    _ => None,
                })
                .collect()
        }

        #[test]
        fn plain_import_aliases() {
            let tree = parse_source("import os.path, numpy as np\n").unwrap();
            let NodeKind::Import { names } = &tree.top_level().next().unwrap().kind else {
                panic!("expected Import");
            };
            assert_eq!(names.len(), 2);
            assert_eq!(names[0].name, "os.path");
            assert_eq!(names[0].bound_name(), "os");
            assert_eq!(names[1].bound_name(), "np");
        }

        #[test]
        fn wildcard_from_import() {
            let tree = parse_source("from pkg.b import *\n").unwrap();
            let froms = import_froms(&tree);
            assert_eq!(froms.len(), 1);
            assert_eq!(froms[0].0, ModuleRef::absolute("pkg.b"));
            assert_eq!(froms[0].1, ImportNames::Wildcard);
            assert_eq!(froms[0].2.start_line, 1);
            assert_eq!(froms[0].2.end_line, 1);
            assert_eq!(froms[0].2.start_col, 0);
            assert_eq!(froms[0].2.end_col, 19);
        }

        #[test]
        fn relative_imports() {
            let tree = parse_source("from .sub import *\nfrom .. import x as y\n").unwrap();
            let froms = import_froms(&tree);
            assert_eq!(froms[0].0, ModuleRef::relative(1, "sub"));
            assert_eq!(froms[1].0, ModuleRef::relative(2, ""));
            assert_eq!(
                froms[1].1,
                ImportNames::Aliases(vec![ImportAlias {
                    name: "x".to_string(),
                    asname: Some("y".to_string()),
                }])
            );
        }

        #[test]
        fn parenthesized_import_spans_lines() {
            let source = "from m import (\n    a,\n    b,\n)\n";
            let tree = parse_source(source).unwrap();
            let froms = import_froms(&tree);
            let ImportNames::Aliases(aliases) = &froms[0].1 else {
                panic!("expected aliases");
            };
            assert_eq!(aliases.len(), 2);
            assert_eq!(froms[0].2.start_line, 1);
            assert_eq!(froms[0].2.end_line, 4);
        }

        #[test]
        fn nested_import_keeps_indentation_column() {
            let tree = parse_source("def f():\n    from m import *\n").unwrap();
            let froms = import_froms(&tree);
            assert_eq!(froms[0].2.start_line, 2);
            assert_eq!(froms[0].2.start_col, 4);
        }

        #[test]
        fn future_import_is_from_future() {
            let tree = parse_source("from __future__ import annotations\n").unwrap();
            let froms = import_froms(&tree);
            assert_eq!(froms[0].0, ModuleRef::absolute("__future__"));
        }
    }

    mod assignments {
        use super::*;

        fn first_assign(source: &str) -> NodeKind {
            let tree = parse_source(source).unwrap();
            let first = tree.top_level().next().unwrap();
            first.kind.clone()
        }

        #[test]
        fn list_of_strings() {
            let kind = first_assign("__all__ = [\"Widget\", 'Gadget']\n");
            assert_eq!(
                kind,
                NodeKind::Assign {
                    targets: vec![Target::Name("__all__".to_string())],
                    value: Value::Strings(vec!["Widget".to_string(), "Gadget".to_string()]),
                    annotated: false,
                }
            );
        }

        #[test]
        fn tuple_and_bare_tuple() {
            let NodeKind::Assign { value, .. } = first_assign("__all__ = (\"a\", \"b\",)\n") else {
                panic!("expected Assign");
            };
            assert_eq!(value, Value::Strings(vec!["a".into(), "b".into()]));

            let NodeKind::Assign { value, .. } = first_assign("__all__ = \"a\", \"b\"\n") else {
                panic!("expected Assign");
            };
            assert_eq!(value, Value::Strings(vec!["a".into(), "b".into()]));
        }

        #[test]
        fn non_literal_elements_make_other() {
            let NodeKind::Assign { value, .. } = first_assign("__all__ = [\"a\", name]\n") else {
                panic!("expected Assign");
            };
            assert_eq!(value, Value::Other);

            let NodeKind::Assign { value, .. } = first_assign("__all__ = [f\"{x}\"]\n") else {
                panic!("expected Assign");
            };
            assert_eq!(value, Value::Other);
        }

        #[test]
        fn annotated_assignment() {
            let NodeKind::Assign {
                value, annotated, ..
            } = first_assign("__all__: list[str] = [\"a\"]\n")
            else {
                panic!("expected Assign");
            };
            assert!(annotated);
            assert_eq!(value, Value::Strings(vec!["a".into()]));
        }

        #[test]
        fn augmented_assignment() {
            let kind = first_assign("__all__ += [\"extra\"]\n");
            assert_eq!(
                kind,
                NodeKind::AugAssign {
                    target: Target::Name("__all__".to_string()),
                    op: "+=".to_string(),
                    value: Value::Strings(vec!["extra".to_string()]),
                }
            );
        }

        #[test]
        fn attribute_target_is_other() {
            let NodeKind::Assign { targets, .. } = first_assign("mod.__all__ = [\"a\"]\n") else {
                panic!("expected Assign");
            };
            assert_eq!(targets, vec![Target::Other]);
        }
    }
}
