//! Shorthand constructors for PHP-style nodes.
//!
//! Rules use these to build replacement subtrees; tests use them to build
//! input trees. Every node comes back unassigned ([`NodeId::UNASSIGNED`]).
//!
//! [`NodeId::UNASSIGNED`]: rectify_core::ast::NodeId::UNASSIGNED

use rectify_core::ast::{Node, NodeKind};

/// Attribute marking a variable-variable as written `${...}`.
pub const BRACED: &str = "braced";

/// Attribute holding the static type of an expression.
pub const RESOLVED_TYPE: &str = "resolved_type";

/// Attribute holding scope information attached by the resolver.
pub const SCOPE: &str = "scope";

pub fn file(stmts: impl IntoIterator<Item = Node>) -> Node {
    with_children(Node::new(NodeKind::File), "stmts", stmts)
}

/// `class <name> [extends <parent>]`
pub fn class(name: &str, parent: Option<&str>) -> Node {
    let node = Node::new(NodeKind::ClassDecl).with_value(name);
    match parent {
        Some(parent) => node.with_child("extends", self::name(parent)),
        None => node,
    }
}

/// Public method without parameters or body.
pub fn method(name: &str) -> Node {
    Node::new(NodeKind::ClassMethod).with_value(name)
}

/// `<type> $<name>`
pub fn param(type_name: Option<&str>, name: &str) -> Node {
    let node = Node::new(NodeKind::Param).with_value(name);
    match type_name {
        Some(type_name) => node.with_child("type", self::name(type_name)),
        None => node,
    }
}

pub fn ret(expr: Option<Node>) -> Node {
    let node = Node::new(NodeKind::Return);
    match expr {
        Some(expr) => node.with_child("expr", expr),
        None => node,
    }
}

pub fn expr_stmt(expr: Node) -> Node {
    Node::new(NodeKind::ExprStmt).with_child("expr", expr)
}

pub fn assign(var: Node, expr: Node) -> Node {
    Node::new(NodeKind::Assign)
        .with_child("var", var)
        .with_child("expr", expr)
}

/// `$<name>`
pub fn variable(name: &str) -> Node {
    Node::new(NodeKind::Variable).with_value(name)
}

/// `$<expr>`, a variable whose name is computed.
pub fn variable_variable(name_expr: Node) -> Node {
    Node::new(NodeKind::Variable).with_child("name", name_expr)
}

/// `<var>[<dim>]`
pub fn dim_fetch(var: Node, dim: Option<Node>) -> Node {
    let node = Node::new(NodeKind::ArrayDimFetch).with_child("var", var);
    match dim {
        Some(dim) => node.with_child("dim", dim),
        None => node,
    }
}

pub fn array(items: impl IntoIterator<Item = Node>) -> Node {
    with_children(Node::new(NodeKind::ArrayLiteral), "items", items)
}

/// `<key> => <value>`, or just `<value>`.
pub fn item(key: Option<Node>, value: Node) -> Node {
    let node = Node::new(NodeKind::ArrayItem);
    let node = match key {
        Some(key) => node.with_child("key", key),
        None => node,
    };
    node.with_child("value", value)
}

pub fn string(value: &str) -> Node {
    Node::new(NodeKind::StringLit).with_value(value)
}

pub fn int(value: i64) -> Node {
    Node::new(NodeKind::IntLit).with_value(value.to_string())
}

pub fn name(value: &str) -> Node {
    Node::new(NodeKind::Name).with_value(value)
}

/// A doc comment from its full text, `/**` to `*/`.
pub fn doc(text: &str) -> Node {
    Node::new(NodeKind::DocComment).with_value(text)
}

/// A doc comment holding one tag per line.
pub fn doc_with_tags<'a>(tags: impl IntoIterator<Item = &'a str>) -> Node {
    let mut text = String::from("/**\n");
    for tag in tags {
        text.push_str(" * ");
        text.push_str(tag);
        text.push('\n');
    }
    text.push_str(" */");
    doc(&text)
}

fn with_children(mut node: Node, slot: &str, children: impl IntoIterator<Item = Node>) -> Node {
    for child in children {
        node.push_child(slot, child);
    }
    node
}
