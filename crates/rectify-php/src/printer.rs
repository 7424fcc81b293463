//! PHP-style pretty printer.
//!
//! Output follows PSR-12 layout for the subset of constructs the AST covers:
//! braces of classes and methods on their own line, four-space indentation,
//! short array syntax.

use rectify_core::ast::{Node, NodeKind};
use rectify_core::collab::Printer;

use crate::builders::BRACED;

const INDENT: &str = "    ";

/// Prints trees back to PHP source text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhpPrinter;

impl Printer for PhpPrinter {
    fn print(&self, node: &Node) -> String {
        let mut out = String::new();
        match node.kind {
            NodeKind::File => print_file(&mut out, node),
            NodeKind::ClassDecl => print_class(&mut out, node),
            NodeKind::ClassMethod => print_method(&mut out, node, ""),
            NodeKind::Return | NodeKind::ExprStmt => print_statement(&mut out, node, ""),
            _ => {
                out.push_str(&expr(node));
                out.push('\n');
            }
        }
        out
    }
}

fn print_file(out: &mut String, file: &Node) {
    let mut previous: Option<NodeKind> = None;
    for stmt in file.children("stmts") {
        let separate = previous.is_some()
            && (stmt.kind == NodeKind::ClassDecl || previous == Some(NodeKind::ClassDecl));
        if separate {
            out.push('\n');
        }
        match stmt.kind {
            NodeKind::ClassDecl => print_class(out, stmt),
            _ => print_statement(out, stmt, ""),
        }
        previous = Some(stmt.kind);
    }
}

fn print_class(out: &mut String, class: &Node) {
    if class.attr_flag("final") {
        out.push_str("final ");
    }
    out.push_str("class ");
    out.push_str(class.value().unwrap_or_default());
    if let Some(parent) = class.child("extends") {
        out.push_str(" extends ");
        out.push_str(&expr(parent));
    }
    let interfaces: Vec<String> = class.children("implements").iter().map(expr).collect();
    if !interfaces.is_empty() {
        out.push_str(" implements ");
        out.push_str(&interfaces.join(", "));
    }
    out.push_str("\n{\n");
    for (index, method) in class.children("stmts").iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        print_method(out, method, INDENT);
    }
    out.push_str("}\n");
}

fn print_method(out: &mut String, method: &Node, indent: &str) {
    if let Some(doc) = method.child("doc") {
        for line in doc.value().unwrap_or_default().lines() {
            out.push_str(indent);
            out.push_str(line);
            out.push('\n');
        }
    }

    out.push_str(indent);
    out.push_str(method.attr_str("visibility").unwrap_or("public"));
    if method.attr_flag("static") {
        out.push_str(" static");
    }
    out.push_str(" function ");
    out.push_str(method.value().unwrap_or_default());
    let params: Vec<String> = method.children("params").iter().map(render_param).collect();
    out.push('(');
    out.push_str(&params.join(", "));
    out.push(')');
    if let Some(return_type) = method.child("return_type") {
        out.push_str(": ");
        out.push_str(&expr(return_type));
    }
    out.push('\n');
    out.push_str(indent);
    out.push_str("{\n");

    let body_indent = format!("{}{}", indent, INDENT);
    for stmt in method.children("stmts") {
        print_statement(out, stmt, &body_indent);
    }
    out.push_str(indent);
    out.push_str("}\n");
}

fn render_param(param: &Node) -> String {
    let name = format!("${}", param.value().unwrap_or_default());
    match param.child("type") {
        Some(type_name) => format!("{} {}", expr(type_name), name),
        None => name,
    }
}

fn print_statement(out: &mut String, stmt: &Node, indent: &str) {
    out.push_str(indent);
    match stmt.kind {
        NodeKind::Return => match stmt.child("expr") {
            Some(value) => {
                out.push_str("return ");
                out.push_str(&expr(value));
                out.push(';');
            }
            None => out.push_str("return;"),
        },
        _ => {
            if let Some(value) = stmt.child("expr") {
                out.push_str(&expr(value));
            }
            out.push(';');
        }
    }
    out.push('\n');
}

/// Render an expression node on one line.
fn expr(node: &Node) -> String {
    match node.kind {
        NodeKind::Assign => format!(
            "{} = {}",
            child_expr(node, "var"),
            child_expr(node, "expr")
        ),
        NodeKind::Variable => render_variable(node),
        NodeKind::ArrayDimFetch => format!(
            "{}[{}]",
            child_expr(node, "var"),
            child_expr(node, "dim")
        ),
        NodeKind::ArrayLiteral => {
            let items: Vec<String> = node.children("items").iter().map(expr).collect();
            format!("[{}]", items.join(", "))
        }
        NodeKind::ArrayItem => match node.child("key") {
            Some(key) => format!("{} => {}", expr(key), child_expr(node, "value")),
            None => child_expr(node, "value"),
        },
        NodeKind::StringLit => quote(node.value().unwrap_or_default()),
        NodeKind::IntLit | NodeKind::Name | NodeKind::DocComment => {
            node.value().unwrap_or_default().to_string()
        }
        NodeKind::Param => render_param(node),
        NodeKind::File
        | NodeKind::ClassDecl
        | NodeKind::ClassMethod
        | NodeKind::Return
        | NodeKind::ExprStmt => PhpPrinter.print(node).trim_end().to_string(),
    }
}

fn child_expr(node: &Node, slot: &str) -> String {
    node.child(slot).map(expr).unwrap_or_default()
}

fn render_variable(node: &Node) -> String {
    match node.child("name") {
        Some(name_expr) if node.attr_flag(BRACED) => format!("${{{}}}", expr(name_expr)),
        Some(name_expr) => format!("${}", expr(name_expr)),
        None => format!("${}", node.value().unwrap_or_default()),
    }
}

fn quote(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}

// ============================================================================
// Tests
// ============================================================================
