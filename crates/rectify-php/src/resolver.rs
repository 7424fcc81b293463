//! Declaration-level scope and type resolution.
//!
//! A deliberately small resolver: it only knows what the file itself
//! declares.
//!
//! - Every `ClassDecl` and `ClassMethod` gets a `scope` attribute:
//!   `{"class": ..., "parent_class": ...}` (plus `"method"` for methods).
//! - Inside a method, variables naming a typed parameter and scalar literals
//!   get a `resolved_type` attribute.
//!
//! Attributes already present (e.g. supplied by the external parser) are
//! left untouched. [`strip_derived`] removes them again before a tree is
//! written back as a source unit.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use rectify_core::ast::{Node, NodeKind};
use rectify_core::collab::ScopeResolver;

use crate::builders::{RESOLVED_TYPE, SCOPE};

/// Resolves class scopes and parameter types from declarations in the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclarationScopeResolver;

impl ScopeResolver for DeclarationScopeResolver {
    fn resolve(&self, root: &mut Node) {
        resolve_node(root);
    }
}

fn resolve_node(node: &mut Node) {
    if node.kind == NodeKind::ClassDecl {
        resolve_class(node);
        return;
    }
    for slot in &mut node.slots {
        for child in &mut slot.children {
            resolve_node(child);
        }
    }
}

fn resolve_class(class: &mut Node) {
    let class_name = class.value().unwrap_or_default().to_string();
    let parent = class
        .child("extends")
        .and_then(Node::value)
        .map(|name| name.trim_start_matches('\\').to_string());

    let scope = json!({ "class": class_name, "parent_class": parent });
    set_missing(class, SCOPE, scope.clone());

    let Some(methods) = class.children_mut("stmts") else {
        return;
    };
    for method in methods {
        let mut method_scope = scope.clone();
        method_scope["method"] = json!(method.value().unwrap_or_default());
        set_missing(method, SCOPE, method_scope);

        let params: BTreeMap<String, String> = method
            .children("params")
            .iter()
            .filter_map(|param| {
                let name = param.value()?;
                let type_name = param.child("type")?.value()?;
                Some((name.to_string(), type_name.to_string()))
            })
            .collect();
        if let Some(body) = method.children_mut("stmts") {
            for stmt in body {
                resolve_types(stmt, &params);
            }
        }
    }
}

fn resolve_types(node: &mut Node, params: &BTreeMap<String, String>) {
    let resolved = match node.kind {
        NodeKind::Variable if node.child("name").is_none() => node
            .value()
            .and_then(|name| params.get(name))
            .cloned(),
        NodeKind::StringLit => Some("string".to_string()),
        NodeKind::IntLit => Some("int".to_string()),
        NodeKind::ArrayLiteral => Some("array".to_string()),
        _ => None,
    };
    if let Some(type_name) = resolved {
        set_missing(node, RESOLVED_TYPE, Value::String(type_name));
    }
    for slot in &mut node.slots {
        for child in &mut slot.children {
            resolve_types(child, params);
        }
    }
}

fn set_missing(node: &mut Node, key: &str, value: Value) {
    node.attrs.entry(key.to_string()).or_insert(value);
}

/// Remove the `scope` and `resolved_type` attributes from the whole tree.
pub fn strip_derived(node: &mut Node) {
    node.attrs.remove(SCOPE);
    node.attrs.remove(RESOLVED_TYPE);
    for slot in &mut node.slots {
        for child in &mut slot.children {
            strip_derived(child);
        }
    }
}
