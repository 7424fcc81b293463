//! Reader for the JSON AST dump of the external PHP parser.
//!
//! ## Wire Format
//!
//! Each node is an object with a `kind` and, optionally, `value`, `line`
//! and `attrs`. Every other key names a slot of the kind and holds either a
//! single node, an array of nodes or `null`:
//!
//! ```json
//! {
//!   "kind": "File",
//!   "stmts": [
//!     {
//!       "kind": "ClassDecl",
//!       "value": "SomeClass",
//!       "line": 1,
//!       "extends": { "kind": "Name", "value": "SomeParent" },
//!       "implements": []
//!     }
//!   ]
//! }
//! ```
//!
//! Ids are not part of the wire format: nodes are numbered pre-order from 1.
//! Malformed JSON fails with the position reported by `serde_json`; a
//! well-formed document with an unknown kind or slot fails at the line of the
//! offending node (when the dump carries one).

use serde_json::{Map, Value};

use rectify_core::ast::{Arity, Attributes, Node, NodeKind};
use rectify_core::collab::Parser;
use rectify_core::error::SyntaxError;

const RESERVED_KEYS: &[&str] = &["kind", "value", "line", "attrs"];

/// Parses the JSON AST dump format.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonAstParser;

impl Parser for JsonAstParser {
    fn parse(&self, source: &str) -> Result<Node, SyntaxError> {
        let document: Value = serde_json::from_str(source)
            .map_err(|e| SyntaxError::new(e.to_string(), e.line().max(1), e.column().max(1)))?;
        let mut root = node_from_value(&document, 1)?;
        let mut next_id = 1;
        root.assign_ids(&mut next_id);
        Ok(root)
    }
}

/// Serialize a tree back into the wire format (ids are dropped).
pub fn to_wire(node: &Node) -> Value {
    let mut object = Map::new();
    object.insert("kind".to_string(), Value::String(node.kind.as_str().to_string()));
    if let Some(value) = node.value() {
        object.insert("value".to_string(), Value::String(value.to_string()));
    }
    if let Some(line) = node.line {
        object.insert("line".to_string(), Value::from(line));
    }
    if !node.attrs.is_empty() {
        let attrs: Map<String, Value> = node.attrs.clone().into_iter().collect();
        object.insert("attrs".to_string(), Value::Object(attrs));
    }
    for schema in node.kind.schema() {
        let children = node.children(schema.name);
        let value = match schema.arity {
            Arity::Many => {
                Value::Array(children.iter().map(to_wire).collect())
            }
            _ => children.first().map(to_wire).unwrap_or(Value::Null),
        };
        object.insert(schema.name.to_string(), value);
    }
    Value::Object(object)
}

fn node_from_value(value: &Value, parent_line: usize) -> Result<Node, SyntaxError> {
    let object = value
        .as_object()
        .ok_or_else(|| SyntaxError::new("expected a node object", parent_line, 1))?;

    let line = match object.get("line") {
        None | Some(Value::Null) => None,
        Some(line) => Some(
            line.as_u64()
                .and_then(|line| u32::try_from(line).ok())
                .ok_or_else(|| SyntaxError::new("'line' must be a positive integer", parent_line, 1))?,
        ),
    };
    let here = line.map_or(parent_line, |line| line as usize);
    let error = |message: String| SyntaxError::new(message, here, 1);

    let kind_name = object
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| error("node without a 'kind'".to_string()))?;
    let kind = NodeKind::from_name(kind_name)
        .ok_or_else(|| error(format!("unknown node kind '{}'", kind_name)))?;

    let mut node = Node::new(kind);
    node.line = line;
    match object.get("value") {
        None | Some(Value::Null) => {}
        Some(Value::String(text)) => node.value = Some(text.clone()),
        Some(Value::Number(number)) => node.value = Some(number.to_string()),
        Some(_) => return Err(error(format!("{} 'value' must be a string", kind))),
    }
    match object.get("attrs") {
        None | Some(Value::Null) => {}
        Some(Value::Object(attrs)) => {
            node.attrs = attrs.clone().into_iter().collect::<Attributes>();
        }
        Some(_) => return Err(error(format!("{} 'attrs' must be an object", kind))),
    }

    for (key, slot_value) in object {
        if RESERVED_KEYS.contains(&key.as_str()) {
            continue;
        }
        let Some(children) = node.children_mut(key) else {
            return Err(error(format!("{} has no slot '{}'", kind, key)));
        };
        match slot_value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    children.push(node_from_value(item, here)?);
                }
            }
            single => children.push(node_from_value(single, here)?),
        }
    }
    Ok(node)
}

// ============================================================================
// Tests
// ============================================================================
