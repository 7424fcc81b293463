//! AST data model shared by parsers, rules and the traversal engine.
//!
//! Trees are produced by an external parser, rewritten by the engine and
//! handed to an external printer. The model is deliberately generic:
//!
//! - Every node has a stable [`NodeId`], a [`NodeKind`] tag, an optional
//!   scalar `value` (identifier or literal text), ordered child slots and an
//!   attribute bag for analysis metadata.
//! - The set of kinds is closed. Each kind declares a static slot schema
//!   ([`SlotSchema`]) that says which kinds a slot accepts and how many
//!   children it may hold. The schema is what the engine checks replacements
//!   against.
//!
//! # Identity
//!
//! `NodeId(0)` means "unassigned". Parsers number nodes in pre-order starting
//! at 1; the engine numbers freshly built replacement nodes from the largest
//! id in the tree upwards. Assigned ids are never changed.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque analysis metadata attached to a node (e.g. `scope`, `resolved_type`).
pub type Attributes = BTreeMap<String, serde_json::Value>;

// ============================================================================
// Node Identity
// ============================================================================

/// Stable identity of a node within one source unit.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Identity of a node that has not been numbered yet.
    pub const UNASSIGNED: NodeId = NodeId(0);

    /// Whether this id has been assigned by a parser or the engine.
    pub fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Node Kinds and Slot Schemas
// ============================================================================

/// Syntactic category of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Root of a source unit.
    File,
    /// `class Foo extends Bar implements Baz { ... }`
    ClassDecl,
    /// Method inside a class body.
    ClassMethod,
    /// Method parameter.
    Param,
    /// `return <expr>;`
    Return,
    /// Expression used as a statement.
    ExprStmt,
    /// `<var> = <expr>`
    Assign,
    /// `$name`, or a variable-variable `$$expr` / `${expr}`.
    Variable,
    /// `<var>[<dim>]`
    ArrayDimFetch,
    /// `[...]`
    ArrayLiteral,
    /// `key => value` or `value` inside an array literal.
    ArrayItem,
    /// String literal.
    StringLit,
    /// Integer literal.
    IntLit,
    /// Class, interface or type name.
    Name,
    /// `/** ... */` comment attached to a declaration.
    DocComment,
}

/// How many children a slot may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arity {
    /// Exactly one child.
    One,
    /// Zero or one child.
    Optional,
    /// Any number of children, in order.
    Many,
}

impl Arity {
    /// Whether a slot of this arity may hold `len` children.
    pub fn allows_len(self, len: usize) -> bool {
        match self {
            Arity::One => len == 1,
            Arity::Optional => len <= 1,
            Arity::Many => true,
        }
    }

    /// Whether a child may be deleted from a slot of this arity.
    pub fn allows_removal(self) -> bool {
        !matches!(self, Arity::One)
    }
}

/// Static description of one child slot of a [`NodeKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSchema {
    /// Slot name, unique within the kind.
    pub name: &'static str,
    /// Allowed number of children.
    pub arity: Arity,
    /// Kinds a child in this slot may have.
    pub accepts: &'static [NodeKind],
}

impl SlotSchema {
    /// Whether a node of `kind` may be placed in this slot.
    pub fn accepts(&self, kind: NodeKind) -> bool {
        self.accepts.contains(&kind)
    }
}

const EXPRESSIONS: &[NodeKind] = &[
    NodeKind::Assign,
    NodeKind::Variable,
    NodeKind::ArrayDimFetch,
    NodeKind::ArrayLiteral,
    NodeKind::StringLit,
    NodeKind::IntLit,
    NodeKind::Name,
];

const TOP_LEVEL_STATEMENTS: &[NodeKind] =
    &[NodeKind::ClassDecl, NodeKind::Return, NodeKind::ExprStmt];

const BODY_STATEMENTS: &[NodeKind] = &[NodeKind::Return, NodeKind::ExprStmt];

const ASSIGNABLE: &[NodeKind] = &[NodeKind::Variable, NodeKind::ArrayDimFetch];

const FILE_SLOTS: &[SlotSchema] = &[SlotSchema {
    name: "stmts",
    arity: Arity::Many,
    accepts: TOP_LEVEL_STATEMENTS,
}];

const CLASS_DECL_SLOTS: &[SlotSchema] = &[
    SlotSchema {
        name: "extends",
        arity: Arity::Optional,
        accepts: &[NodeKind::Name],
    },
    SlotSchema {
        name: "implements",
        arity: Arity::Many,
        accepts: &[NodeKind::Name],
    },
    SlotSchema {
        name: "stmts",
        arity: Arity::Many,
        accepts: &[NodeKind::ClassMethod],
    },
];

const CLASS_METHOD_SLOTS: &[SlotSchema] = &[
    SlotSchema {
        name: "doc",
        arity: Arity::Optional,
        accepts: &[NodeKind::DocComment],
    },
    SlotSchema {
        name: "params",
        arity: Arity::Many,
        accepts: &[NodeKind::Param],
    },
    SlotSchema {
        name: "return_type",
        arity: Arity::Optional,
        accepts: &[NodeKind::Name],
    },
    SlotSchema {
        name: "stmts",
        arity: Arity::Many,
        accepts: BODY_STATEMENTS,
    },
];

const PARAM_SLOTS: &[SlotSchema] = &[SlotSchema {
    name: "type",
    arity: Arity::Optional,
    accepts: &[NodeKind::Name],
}];

const RETURN_SLOTS: &[SlotSchema] = &[SlotSchema {
    name: "expr",
    arity: Arity::Optional,
    accepts: EXPRESSIONS,
}];

const EXPR_STMT_SLOTS: &[SlotSchema] = &[SlotSchema {
    name: "expr",
    arity: Arity::One,
    accepts: EXPRESSIONS,
}];

const ASSIGN_SLOTS: &[SlotSchema] = &[
    SlotSchema {
        name: "var",
        arity: Arity::One,
        accepts: ASSIGNABLE,
    },
    SlotSchema {
        name: "expr",
        arity: Arity::One,
        accepts: EXPRESSIONS,
    },
];

const VARIABLE_SLOTS: &[SlotSchema] = &[SlotSchema {
    name: "name",
    arity: Arity::Optional,
    accepts: EXPRESSIONS,
}];

const ARRAY_DIM_FETCH_SLOTS: &[SlotSchema] = &[
    SlotSchema {
        name: "var",
        arity: Arity::One,
        accepts: EXPRESSIONS,
    },
    SlotSchema {
        name: "dim",
        arity: Arity::Optional,
        accepts: EXPRESSIONS,
    },
];

const ARRAY_LITERAL_SLOTS: &[SlotSchema] = &[SlotSchema {
    name: "items",
    arity: Arity::Many,
    accepts: &[NodeKind::ArrayItem],
}];

const ARRAY_ITEM_SLOTS: &[SlotSchema] = &[
    SlotSchema {
        name: "key",
        arity: Arity::Optional,
        accepts: EXPRESSIONS,
    },
    SlotSchema {
        name: "value",
        arity: Arity::One,
        accepts: EXPRESSIONS,
    },
];

const LEAF_SLOTS: &[SlotSchema] = &[];

impl NodeKind {
    /// Every kind, in declaration order.
    pub const ALL: [NodeKind; 15] = [
        NodeKind::File,
        NodeKind::ClassDecl,
        NodeKind::ClassMethod,
        NodeKind::Param,
        NodeKind::Return,
        NodeKind::ExprStmt,
        NodeKind::Assign,
        NodeKind::Variable,
        NodeKind::ArrayDimFetch,
        NodeKind::ArrayLiteral,
        NodeKind::ArrayItem,
        NodeKind::StringLit,
        NodeKind::IntLit,
        NodeKind::Name,
        NodeKind::DocComment,
    ];

    /// Ordered slot schema of this kind.
    pub fn schema(self) -> &'static [SlotSchema] {
        match self {
            NodeKind::File => FILE_SLOTS,
            NodeKind::ClassDecl => CLASS_DECL_SLOTS,
            NodeKind::ClassMethod => CLASS_METHOD_SLOTS,
            NodeKind::Param => PARAM_SLOTS,
            NodeKind::Return => RETURN_SLOTS,
            NodeKind::ExprStmt => EXPR_STMT_SLOTS,
            NodeKind::Assign => ASSIGN_SLOTS,
            NodeKind::Variable => VARIABLE_SLOTS,
            NodeKind::ArrayDimFetch => ARRAY_DIM_FETCH_SLOTS,
            NodeKind::ArrayLiteral => ARRAY_LITERAL_SLOTS,
            NodeKind::ArrayItem => ARRAY_ITEM_SLOTS,
            NodeKind::StringLit | NodeKind::IntLit | NodeKind::Name | NodeKind::DocComment => {
                LEAF_SLOTS
            }
        }
    }

    /// Position of the named slot in this kind's schema.
    pub fn slot_index(self, name: &str) -> Option<usize> {
        self.schema().iter().position(|slot| slot.name == name)
    }

    /// Stable name used in output and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::File => "File",
            NodeKind::ClassDecl => "ClassDecl",
            NodeKind::ClassMethod => "ClassMethod",
            NodeKind::Param => "Param",
            NodeKind::Return => "Return",
            NodeKind::ExprStmt => "ExprStmt",
            NodeKind::Assign => "Assign",
            NodeKind::Variable => "Variable",
            NodeKind::ArrayDimFetch => "ArrayDimFetch",
            NodeKind::ArrayLiteral => "ArrayLiteral",
            NodeKind::ArrayItem => "ArrayItem",
            NodeKind::StringLit => "StringLit",
            NodeKind::IntLit => "IntLit",
            NodeKind::Name => "Name",
            NodeKind::DocComment => "DocComment",
        }
    }

    /// Look a kind up by its [`as_str`](Self::as_str) name.
    pub fn from_name(name: &str) -> Option<NodeKind> {
        NodeKind::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Schema Violations
// ============================================================================

/// A tree does not match the slot schema of one of its nodes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} {node}: slot '{slot}' {reason}")]
pub struct SchemaViolation {
    /// Node whose slot is malformed.
    pub node: NodeId,
    /// Kind of that node.
    pub kind: NodeKind,
    /// Offending slot (or `"*"` when the slot count itself is wrong).
    pub slot: String,
    /// What is wrong.
    pub reason: String,
}

// ============================================================================
// Nodes
// ============================================================================

/// Children held by one slot of a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub children: Vec<Node>,
}

/// A typed tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Stable identity (see module docs).
    pub id: NodeId,
    /// Syntactic category.
    pub kind: NodeKind,
    /// Identifier or literal text, if the kind carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Child slots, positionally matching `kind.schema()`.
    pub slots: Vec<Slot>,
    /// Analysis metadata attached by external resolvers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: Attributes,
    /// 1-indexed source line, when the parser knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl Node {
    /// Create an unassigned node of `kind` with empty slots.
    pub fn new(kind: NodeKind) -> Self {
        Node {
            id: NodeId::UNASSIGNED,
            kind,
            value: None,
            slots: vec![Slot::default(); kind.schema().len()],
            attrs: Attributes::new(),
            line: None,
        }
    }

    /// Set the scalar value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Attach an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attrs.insert(key.into(), value);
        self
    }

    /// Set the source line.
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Set the identity.
    pub fn with_id(mut self, id: NodeId) -> Self {
        self.id = id;
        self
    }

    /// Append a child to the named slot.
    ///
    /// # Panics
    ///
    /// Panics if this node's kind has no slot called `slot`.
    pub fn with_child(mut self, slot: &str, child: Node) -> Self {
        self.push_child(slot, child);
        self
    }

    /// Append a child to the named slot.
    ///
    /// # Panics
    ///
    /// Panics if this node's kind has no slot called `slot`.
    pub fn push_child(&mut self, slot: &str, child: Node) {
        let kind = self.kind;
        self.children_mut(slot)
            .unwrap_or_else(|| panic!("{} has no slot '{}'", kind, slot))
            .push(child);
    }

    /// The scalar value, if any.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Children of the named slot (empty if the slot does not exist).
    pub fn children(&self, slot: &str) -> &[Node] {
        self.kind
            .slot_index(slot)
            .and_then(|index| self.slots.get(index))
            .map(|slot| slot.children.as_slice())
            .unwrap_or(&[])
    }

    /// First child of the named slot.
    pub fn child(&self, slot: &str) -> Option<&Node> {
        self.children(slot).first()
    }

    /// Mutable children of the named slot.
    pub fn children_mut(&mut self, slot: &str) -> Option<&mut Vec<Node>> {
        let index = self.kind.slot_index(slot)?;
        if self.slots.len() < self.kind.schema().len() {
            self.slots
                .resize(self.kind.schema().len(), Slot::default());
        }
        self.slots.get_mut(index).map(|slot| &mut slot.children)
    }

    /// Attribute by key.
    pub fn attr(&self, key: &str) -> Option<&serde_json::Value> {
        self.attrs.get(key)
    }

    /// String attribute by key.
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attr(key).and_then(|value| value.as_str())
    }

    /// Boolean attribute by key (`false` when absent).
    pub fn attr_flag(&self, key: &str) -> bool {
        self.attr(key)
            .and_then(|value| value.as_bool())
            .unwrap_or(false)
    }

    /// Visit this node and all descendants in pre-order.
    pub fn for_each(&self, f: &mut impl FnMut(&Node)) {
        f(self);
        for slot in &self.slots {
            for child in &slot.children {
                child.for_each(f);
            }
        }
    }

    /// All nodes of `kind` in this subtree (including `self`), pre-order.
    pub fn find_all(&self, kind: NodeKind) -> Vec<&Node> {
        let mut found = Vec::new();
        self.collect_kind(kind, &mut found);
        found
    }

    fn collect_kind<'a>(&'a self, kind: NodeKind, found: &mut Vec<&'a Node>) {
        if self.kind == kind {
            found.push(self);
        }
        for slot in &self.slots {
            for child in &slot.children {
                child.collect_kind(kind, found);
            }
        }
    }

    /// Number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.for_each(&mut |_| count += 1);
        count
    }

    /// Largest assigned id in this subtree (0 if none).
    pub fn max_id(&self) -> u64 {
        let mut max = 0;
        self.for_each(&mut |node| max = max.max(node.id.0));
        max
    }

    /// Give every unassigned node in this subtree a fresh id, pre-order,
    /// drawing from `next` and advancing it.
    pub fn assign_ids(&mut self, next: &mut u64) {
        if !self.id.is_assigned() {
            self.id = NodeId(*next);
            *next += 1;
        }
        for slot in &mut self.slots {
            for child in &mut slot.children {
                child.assign_ids(next);
            }
        }
    }

    /// Structural equality ignoring ids and source lines.
    pub fn structurally_eq(&self, other: &Node) -> bool {
        self.kind == other.kind
            && self.value == other.value
            && self.attrs == other.attrs
            && self.slots.len() == other.slots.len()
            && self.slots.iter().zip(&other.slots).all(|(a, b)| {
                a.children.len() == b.children.len()
                    && a
                        .children
                        .iter()
                        .zip(&b.children)
                        .all(|(x, y)| x.structurally_eq(y))
            })
    }

    /// Check this subtree against the slot schemas.
    pub fn validate(&self) -> Result<(), SchemaViolation> {
        let schema = self.kind.schema();
        if self.slots.len() != schema.len() {
            return Err(SchemaViolation {
                node: self.id,
                kind: self.kind,
                slot: "*".to_string(),
                reason: format!(
                    "expected {} slots, found {}",
                    schema.len(),
                    self.slots.len()
                ),
            });
        }
        for (slot_schema, slot) in schema.iter().zip(&self.slots) {
            if !slot_schema.arity.allows_len(slot.children.len()) {
                return Err(SchemaViolation {
                    node: self.id,
                    kind: self.kind,
                    slot: slot_schema.name.to_string(),
                    reason: format!(
                        "cannot hold {} children ({:?})",
                        slot.children.len(),
                        slot_schema.arity
                    ),
                });
            }
            for child in &slot.children {
                if !slot_schema.accepts(child.kind) {
                    return Err(SchemaViolation {
                        node: self.id,
                        kind: self.kind,
                        slot: slot_schema.name.to_string(),
                        reason: format!("does not accept {}", child.kind),
                    });
                }
                child.validate()?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Paths
// ============================================================================

/// One step from a parent into a child: slot name and index within the slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathStep {
    pub slot: &'static str,
    pub index: usize,
}

/// Position of a node relative to the root, as a list of slot steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NodePath(pub Vec<PathStep>);

impl NodePath {
    /// The root path.
    pub fn root() -> Self {
        NodePath(Vec::new())
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Depth below the root.
    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for step in &self.0 {
            write!(f, "/{}[{}]", step.slot, step.index)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
