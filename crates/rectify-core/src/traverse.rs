//! Traversal engine: one pre-order pass of all applicable rules over a tree.
//!
//! # Pass Semantics
//!
//! At each node the engine offers the node to every rule interested in its
//! kind, in registration order. Each rule sees the *current* value of the
//! node, so a rule registered later observes the rewrite of an earlier rule
//! within the same pass. If a replacement changes the node's kind, remaining
//! rules are only offered the new node when they are interested in the new
//! kind.
//!
//! After the rules ran, the walk descends into the (possibly replaced)
//! node's children, slot by slot, in source order. A removed node is not
//! descended into. Every reachable node is visited exactly once per pass.
//!
//! # Structural Checks
//!
//! - A replacement must be of a kind the surrounding slot accepts and must
//!   itself match the slot schemas ([`EngineError::SlotViolation`]).
//! - Removal from a slot that requires exactly one child is a slot violation.
//! - Removing the root, a node whose id equals one of its ancestors', or a
//!   walk deeper than `max_depth` fails with
//!   [`EngineError::StructuralIntegrity`].

use tracing::{debug, trace};

use crate::ast::{Node, NodeId, NodeKind, NodePath, PathStep, SlotSchema};
use crate::changelog::{ChangeLocation, ChangeRecord};
use crate::config::EngineOptions;
use crate::error::EngineError;
use crate::registry::RuleRegistry;
use crate::rule::{Rewrite, Rule};

/// Result of one traversal pass.
#[derive(Debug, Clone)]
pub struct PassOutcome {
    /// The tree after the pass (possibly a new root).
    pub root: Node,
    /// Whether any rule changed anything.
    pub changed: bool,
    /// Accepted rewrites, in the order they happened.
    pub changes: Vec<ChangeRecord>,
}

/// Run a single pass over `root`.
///
/// Unassigned node ids in the input are numbered before the walk starts.
pub fn run_one_pass(
    root: Node,
    registry: &RuleRegistry,
    options: &EngineOptions,
) -> Result<PassOutcome, EngineError> {
    run_pass(root, registry, options, 1)
}

pub(crate) fn run_pass(
    mut root: Node,
    registry: &RuleRegistry,
    options: &EngineOptions,
    pass: usize,
) -> Result<PassOutcome, EngineError> {
    let mut next_id = root.max_id() + 1;
    root.assign_ids(&mut next_id);

    let root_kind = root.kind;
    let root_id = root.id;
    let mut walker = Walker {
        registry,
        pass,
        max_depth: options.max_depth,
        next_id,
        ancestors: Vec::new(),
        path: Vec::new(),
        changes: Vec::new(),
    };

    let root = walker
        .visit(root, SlotContext::Root(root_kind))?
        .ok_or_else(|| EngineError::StructuralIntegrity {
            node: root_id,
            reason: "root node was removed".to_string(),
        })?;

    let changes = walker.changes;
    debug!(pass, changes = changes.len(), "pass finished");
    Ok(PassOutcome {
        root,
        changed: !changes.is_empty(),
        changes,
    })
}

// ============================================================================
// Slot Context
// ============================================================================

/// The slot a visited node sits in.
#[derive(Debug, Clone, Copy)]
enum SlotContext {
    /// The root position; only the original root kind is accepted.
    Root(NodeKind),
    Child {
        parent: NodeKind,
        schema: &'static SlotSchema,
    },
}

impl SlotContext {
    fn accepts(&self, kind: NodeKind) -> bool {
        match self {
            SlotContext::Root(root_kind) => *root_kind == kind,
            SlotContext::Child { schema, .. } => schema.accepts(kind),
        }
    }

    /// Removing the root is reported by the pass itself.
    fn allows_removal(&self) -> bool {
        match self {
            SlotContext::Root(_) => true,
            SlotContext::Child { schema, .. } => schema.arity.allows_removal(),
        }
    }

    fn violation(&self, rule: &str, found: &str) -> EngineError {
        match self {
            SlotContext::Root(kind) => EngineError::slot_violation(rule, "<root>", kind.as_str(), found),
            SlotContext::Child { parent, schema } => {
                EngineError::slot_violation(rule, parent.as_str(), schema.name, found)
            }
        }
    }
}

// ============================================================================
// Walker
// ============================================================================

struct Walker<'r> {
    registry: &'r RuleRegistry,
    pass: usize,
    max_depth: usize,
    next_id: u64,
    ancestors: Vec<NodeId>,
    path: Vec<PathStep>,
    changes: Vec<ChangeRecord>,
}

impl Walker<'_> {
    fn visit(&mut self, node: Node, slot: SlotContext) -> Result<Option<Node>, EngineError> {
        if self.ancestors.len() >= self.max_depth {
            return Err(EngineError::StructuralIntegrity {
                node: node.id,
                reason: format!(
                    "tree deeper than {} levels at {}",
                    self.max_depth,
                    self.current_path()
                ),
            });
        }

        let Some(mut current) = self.apply_rules(node, slot)? else {
            return Ok(None);
        };

        if self.ancestors.contains(&current.id) {
            return Err(EngineError::StructuralIntegrity {
                node: current.id,
                reason: format!("node reappears as its own ancestor at {}", self.current_path()),
            });
        }

        self.ancestors.push(current.id);
        let kind = current.kind;
        for (slot_index, schema) in kind.schema().iter().enumerate() {
            let Some(slot) = current.slots.get_mut(slot_index) else {
                break;
            };
            let children = std::mem::take(&mut slot.children);
            let mut kept = Vec::with_capacity(children.len());
            for (index, child) in children.into_iter().enumerate() {
                self.path.push(PathStep {
                    slot: schema.name,
                    index,
                });
                let visited = self.visit(child, SlotContext::Child { parent: kind, schema });
                self.path.pop();
                if let Some(child) = visited? {
                    kept.push(child);
                }
            }
            current.slots[slot_index].children = kept;
        }
        self.ancestors.pop();

        Ok(Some(current))
    }

    /// Offer `node` to every interested rule. `None` means it was removed.
    fn apply_rules(
        &mut self,
        node: Node,
        slot: SlotContext,
    ) -> Result<Option<Node>, EngineError> {
        let registry = self.registry;
        let offered_kind = node.kind;
        let mut current = node;

        for rule in registry.rules_for(offered_kind) {
            if current.kind != offered_kind && !rule.node_kinds().contains(&current.kind) {
                continue;
            }
            trace!(rule = rule.name(), node = %current.id, "offering node");

            match rule.try_rewrite(&current) {
                Rewrite::Unchanged => {}
                Rewrite::Replace(mut replacement) => {
                    if !slot.accepts(replacement.kind) {
                        return Err(slot.violation(rule.name(), replacement.kind.as_str()));
                    }
                    replacement
                        .validate()
                        .map_err(|violation| EngineError::from_schema(rule.name(), violation))?;
                    if replacement.structurally_eq(&current) {
                        continue;
                    }
                    replacement.assign_ids(&mut self.next_id);
                    self.record(rule, &current, Some(&replacement));
                    current = replacement;
                }
                Rewrite::Remove => {
                    if !slot.allows_removal() {
                        return Err(slot.violation(rule.name(), "a removal"));
                    }
                    self.record(rule, &current, None);
                    return Ok(None);
                }
            }
        }

        Ok(Some(current))
    }

    fn record(&mut self, rule: &dyn Rule, before: &Node, after: Option<&Node>) {
        debug!(
            rule = rule.name(),
            node = %before.id,
            kind = %before.kind,
            pass = self.pass,
            removed = after.is_none(),
            "rewrite accepted"
        );
        self.changes.push(ChangeRecord {
            rule: rule.name().to_string(),
            pass: self.pass,
            before: before.clone(),
            after: after.cloned(),
            location: ChangeLocation {
                node: before.id,
                path: NodePath(self.path.clone()),
                line: before.line,
            },
        });
    }

    fn current_path(&self) -> NodePath {
        NodePath(self.path.clone())
    }
}

// ============================================================================
// Tests
// ============================================================================
