//! Changelog: the ordered record of accepted rewrites of one run.

use indexmap::IndexMap;
use serde::Serialize;

use crate::ast::{Node, NodeId, NodePath};

/// Where a rewrite happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeLocation {
    /// Identity of the node that was rewritten.
    pub node: NodeId,
    /// Slot path from the root.
    pub path: NodePath,
    /// Source line of the original node, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// One accepted rewrite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeRecord {
    /// Fully qualified name of the rule that proposed the rewrite.
    pub rule: String,
    /// 1-indexed pass in which the rewrite happened.
    pub pass: usize,
    /// The node as the rule saw it.
    pub before: Node,
    /// The replacement, or `None` for a deletion.
    pub after: Option<Node>,
    pub location: ChangeLocation,
}

impl ChangeRecord {
    /// Whether this record is a deletion.
    pub fn is_removal(&self) -> bool {
        self.after.is_none()
    }
}

/// Append-only, ordered list of [`ChangeRecord`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Changelog {
    records: Vec<ChangeRecord>,
}

impl Changelog {
    pub fn new() -> Self {
        Changelog::default()
    }

    pub(crate) fn push(&mut self, record: ChangeRecord) {
        self.records.push(record);
    }

    pub(crate) fn append(&mut self, records: Vec<ChangeRecord>) {
        for record in records {
            self.push(record);
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in the order they were accepted.
    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChangeRecord> {
        self.records.iter()
    }

    /// Distinct rule names, in order of first appearance.
    pub fn rules(&self) -> Vec<&str> {
        self.by_rule().into_keys().collect()
    }

    /// Records grouped by rule name, rules in order of first appearance.
    pub fn by_rule(&self) -> IndexMap<&str, Vec<&ChangeRecord>> {
        let mut groups: IndexMap<&str, Vec<&ChangeRecord>> = IndexMap::new();
        for record in &self.records {
            groups.entry(record.rule.as_str()).or_default().push(record);
        }
        groups
    }

    /// Records produced in one pass.
    pub fn in_pass(&self, pass: usize) -> impl Iterator<Item = &ChangeRecord> {
        self.records.iter().filter(move |record| record.pass == pass)
    }
}

/// Concatenate records, e.g. the changelogs of every unit in a batch.
impl FromIterator<ChangeRecord> for Changelog {
    fn from_iter<I: IntoIterator<Item = ChangeRecord>>(iter: I) -> Self {
        Changelog {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Changelog {
    type Item = &'a ChangeRecord;
    type IntoIter = std::slice::Iter<'a, ChangeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// ============================================================================
// Tests
// ============================================================================
