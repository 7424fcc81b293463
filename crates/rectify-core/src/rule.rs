//! Rule abstraction: a named, configurable, pure node-rewrite function.
//!
//! A rule declares the [`NodeKind`]s it wants to be offered and answers each
//! offer with a [`Rewrite`]. Rules never edit the node they are given; they
//! return a full replacement and the traversal engine performs the slot
//! substitution. This keeps every rule testable on a single detached node.
//!
//! # Naming
//!
//! A rule's name is a namespace-like path separated by `\`, for example
//! `Rector\Transform\Rector\Class_\AddInterfaceByParentRector`. The last
//! segment is the short name used in headings and configuration files; the
//! path segments drive report grouping (see [`crate::report::detect_category`]).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::{Node, NodeKind};

// ============================================================================
// Rewrite Outcome
// ============================================================================

/// Answer of a rule to one node.
#[derive(Debug, Clone, PartialEq)]
pub enum Rewrite {
    /// Leave the node as it is.
    Unchanged,
    /// Substitute the node with this subtree.
    Replace(Node),
    /// Delete the node from its parent slot.
    Remove,
}

impl Rewrite {
    /// Whether this outcome proposes a change.
    pub fn is_change(&self) -> bool {
        !matches!(self, Rewrite::Unchanged)
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Immutable option map supplied to a rule at construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration(BTreeMap<String, serde_json::Value>);

impl Configuration {
    /// An empty configuration.
    pub fn new() -> Self {
        Configuration(BTreeMap::new())
    }

    /// Build a configuration from string pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        Configuration(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// Add an option (builder style; configurations are never edited after
    /// being handed to a rule).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Option by name.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// Options in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no options.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Interpret every option as a string → string mapping.
    ///
    /// Returns the first offending key on failure.
    pub fn string_map(&self) -> Result<BTreeMap<String, String>, String> {
        self.0
            .iter()
            .map(|(key, value)| match value.as_str() {
                Some(text) => Ok((key.clone(), text.to_string())),
                None => Err(key.clone()),
            })
            .collect()
    }
}

// ============================================================================
// Documentation
// ============================================================================

/// One before/after example of a rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeSample {
    pub before: String,
    pub after: String,
    /// Configuration used to produce `after`, for configurable rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<Configuration>,
}

impl CodeSample {
    /// Sample for an unconfigured rule.
    pub fn new(before: impl Into<String>, after: impl Into<String>) -> Self {
        CodeSample {
            before: before.into(),
            after: after.into(),
            configuration: None,
        }
    }

    /// Sample for a configurable rule.
    pub fn configured(
        before: impl Into<String>,
        after: impl Into<String>,
        configuration: Configuration,
    ) -> Self {
        CodeSample {
            before: before.into(),
            after: after.into(),
            configuration: Some(configuration),
        }
    }
}

/// What a rule says about itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleDefinition {
    pub description: String,
    pub samples: Vec<CodeSample>,
}

impl RuleDefinition {
    pub fn new(description: impl Into<String>, samples: Vec<CodeSample>) -> Self {
        RuleDefinition {
            description: description.into(),
            samples,
        }
    }
}

/// Static documentation of a registered rule, as consumed by the reporter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleDocumentation {
    /// Fully qualified rule name.
    pub name: String,
    /// Report category derived from the name.
    pub category: String,
    pub description: String,
    pub samples: Vec<CodeSample>,
}

// ============================================================================
// Rule Trait
// ============================================================================

/// A node-rewrite rule.
///
/// Implementations must be pure with respect to the node they are offered:
/// the same node (and the same configuration) always yields the same
/// [`Rewrite`]. Rules are shared read-only across worker threads.
pub trait Rule: Send + Sync + fmt::Debug {
    /// Fully qualified, unique name (`\`-separated path).
    fn name(&self) -> &str;

    /// Kinds this rule wants to be offered. Fixed for the rule's lifetime.
    fn node_kinds(&self) -> &[NodeKind];

    /// Description and code samples.
    fn definition(&self) -> RuleDefinition;

    /// Configuration the rule was built with, if it is configurable.
    fn configuration(&self) -> Option<&Configuration> {
        None
    }

    /// Examine one node of an interesting kind.
    fn try_rewrite(&self, node: &Node) -> Rewrite;
}

/// Last `\`-separated segment of a rule name.
pub fn short_name(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}

// ============================================================================
// Tests
// ============================================================================
