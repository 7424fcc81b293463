//! Rule registry: the active rule set, indexed by node kind.
//!
//! The registry is built once, before any source unit is processed, and is
//! shared read-only across workers afterwards. Registration order is kept:
//! it is the order in which rules interested in the same kind are offered a
//! node, and the order in which documentation is reported.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::ast::NodeKind;
use crate::error::EngineError;
use crate::report::detect_category;
use crate::rule::{Rule, RuleDocumentation};

/// Immutable, kind-indexed rule set.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<Arc<dyn Rule>>,
    by_kind: BTreeMap<NodeKind, Vec<usize>>,
}

impl RuleRegistry {
    /// Start building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// A registry with no rules.
    pub fn empty() -> Self {
        RuleRegistry::default()
    }

    /// Rules interested in `kind`, in registration order.
    pub fn rules_for(&self, kind: NodeKind) -> impl Iterator<Item = &dyn Rule> + '_ {
        self.by_kind
            .get(&kind)
            .map(|indices| indices.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&index| self.rules[index].as_ref())
    }

    /// All rules in registration order.
    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> + '_ {
        self.rules.iter().map(|rule| rule.as_ref())
    }

    /// Rule by fully qualified name.
    pub fn get(&self, name: &str) -> Option<&dyn Rule> {
        self.rules().find(|rule| rule.name() == name)
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The dispatch table: each kind with at least one interested rule, and
    /// those rules' names in offer order.
    pub fn dispatch_table(&self) -> Vec<(NodeKind, Vec<&str>)> {
        self.by_kind
            .iter()
            .map(|(kind, indices)| {
                let names = indices
                    .iter()
                    .map(|&index| self.rules[index].name())
                    .collect();
                (*kind, names)
            })
            .collect()
    }

    /// Documentation of every rule, in registration order.
    pub fn documentation(&self) -> Vec<RuleDocumentation> {
        self.rules()
            .map(|rule| {
                let definition = rule.definition();
                RuleDocumentation {
                    name: rule.name().to_string(),
                    category: detect_category(rule.name()),
                    description: definition.description,
                    samples: definition.samples,
                }
            })
            .collect()
    }
}

/// Collects rules and builds the kind index.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    rules: Vec<Arc<dyn Rule>>,
    names: HashSet<String>,
    by_kind: BTreeMap<NodeKind, Vec<usize>>,
}

impl RegistryBuilder {
    /// Register a rule.
    ///
    /// Fails with [`EngineError::DuplicateRuleName`] if a rule with the same
    /// name is already registered, and with
    /// [`EngineError::InvalidConfiguration`] if the rule declares no kinds.
    pub fn register(&mut self, rule: impl Rule + 'static) -> Result<&mut Self, EngineError> {
        self.register_shared(Arc::new(rule))
    }

    /// Register an already shared rule.
    pub fn register_shared(&mut self, rule: Arc<dyn Rule>) -> Result<&mut Self, EngineError> {
        let name = rule.name().to_string();
        if rule.node_kinds().is_empty() {
            return Err(EngineError::invalid_configuration(
                name,
                "rule declares no node kinds",
            ));
        }
        if !self.names.insert(name.clone()) {
            return Err(EngineError::DuplicateRuleName { name });
        }

        let index = self.rules.len();
        let mut seen = HashSet::new();
        for &kind in rule.node_kinds() {
            if seen.insert(kind) {
                self.by_kind.entry(kind).or_default().push(index);
            }
        }
        tracing::debug!(rule = %name, kinds = ?rule.node_kinds(), "registered rule");
        self.rules.push(rule);
        Ok(self)
    }

    /// Freeze the registry.
    pub fn build(self) -> RuleRegistry {
        RuleRegistry {
            rules: self.rules,
            by_kind: self.by_kind,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;
    use crate::rule::{CodeSample, Rewrite, RuleDefinition};

    #[derive(Debug)]
    struct NamedRule {
        name: &'static str,
        kinds: Vec<NodeKind>,
    }

    impl NamedRule {
        fn new(name: &'static str, kinds: &[NodeKind]) -> Self {
            NamedRule {
                name,
                kinds: kinds.to_vec(),
            }
        }
    }

    impl Rule for NamedRule {
        fn name(&self) -> &str {
            self.name
        }

        fn node_kinds(&self) -> &[NodeKind] {
            &self.kinds
        }

        fn definition(&self) -> RuleDefinition {
            RuleDefinition::new(
                format!("{} description", self.name),
                vec![CodeSample::new("before", "after")],
            )
        }

        fn try_rewrite(&self, _node: &Node) -> Rewrite {
            Rewrite::Unchanged
        }
    }

    fn names<'a>(rules: impl Iterator<Item = &'a dyn Rule>) -> Vec<&'a str> {
        rules.map(|rule| rule.name()).collect()
    }

    #[test]
    fn rules_for_preserves_registration_order() {
        let mut builder = RuleRegistry::builder();
        builder
            .register(NamedRule::new("B", &[NodeKind::ClassDecl]))
            .unwrap()
            .register(NamedRule::new("A", &[NodeKind::ClassDecl, NodeKind::Name]))
            .unwrap()
            .register(NamedRule::new("C", &[NodeKind::Name]))
            .unwrap();
        let registry = builder.build();

        assert_eq!(names(registry.rules_for(NodeKind::ClassDecl)), vec!["B", "A"]);
        assert_eq!(names(registry.rules_for(NodeKind::Name)), vec!["A", "C"]);
        assert!(registry.rules_for(NodeKind::Return).next().is_none());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut builder = RuleRegistry::builder();
        builder
            .register(NamedRule::new("Same", &[NodeKind::Name]))
            .unwrap();
        let err = builder
            .register(NamedRule::new("Same", &[NodeKind::ClassDecl]))
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateRuleName { ref name } if name == "Same"));
    }

    #[test]
    fn rules_without_kinds_are_rejected() {
        let mut builder = RuleRegistry::builder();
        let err = builder.register(NamedRule::new("Empty", &[])).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfiguration { .. }));
    }

    #[test]
    fn repeated_kind_is_indexed_once() {
        let mut builder = RuleRegistry::builder();
        builder
            .register(NamedRule::new("R", &[NodeKind::Name, NodeKind::Name]))
            .unwrap();
        let registry = builder.build();
        assert_eq!(registry.rules_for(NodeKind::Name).count(), 1);
    }

    #[test]
    fn dispatch_table_lists_interested_kinds() {
        let mut builder = RuleRegistry::builder();
        builder
            .register(NamedRule::new("R1", &[NodeKind::Variable]))
            .unwrap()
            .register(NamedRule::new("R2", &[NodeKind::ClassDecl, NodeKind::Variable]))
            .unwrap();
        let registry = builder.build();
        assert_eq!(
            registry.dispatch_table(),
            vec![
                (NodeKind::ClassDecl, vec!["R2"]),
                (NodeKind::Variable, vec!["R1", "R2"]),
            ]
        );
    }

    #[test]
    fn documentation_carries_category() {
        let mut builder = RuleRegistry::builder();
        builder
            .register(NamedRule::new(
                "Rector\\Php70\\Rector\\FooRector",
                &[NodeKind::Variable],
            ))
            .unwrap();
        let docs = builder.build().documentation();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].category, "Php70");
        assert_eq!(docs[0].samples.len(), 1);
    }

    #[test]
    fn lookup_by_name() {
        let mut builder = RuleRegistry::builder();
        builder
            .register(NamedRule::new("R", &[NodeKind::Name]))
            .unwrap();
        let registry = builder.build();
        assert!(registry.get("R").is_some());
        assert!(registry.get("Missing").is_none());
        assert!(RuleRegistry::empty().is_empty());
    }
}
