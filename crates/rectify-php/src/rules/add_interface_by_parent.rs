//! Add interfaces to classes based on their parent class.

use std::collections::BTreeMap;

use rectify_core::ast::{Node, NodeKind};
use rectify_core::error::EngineError;
use rectify_core::rule::{CodeSample, Configuration, Rewrite, Rule, RuleDefinition};

use crate::builders::{self, SCOPE};

pub const NAME: &str = "Rector\\Transform\\Rector\\Class_\\AddInterfaceByParentRector";

/// Configured with a `parent class => interface` map; every class whose
/// parent matches a key gets the interface appended to its `implements`
/// list unless it already implements it.
#[derive(Debug, Clone)]
pub struct AddInterfaceByParent {
    configuration: Configuration,
    interface_by_parent: BTreeMap<String, String>,
}

impl AddInterfaceByParent {
    pub fn new(configuration: Configuration) -> Result<Self, EngineError> {
        let interface_by_parent = configuration.string_map().map_err(|key| {
            EngineError::invalid_configuration(
                NAME,
                format!("option '{}' must map a parent class to an interface name", key),
            )
        })?;
        Ok(AddInterfaceByParent {
            configuration,
            interface_by_parent,
        })
    }

    /// Parent from the resolved scope, or the syntactic `extends` clause.
    fn parent_of(class: &Node) -> Option<&str> {
        let resolved = class
            .attr(SCOPE)
            .and_then(|scope| scope.get("parent_class"))
            .and_then(|parent| parent.as_str());
        resolved
            .or_else(|| class.child("extends").and_then(Node::value))
            .map(normalize)
    }
}

/// PHP class names are case-insensitive and may be fully qualified.
fn same_class(a: &str, b: &str) -> bool {
    normalize(a).eq_ignore_ascii_case(normalize(b))
}

fn normalize(name: &str) -> &str {
    name.trim_start_matches('\\')
}

impl Rule for AddInterfaceByParent {
    fn name(&self) -> &str {
        NAME
    }

    fn node_kinds(&self) -> &[NodeKind] {
        &[NodeKind::ClassDecl]
    }

    fn definition(&self) -> RuleDefinition {
        RuleDefinition::new(
            "Add interface by parent",
            vec![CodeSample::configured(
                "class SomeClass extends SomeParent\n{\n\n}",
                "class SomeClass extends SomeParent implements SomeInterface\n{\n\n}",
                Configuration::new().with("SomeParent", "SomeInterface"),
            )],
        )
    }

    fn configuration(&self) -> Option<&Configuration> {
        Some(&self.configuration)
    }

    fn try_rewrite(&self, node: &Node) -> Rewrite {
        let Some(parent) = Self::parent_of(node) else {
            return Rewrite::Unchanged;
        };

        let mut class = node.clone();
        let mut changed = false;
        for (parent_name, interface) in &self.interface_by_parent {
            if !same_class(parent_name, parent) {
                continue;
            }
            let already = class
                .children("implements")
                .iter()
                .filter_map(Node::value)
                .any(|name| same_class(name, interface));
            if already {
                continue;
            }
            class.push_child("implements", builders::name(interface));
            changed = true;
        }

        if changed {
            Rewrite::Replace(class)
        } else {
            Rewrite::Unchanged
        }
    }
}
