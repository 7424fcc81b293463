//! Built-in rules and the catalog that builds registries from configuration.

pub mod add_interface_by_parent;
pub mod array_shape_from_constant_array_return;
pub mod wrap_variable_variable_name_in_curly_braces;

use std::sync::Arc;

use tracing::debug;

use rectify_core::config::RuleSpec;
use rectify_core::error::EngineError;
use rectify_core::registry::RuleRegistry;
use rectify_core::rule::{short_name, Configuration, Rule};

pub use add_interface_by_parent::AddInterfaceByParent;
pub use array_shape_from_constant_array_return::ArrayShapeFromConstantArrayReturn;
pub use wrap_variable_variable_name_in_curly_braces::WrapVariableVariableNameInCurlyBraces;

/// Builds a rule from its configuration.
pub type RuleFactory = fn(&Configuration) -> Result<Arc<dyn Rule>, EngineError>;

/// A rule the catalog knows how to build.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    /// Fully qualified rule name.
    pub name: &'static str,
    pub factory: RuleFactory,
}

impl CatalogEntry {
    /// Last segment of the name, as used in `rectify.toml`.
    pub fn short_name(&self) -> &'static str {
        short_name(self.name)
    }

    fn matches(&self, name: &str) -> bool {
        let name = name.trim_start_matches('\\');
        name == self.name || name == self.short_name()
    }
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        name: add_interface_by_parent::NAME,
        factory: build_add_interface_by_parent,
    },
    CatalogEntry {
        name: array_shape_from_constant_array_return::NAME,
        factory: build_array_shape_from_constant_array_return,
    },
    CatalogEntry {
        name: wrap_variable_variable_name_in_curly_braces::NAME,
        factory: build_wrap_variable_variable_name_in_curly_braces,
    },
];

fn build_add_interface_by_parent(
    configuration: &Configuration,
) -> Result<Arc<dyn Rule>, EngineError> {
    let rule = AddInterfaceByParent::new(configuration.clone())?;
    Ok(Arc::new(rule))
}

fn build_array_shape_from_constant_array_return(
    configuration: &Configuration,
) -> Result<Arc<dyn Rule>, EngineError> {
    unconfigurable(array_shape_from_constant_array_return::NAME, configuration)?;
    Ok(Arc::new(ArrayShapeFromConstantArrayReturn))
}

fn build_wrap_variable_variable_name_in_curly_braces(
    configuration: &Configuration,
) -> Result<Arc<dyn Rule>, EngineError> {
    unconfigurable(wrap_variable_variable_name_in_curly_braces::NAME, configuration)?;
    Ok(Arc::new(WrapVariableVariableNameInCurlyBraces))
}

fn unconfigurable(name: &str, configuration: &Configuration) -> Result<(), EngineError> {
    if configuration.is_empty() {
        Ok(())
    } else {
        Err(EngineError::invalid_configuration(
            name,
            "rule takes no options",
        ))
    }
}

/// Every built-in rule.
pub fn builtin_catalog() -> &'static [CatalogEntry] {
    CATALOG
}

/// Look a rule up by short or fully qualified name.
pub fn find(name: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|entry| entry.matches(name))
}

/// Build a registry holding the rules in `specs`, in order.
pub fn build_registry(specs: &[RuleSpec]) -> Result<RuleRegistry, EngineError> {
    let mut builder = RuleRegistry::builder();
    for spec in specs {
        let entry = find(&spec.name).ok_or_else(|| EngineError::UnknownRule {
            name: spec.name.clone(),
        })?;
        builder.register_shared((entry.factory)(&spec.options)?)?;
        debug!(rule = entry.name, options = spec.options.len(), "rule enabled");
    }
    Ok(builder.build())
}

/// A registry with every built-in rule, unconfigured. Used for documentation.
pub fn catalog_registry() -> Result<RuleRegistry, EngineError> {
    let specs: Vec<RuleSpec> = CATALOG.iter().map(|entry| RuleSpec::new(entry.name)).collect();
    build_registry(&specs)
}
