//! `$$foo['bar']` reads differently since PHP 7; spell out the braces.

use serde_json::Value;

use rectify_core::ast::{Node, NodeKind};
use rectify_core::rule::{CodeSample, Rewrite, Rule, RuleDefinition};

use crate::builders::BRACED;

pub const NAME: &str = "Rector\\Php70\\Rector\\Variable\\WrapVariableVariableNameInCurlyBracesRector";

#[derive(Debug, Clone, Copy, Default)]
pub struct WrapVariableVariableNameInCurlyBraces;

impl Rule for WrapVariableVariableNameInCurlyBraces {
    fn name(&self) -> &str {
        NAME
    }

    fn node_kinds(&self) -> &[NodeKind] {
        &[NodeKind::Variable]
    }

    fn definition(&self) -> RuleDefinition {
        RuleDefinition::new(
            "Ensure variable variables are wrapped in curly braces",
            vec![CodeSample::new(
                "$$foo['bar'] = 'baz';",
                "${$foo['bar']} = 'baz';",
            )],
        )
    }

    fn try_rewrite(&self, node: &Node) -> Rewrite {
        let Some(name_expr) = node.child("name") else {
            return Rewrite::Unchanged;
        };
        if name_expr.kind == NodeKind::Variable || node.attr_flag(BRACED) {
            return Rewrite::Unchanged;
        }
        Rewrite::Replace(node.clone().with_attr(BRACED, Value::Bool(true)))
    }
}
