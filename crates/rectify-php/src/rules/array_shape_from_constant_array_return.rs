//! Document the exact shape of a constant array returned by a method.

use rectify_core::ast::{Node, NodeKind};
use rectify_core::rule::{CodeSample, Rewrite, Rule, RuleDefinition};

use crate::builders::{self, RESOLVED_TYPE};

pub const NAME: &str =
    "Rector\\TypeDeclaration\\Rector\\ClassMethod\\ArrayShapeFromConstantArrayReturnRector";

/// Adds `@return array{key: type, ...}` to methods whose only return
/// statement returns an array literal with string keys and typed values.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayShapeFromConstantArrayReturn;

impl ArrayShapeFromConstantArrayReturn {
    /// `key: type` entries of the returned array, if it has a known shape.
    fn shape(method: &Node) -> Option<Vec<String>> {
        let returns = method.find_all(NodeKind::Return);
        let [only] = returns.as_slice() else {
            return None;
        };
        let array = only.child("expr")?;
        if array.kind != NodeKind::ArrayLiteral {
            return None;
        }
        let items = array.children("items");
        if items.is_empty() {
            return None;
        }
        items
            .iter()
            .map(|item| {
                let key = item.child("key")?;
                if key.kind != NodeKind::StringLit {
                    return None;
                }
                let type_name = item.child("value")?.attr_str(RESOLVED_TYPE)?;
                Some(format!("{}: {}", key.value()?, type_name))
            })
            .collect()
    }
}

fn has_return_tag(doc: &Node) -> bool {
    doc.value()
        .is_some_and(|text| text.lines().any(|line| line.contains("@return")))
}

/// Insert a tag line before the closing `*/` of a doc comment.
fn add_tag(doc: &str, tag: &str) -> String {
    let body = doc.trim_end().trim_end_matches("*/").trim_end();
    if body == "/**" {
        return format!("/**\n * {}\n */", tag);
    }
    format!("{}\n * {}\n */", body, tag)
}

impl Rule for ArrayShapeFromConstantArrayReturn {
    fn name(&self) -> &str {
        NAME
    }

    fn node_kinds(&self) -> &[NodeKind] {
        &[NodeKind::ClassMethod]
    }

    fn definition(&self) -> RuleDefinition {
        RuleDefinition::new(
            "Add array shape exact types based on constant keys of array",
            vec![CodeSample::new(
                "final class SomeClass\n\
                 {\n    \
                 public function run(string $name)\n    \
                 {\n        \
                 return ['name' => $name];\n    \
                 }\n\
                 }",
                "final class SomeClass\n\
                 {\n    \
                 /**\n     \
                 * @return array{name: string}\n     \
                 */\n    \
                 public function run(string $name)\n    \
                 {\n        \
                 return ['name' => $name];\n    \
                 }\n\
                 }",
            )],
        )
    }

    fn try_rewrite(&self, node: &Node) -> Rewrite {
        if node.child("doc").is_some_and(has_return_tag) {
            return Rewrite::Unchanged;
        }
        let Some(shape) = Self::shape(node) else {
            return Rewrite::Unchanged;
        };

        let tag = format!("@return array{{{}}}", shape.join(", "));
        let doc = match node.child("doc").and_then(Node::value) {
            Some(existing) => builders::doc(&add_tag(existing, &tag)),
            None => builders::doc_with_tags([tag.as_str()]),
        };

        let mut method = node.clone();
        if let Some(slot) = method.children_mut("doc") {
            slot.clear();
            slot.push(doc);
        }
        Rewrite::Replace(method)
    }
}
