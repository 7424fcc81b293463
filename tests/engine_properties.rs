//! Behavioral properties of the engine, exercised end to end through the
//! public API with the built-in PHP rules.

use rectify::ast::{Node, NodeKind};
use rectify::collab::{Parser, Printer};
use rectify::config::{EngineOptions, RuleSpec};
use rectify::fixpoint::{self, Convergence};
use rectify::php::builders::{class, file, name};
use rectify::php::rules::{build_registry, AddInterfaceByParent};
use rectify::php::{JsonAstParser, PhpPrinter};
use rectify::registry::RuleRegistry;
use rectify::report::{describe_registry, detect_category};
use rectify::rule::{CodeSample, Configuration, Rewrite, Rule, RuleDefinition};

fn add_interface_registry() -> RuleRegistry {
    build_registry(&[RuleSpec::new("AddInterfaceByParentRector")
        .with_options(Configuration::new().with("SomeParent", "SomeInterface"))])
    .unwrap()
}

fn interfaces(root: &Node) -> Vec<String> {
    root.children("stmts")[0]
        .children("implements")
        .iter()
        .filter_map(Node::value)
        .map(str::to_string)
        .collect()
}

/// A parsed unit touching all three built-in rules.
const MIXED_UNIT: &str = r#"{
  "kind": "File",
  "stmts": [
    {
      "kind": "ClassDecl",
      "value": "SomeClass",
      "line": 3,
      "extends": { "kind": "Name", "value": "SomeParent", "line": 3 },
      "stmts": [
        {
          "kind": "ClassMethod",
          "value": "run",
          "line": 5,
          "params": [
            { "kind": "Param", "value": "name", "type": { "kind": "Name", "value": "string" } }
          ],
          "stmts": [
            {
              "kind": "ExprStmt",
              "line": 7,
              "expr": {
                "kind": "Assign",
                "var": {
                  "kind": "Variable",
                  "name": {
                    "kind": "ArrayDimFetch",
                    "var": { "kind": "Variable", "value": "foo" },
                    "dim": { "kind": "StringLit", "value": "bar" }
                  }
                },
                "expr": { "kind": "StringLit", "value": "baz" }
              }
            },
            {
              "kind": "Return",
              "line": 8,
              "expr": {
                "kind": "ArrayLiteral",
                "items": [
                  {
                    "kind": "ArrayItem",
                    "key": { "kind": "StringLit", "value": "name" },
                    "value": { "kind": "Variable", "value": "name" }
                  }
                ]
              }
            }
          ]
        }
      ]
    }
  ]
}"#;

fn all_rules_registry() -> RuleRegistry {
    build_registry(&[
        RuleSpec::new("AddInterfaceByParentRector")
            .with_options(Configuration::new().with("SomeParent", "SomeInterface")),
        RuleSpec::new("ArrayShapeFromConstantArrayReturnRector"),
        RuleSpec::new("WrapVariableVariableNameInCurlyBracesRector"),
    ])
    .unwrap()
}

fn load_mixed_unit() -> Node {
    rectify::php::frontend().load(MIXED_UNIT).unwrap()
}

#[test]
fn fixpoint_output_is_already_at_fixpoint() {
    let registry = all_rules_registry();
    let options = EngineOptions::default();
    let first = fixpoint::run(load_mixed_unit(), &registry, &options).unwrap();
    assert!(first.convergence.is_converged());
    assert_eq!(first.changelog.len(), 3);

    let second = fixpoint::run(first.root.clone(), &registry, &options).unwrap();
    assert_eq!(second.passes, 1);
    assert!(!second.last_pass_changed);
    assert!(second.changelog.is_empty());
    assert_eq!(second.root, first.root);
}

#[test]
fn runs_are_deterministic() {
    let registry = all_rules_registry();
    let options = EngineOptions::default();
    let a = fixpoint::run(load_mixed_unit(), &registry, &options).unwrap();
    let b = fixpoint::run(load_mixed_unit(), &registry, &options).unwrap();
    assert_eq!(a.root, b.root);
    assert_eq!(a.changelog, b.changelog);
    assert_eq!(
        serde_json::to_string(&a.changelog).unwrap(),
        serde_json::to_string(&b.changelog).unwrap()
    );
}

#[test]
fn empty_registry_leaves_tree_untouched() {
    let input = load_mixed_unit();
    let outcome =
        fixpoint::run(input.clone(), &RuleRegistry::empty(), &EngineOptions::default()).unwrap();
    assert_eq!(outcome.root, input);
    assert!(outcome.changelog.is_empty());
    assert_eq!(outcome.passes, 1);
    assert_eq!(outcome.convergence, Convergence::Converged);
}

#[test]
fn add_interface_by_parent_single_rule() {
    let registry = add_interface_registry();
    let input = file([class("SomeClass", Some("SomeParent"))]);
    let outcome = fixpoint::run(input, &registry, &EngineOptions::default()).unwrap();

    // one changing pass, then a quiet pass that proves the fixpoint
    assert_eq!(outcome.changelog.len(), 1);
    assert_eq!(outcome.changelog.records()[0].pass, 1);
    assert_eq!(outcome.passes, 2);
    assert_eq!(interfaces(&outcome.root), vec!["SomeInterface"]);
    assert_eq!(
        PhpPrinter.print(&outcome.root),
        "class SomeClass extends SomeParent implements SomeInterface\n{\n}\n"
    );

    let again = fixpoint::run(outcome.root, &registry, &EngineOptions::default()).unwrap();
    assert!(again.changelog.is_empty());
}

#[test]
fn add_interface_by_parent_skips_implemented_interface() {
    let rule =
        AddInterfaceByParent::new(Configuration::new().with("SomeParent", "SomeInterface"))
            .unwrap();
    let input = class("SomeClass", Some("SomeParent")).with_child("implements", name("SomeInterface"));
    assert_eq!(rule.try_rewrite(&input), Rewrite::Unchanged);

    let outcome = fixpoint::run(
        file([input]),
        &add_interface_registry(),
        &EngineOptions::default(),
    )
    .unwrap();
    assert!(outcome.changelog.is_empty());
}

/// Flips a class name between two values.
#[derive(Debug)]
struct Toggle {
    name: &'static str,
    from: &'static str,
    to: &'static str,
}

impl Rule for Toggle {
    fn name(&self) -> &str {
        self.name
    }

    fn node_kinds(&self) -> &[NodeKind] {
        &[NodeKind::ClassDecl]
    }

    fn definition(&self) -> RuleDefinition {
        RuleDefinition::new("Toggle a class name", vec![CodeSample::new("class A", "class B")])
    }

    fn try_rewrite(&self, node: &Node) -> Rewrite {
        if node.value() == Some(self.from) {
            Rewrite::Replace(node.clone().with_value(self.to))
        } else {
            Rewrite::Unchanged
        }
    }
}

#[test]
fn oscillating_rules_hit_the_pass_ceiling() {
    let mut builder = RuleRegistry::builder();
    builder
        .register(Toggle {
            name: "Test\\AToB",
            from: "A",
            to: "B",
        })
        .unwrap();
    builder
        .register(Toggle {
            name: "Test\\BToA",
            from: "B",
            to: "A",
        })
        .unwrap();
    let registry = builder.build();

    let options = EngineOptions::default().with_max_passes(4);
    let outcome = fixpoint::run(file([class("A", None)]), &registry, &options).unwrap();
    assert_eq!(outcome.passes, 4);
    assert!(outcome.last_pass_changed);
    let warning = outcome.convergence.warning().unwrap();
    assert_eq!(warning.max_passes, 4);
    // both rules fire on every pass
    assert_eq!(outcome.changelog.len(), 8);
}

#[test]
fn reporter_groups_rules_of_one_category_in_registration_order() {
    assert_eq!(detect_category("Rector\\Php70\\Rector\\FooRector"), "Php70");
    assert_eq!(
        detect_category("Rector\\Php70\\Rector\\Variable\\FooRector"),
        "Php70\\Variable"
    );

    let mut builder = RuleRegistry::builder();
    builder
        .register(Toggle {
            name: "Rector\\Php70\\Rector\\FooRector",
            from: "A",
            to: "B",
        })
        .unwrap();
    builder
        .register(Toggle {
            name: "Rector\\Php70\\Rector\\BarRector",
            from: "B",
            to: "A",
        })
        .unwrap();
    let markdown = describe_registry(&builder.build());

    assert!(markdown.starts_with("- [Php70](#php70)\n\n## Php70\n"));
    assert_eq!(markdown.matches("## Php70\n").count(), 1);
    let foo = markdown.find("### `FooRector`").unwrap();
    let bar = markdown.find("### `BarRector`").unwrap();
    assert!(foo < bar);
}

#[test]
fn parser_errors_carry_positions() {
    let err = JsonAstParser.parse("{\n  \"kind\": \"File\",\n  oops\n}").unwrap_err();
    assert_eq!(err.line, 3);
    assert!(err.column > 0);
}
