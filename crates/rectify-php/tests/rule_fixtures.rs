//! Built-in rules run over parsed JSON AST fixtures.
//!
//! Each case loads a unit through the parser and resolver, runs the rules to
//! a fixpoint, and compares the printed source before and after.

use rectify_core::collab::Printer;
use rectify_core::config::{EngineOptions, RuleSpec};
use rectify_core::fixpoint;
use rectify_core::rule::Configuration;
use rectify_php::rules::build_registry;
use rectify_php::{frontend, PhpPrinter};

/// Printed source before and after, plus the number of accepted rewrites.
fn apply(specs: &[RuleSpec], source: &str) -> (String, String, usize) {
    let registry = build_registry(specs).expect("registry builds");
    let root = frontend().load(source).expect("fixture parses");
    let before = PhpPrinter.print(&root);
    let outcome =
        fixpoint::run(root, &registry, &EngineOptions::default()).expect("fixpoint runs");
    assert!(outcome.convergence.is_converged());
    (before, PhpPrinter.print(&outcome.root), outcome.changelog.len())
}

// ============================================================================
// AddInterfaceByParentRector
// ============================================================================

mod add_interface_by_parent {
    use super::*;

    fn spec() -> RuleSpec {
        RuleSpec::new("AddInterfaceByParentRector")
            .with_options(Configuration::new().with("SomeParent", "SomeInterface"))
    }

    const EXTENDS_PARENT: &str = r#"{
      "kind": "File",
      "stmts": [
        {
          "kind": "ClassDecl",
          "value": "SomeClass",
          "line": 3,
          "extends": { "kind": "Name", "value": "\\SomeParent" }
        }
      ]
    }"#;

    #[test]
    fn adds_interface() {
        let (before, after, changes) = apply(&[spec()], EXTENDS_PARENT);
        assert_eq!(before, "class SomeClass extends \\SomeParent\n{\n}\n");
        assert_eq!(
            after,
            "class SomeClass extends \\SomeParent implements SomeInterface\n{\n}\n"
        );
        assert_eq!(changes, 1);
    }

    const ALREADY_IMPLEMENTS: &str = r#"{
      "kind": "File",
      "stmts": [
        {
          "kind": "ClassDecl",
          "value": "SomeClass",
          "extends": { "kind": "Name", "value": "SomeParent" },
          "implements": [{ "kind": "Name", "value": "SomeInterface" }]
        }
      ]
    }"#;

    #[test]
    fn skips_implemented_interface() {
        let (before, after, changes) = apply(&[spec()], ALREADY_IMPLEMENTS);
        assert_eq!(before, after);
        assert_eq!(changes, 0);
    }

    const LOWERCASE_NAMES: &str = r#"{
      "kind": "File",
      "stmts": [
        {
          "kind": "ClassDecl",
          "value": "SomeClass",
          "extends": { "kind": "Name", "value": "someparent" },
          "implements": [{ "kind": "Name", "value": "\\someinterface" }]
        }
      ]
    }"#;

    #[test]
    fn class_names_ignore_case() {
        let (before, after, changes) = apply(&[spec()], LOWERCASE_NAMES);
        assert_eq!(
            before,
            "class SomeClass extends someparent implements \\someinterface\n{\n}\n"
        );
        assert_eq!(after, before);
        assert_eq!(changes, 0);
    }
}

// ============================================================================
// ArrayShapeFromConstantArrayReturnRector
// ============================================================================

mod array_shape_from_constant_array_return {
    use super::*;

    fn spec() -> RuleSpec {
        RuleSpec::new("ArrayShapeFromConstantArrayReturnRector")
    }

    fn unit(param_type: &str) -> String {
        let param = if param_type.is_empty() {
            r#"{ "kind": "Param", "value": "name" }"#.to_string()
        } else {
            format!(
                r#"{{ "kind": "Param", "value": "name", "type": {{ "kind": "Name", "value": "{}" }} }}"#,
                param_type
            )
        };
        format!(
            r#"{{
              "kind": "File",
              "stmts": [
                {{
                  "kind": "ClassDecl",
                  "value": "SomeClass",
                  "attrs": {{ "final": true }},
                  "stmts": [
                    {{
                      "kind": "ClassMethod",
                      "value": "run",
                      "params": [{}],
                      "stmts": [
                        {{
                          "kind": "Return",
                          "expr": {{
                            "kind": "ArrayLiteral",
                            "items": [
                              {{
                                "kind": "ArrayItem",
                                "key": {{ "kind": "StringLit", "value": "name" }},
                                "value": {{ "kind": "Variable", "value": "name" }}
                              }}
                            ]
                          }}
                        }}
                      ]
                    }}
                  ]
                }}
              ]
            }}"#,
            param
        )
    }

    #[test]
    fn documents_shape_from_typed_parameter() {
        let (_before, after, changes) = apply(&[spec()], &unit("string"));
        assert_eq!(
            after,
            "final class SomeClass\n\
             {\n    \
             /**\n     \
             * @return array{name: string}\n     \
             */\n    \
             public function run(string $name)\n    \
             {\n        \
             return ['name' => $name];\n    \
             }\n\
             }\n"
        );
        assert_eq!(changes, 1);
    }

    #[test]
    fn untyped_parameter_is_left_alone() {
        let (before, after, changes) = apply(&[spec()], &unit(""));
        assert_eq!(before, after);
        assert_eq!(changes, 0);
    }
}

// ============================================================================
// WrapVariableVariableNameInCurlyBracesRector
// ============================================================================

mod wrap_variable_variable_name_in_curly_braces {
    use super::*;

    fn spec() -> RuleSpec {
        RuleSpec::new("WrapVariableVariableNameInCurlyBracesRector")
    }

    fn assignment(name_expr: &str) -> String {
        format!(
            r#"{{
              "kind": "File",
              "stmts": [
                {{
                  "kind": "ExprStmt",
                  "expr": {{
                    "kind": "Assign",
                    "var": {{ "kind": "Variable", "name": {} }},
                    "expr": {{ "kind": "StringLit", "value": "baz" }}
                  }}
                }}
              ]
            }}"#,
            name_expr
        )
    }

    #[test]
    fn wraps_dim_fetch_name() {
        let source = assignment(
            r#"{
              "kind": "ArrayDimFetch",
              "var": { "kind": "Variable", "value": "foo" },
              "dim": { "kind": "StringLit", "value": "bar" }
            }"#,
        );
        let (before, after, changes) = apply(&[spec()], &source);
        assert_eq!(before, "$$foo['bar'] = 'baz';\n");
        assert_eq!(after, "${$foo['bar']} = 'baz';\n");
        assert_eq!(changes, 1);
    }

    #[test]
    fn simple_variable_variable_is_left_alone() {
        let source = assignment(r#"{ "kind": "Variable", "value": "foo" }"#);
        let (before, after, changes) = apply(&[spec()], &source);
        assert_eq!(before, "$$foo = 'baz';\n");
        assert_eq!(after, before);
        assert_eq!(changes, 0);
    }
}

// ============================================================================
// Rules together
// ============================================================================

#[test]
fn all_rules_share_one_pass() {
    let source = r#"{
      "kind": "File",
      "stmts": [
        {
          "kind": "ClassDecl",
          "value": "SomeClass",
          "extends": { "kind": "Name", "value": "SomeParent" },
          "stmts": [
            {
              "kind": "ClassMethod",
              "value": "run",
              "stmts": [
                { "kind": "Return", "expr": { "kind": "ArrayLiteral", "items": [
                  { "kind": "ArrayItem",
                    "key": { "kind": "StringLit", "value": "id" },
                    "value": { "kind": "IntLit", "value": 1 } }
                ] } }
              ]
            }
          ]
        }
      ]
    }"#;
    let specs = [
        RuleSpec::new("AddInterfaceByParentRector")
            .with_options(Configuration::new().with("SomeParent", "SomeInterface")),
        RuleSpec::new("ArrayShapeFromConstantArrayReturnRector"),
    ];
    let (_before, after, changes) = apply(&specs, source);
    assert_eq!(changes, 2);
    assert!(after.starts_with("class SomeClass extends SomeParent implements SomeInterface\n"));
    assert!(after.contains("     * @return array{id: int}\n"));
}
