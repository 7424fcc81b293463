//! Markdown rendering shared by documentation and live mode.
//!
//! Layout:
//!
//! ````text
//! - [Php70\Variable](#php70variable)
//!
//! ## Php70\Variable
//!
//! ### `WrapVariableVariableNameInCurlyBracesRector`
//!
//! - class: `Rector\Php70\Rector\Variable\WrapVariableVariableNameInCurlyBracesRector`
//!
//! Ensure variable variables are wrapped in curly braces
//!
//! ```diff
//! ...
//! ```
//!
//! ````

use std::fmt::Write as _;

use indexmap::IndexSet;
use tracing::debug;

use crate::changelog::{ChangeRecord, Changelog};
use crate::collab::{DiffFormatter, Printer};
use crate::diff::MarkdownDiffFormatter;
use crate::registry::RuleRegistry;
use crate::rule::{short_name, Configuration, RuleDocumentation};

use super::category::{group_by_category, slugify};

/// Separator between joined code samples.
const SAMPLE_SEPARATOR: &str = "\n\n";

/// Render the documentation of every rule in `registry`.
pub fn describe_registry(registry: &RuleRegistry) -> String {
    Reporter::new(&MarkdownDiffFormatter).describe(&registry.documentation())
}

/// Renders rule documentation and changelogs as markdown.
pub struct Reporter<'a> {
    differ: &'a dyn DiffFormatter,
}

/// One rule section: heading, class line, optional description, diff blocks.
struct Section<'s> {
    name: &'s str,
    description: Option<String>,
    blocks: Vec<Block>,
}

struct Block {
    diff: String,
    configuration: Option<Fenced>,
}

/// A code block body with its fence language.
struct Fenced {
    lang: &'static str,
    text: String,
}

impl<'a> Reporter<'a> {
    pub fn new(differ: &'a dyn DiffFormatter) -> Self {
        Reporter { differ }
    }

    /// Documentation mode: one combined diff per rule.
    ///
    /// The before texts of all samples are joined with a blank line, as are
    /// the after texts; configured samples add a `toml` block, or a `json`
    /// block when a value has no TOML form.
    pub fn describe(&self, docs: &[RuleDocumentation]) -> String {
        let sections = docs.iter().map(|doc| {
            let before: Vec<&str> = doc.samples.iter().map(|s| s.before.as_str()).collect();
            let after: Vec<&str> = doc.samples.iter().map(|s| s.after.as_str()).collect();
            let configuration = render_configurations(
                doc.samples
                    .iter()
                    .filter_map(|sample| sample.configuration.as_ref()),
            );
            Section {
                name: &doc.name,
                description: Some(doc.description.clone()),
                blocks: vec![Block {
                    diff: self
                        .differ
                        .diff(&before.join(SAMPLE_SEPARATOR), &after.join(SAMPLE_SEPARATOR)),
                    configuration,
                }],
            }
        });
        render(sections)
    }

    /// Live mode: one diff block per distinct before/after pair of a rule.
    ///
    /// Rules are listed in registration order; rules missing from `registry`
    /// follow in order of first appearance, without a description.
    pub fn render_changes(
        &self,
        changelog: &Changelog,
        registry: &RuleRegistry,
        printer: &dyn Printer,
    ) -> String {
        let mut by_rule: Vec<(&str, Vec<&ChangeRecord>)> = changelog.by_rule().into_iter().collect();
        let position = |name: &str| {
            registry
                .rules()
                .position(|rule| rule.name() == name)
                .unwrap_or(usize::MAX)
        };
        by_rule.sort_by_key(|(name, _)| position(name));

        let sections: Vec<Section<'_>> = by_rule
            .into_iter()
            .map(|(name, records)| {
                let mut pairs: IndexSet<(String, String)> = IndexSet::new();
                for record in records {
                    let before = printer.print(&record.before);
                    let after = record
                        .after
                        .as_ref()
                        .map(|node| printer.print(node))
                        .unwrap_or_default();
                    pairs.insert((before, after));
                }
                Section {
                    name,
                    description: registry.get(name).map(|rule| rule.definition().description),
                    blocks: pairs
                        .into_iter()
                        .map(|(before, after)| Block {
                            diff: self.differ.diff(&before, &after),
                            configuration: None,
                        })
                        .collect(),
                }
            })
            .collect();
        render(sections)
    }
}

fn render_configurations<'c>(configs: impl Iterator<Item = &'c Configuration>) -> Option<Fenced> {
    let configs: Vec<&Configuration> = configs.collect();
    if configs.is_empty() {
        return None;
    }
    let as_toml: Result<Vec<String>, toml::ser::Error> =
        configs.iter().map(toml::to_string).collect();
    let (lang, rendered) = match as_toml {
        Ok(rendered) => ("toml", rendered),
        Err(err) => {
            debug!(error = %err, "sample configuration has no toml form");
            let rendered = configs
                .iter()
                .map(|config| serde_json::to_string_pretty(config).unwrap_or_default())
                .collect();
            ("json", rendered)
        }
    };
    let text = rendered
        .iter()
        .map(|text| text.trim_end())
        .collect::<Vec<_>>()
        .join(SAMPLE_SEPARATOR);
    Some(Fenced { lang, text })
}

fn render<'s>(sections: impl IntoIterator<Item = Section<'s>>) -> String {
    let groups = group_by_category(sections, |section| section.name);
    let mut out = String::new();

    for category in groups.keys() {
        let _ = writeln!(out, "- [{}](#{})", category, slugify(category));
    }
    out.push('\n');

    for (category, sections) in &groups {
        let _ = writeln!(out, "## {}\n", category);
        for section in sections {
            render_section(&mut out, section);
        }
    }
    out
}

fn render_section(out: &mut String, section: &Section<'_>) {
    let _ = writeln!(out, "### `{}`\n", short_name(section.name));
    let _ = writeln!(out, "- class: `{}`", section.name);
    if let Some(description) = section.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = write!(out, "\n{}\n", description);
    }
    for block in &section.blocks {
        let _ = write!(out, "\n```diff\n{}\n```\n", block.diff.trim_end_matches('\n'));
        if let Some(configuration) = &block.configuration {
            let _ = write!(
                out,
                "\n```{}\n{}\n```\n",
                configuration.lang, configuration.text
            );
        }
    }
    out.push('\n');
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Node, NodeId, NodeKind, NodePath};
    use crate::changelog::ChangeLocation;
    use crate::rule::{CodeSample, Rewrite, Rule, RuleDefinition};

    #[derive(Debug)]
    struct Documented {
        name: &'static str,
        description: &'static str,
        samples: Vec<CodeSample>,
    }

    impl Rule for Documented {
        fn name(&self) -> &str {
            self.name
        }
        fn node_kinds(&self) -> &[NodeKind] {
            &[NodeKind::Name]
        }
        fn definition(&self) -> RuleDefinition {
            RuleDefinition::new(self.description, self.samples.clone())
        }
        fn try_rewrite(&self, _node: &Node) -> Rewrite {
            Rewrite::Unchanged
        }
    }

    struct ValuePrinter;

    impl Printer for ValuePrinter {
        fn print(&self, node: &Node) -> String {
            format!("{}\n", node.value().unwrap_or(""))
        }
    }

    fn documented(name: &'static str, description: &'static str) -> Documented {
        Documented {
            name,
            description,
            samples: vec![CodeSample::new("$a;\n", "$b;\n")],
        }
    }

    fn registry(rules: Vec<Documented>) -> RuleRegistry {
        let mut builder = RuleRegistry::builder();
        for rule in rules {
            builder.register(rule).unwrap();
        }
        builder.build()
    }

    fn rename(rule: &str, from: &str, to: Option<&str>) -> ChangeRecord {
        ChangeRecord {
            rule: rule.to_string(),
            pass: 1,
            before: Node::new(NodeKind::Name).with_value(from),
            after: to.map(|to| Node::new(NodeKind::Name).with_value(to)),
            location: ChangeLocation {
                node: NodeId(1),
                path: NodePath::root(),
                line: None,
            },
        }
    }

    mod documentation {
        use super::*;

        #[test]
        fn renders_toc_heading_class_description_and_diff() {
            let registry = registry(vec![documented(
                "Rector\\Php70\\Rector\\Variable\\FooRector",
                "Does foo",
            )]);
            let text = describe_registry(&registry);
            assert_eq!(
                text,
                "- [Php70\\Variable](#php70variable)\n\
                 \n\
                 ## Php70\\Variable\n\
                 \n\
                 ### `FooRector`\n\
                 \n\
                 - class: `Rector\\Php70\\Rector\\Variable\\FooRector`\n\
                 \n\
                 Does foo\n\
                 \n\
                 ```diff\n\
                 -$a;\n\
                 +$b;\n\
                 ```\n\
                 \n"
            );
        }

        #[test]
        fn groups_rules_under_one_heading_in_registration_order() {
            let registry = registry(vec![
                documented("Rector\\Php70\\Rector\\FooRector", "foo"),
                documented("Rector\\Php71\\Rector\\BazRector", "baz"),
                documented("Rector\\Php70\\Rector\\BarRector", "bar"),
            ]);
            let text = describe_registry(&registry);
            assert_eq!(text.matches("## Php70\n").count(), 1);
            let foo = text.find("### `FooRector`").unwrap();
            let bar = text.find("### `BarRector`").unwrap();
            let php71 = text.find("## Php71").unwrap();
            assert!(foo < bar);
            assert!(bar < php71);
            assert!(text.starts_with("- [Php70](#php70)\n- [Php71](#php71)\n\n"));
        }

        #[test]
        fn joins_samples_with_blank_line() {
            let rule = Documented {
                name: "Rector\\Php70\\Rector\\FooRector",
                description: "",
                samples: vec![CodeSample::new("a\n", "b\n"), CodeSample::new("c\n", "c\n")],
            };
            let text = describe_registry(&registry(vec![rule]));
            assert!(text.contains("```diff\n-a\n+b\n \n \n c\n```"));
            assert!(!text.contains("- class: `Rector\\Php70\\Rector\\FooRector`\n\n\n"));
        }

        #[test]
        fn configured_samples_add_toml_block() {
            let rule = Documented {
                name: "Rector\\Transform\\Rector\\Class_\\AddInterfaceByParentRector",
                description: "Add interface",
                samples: vec![CodeSample::configured(
                    "a\n",
                    "b\n",
                    Configuration::new().with("SomeParent", "SomeInterface"),
                )],
            };
            let text = describe_registry(&registry(vec![rule]));
            assert!(text.contains("```toml\nSomeParent = \"SomeInterface\"\n```\n"));
        }

        #[test]
        fn configuration_without_toml_form_renders_as_json() {
            let rule = Documented {
                name: "Rector\\Transform\\Rector\\Class_\\FooRector",
                description: "Foo",
                samples: vec![CodeSample::configured(
                    "a\n",
                    "b\n",
                    Configuration::new().with("SomeParent", serde_json::Value::Null),
                )],
            };
            let text = describe_registry(&registry(vec![rule]));
            assert!(text.contains("```json\n{\n  \"SomeParent\": null\n}\n```\n"));
            assert!(!text.contains("```toml"));
        }
    }

    mod live {
        use super::*;

        #[test]
        fn one_block_per_distinct_pair() {
            let registry = registry(vec![documented("Rector\\Php70\\Rector\\FooRector", "foo")]);
            let mut log = Changelog::new();
            log.push(rename("Rector\\Php70\\Rector\\FooRector", "a", Some("b")));
            log.push(rename("Rector\\Php70\\Rector\\FooRector", "a", Some("b")));
            log.push(rename("Rector\\Php70\\Rector\\FooRector", "c", Some("d")));

            let text = Reporter::new(&MarkdownDiffFormatter).render_changes(
                &log,
                &registry,
                &ValuePrinter,
            );
            assert_eq!(text.matches("```diff").count(), 2);
            assert!(text.contains("-a\n+b\n"));
            assert!(text.contains("-c\n+d\n"));
            assert!(text.contains("\nfoo\n"));
        }

        #[test]
        fn rules_follow_registration_order_and_unknown_rules_come_last() {
            let registry = registry(vec![
                documented("Rector\\Php70\\Rector\\FirstRector", "first"),
                documented("Rector\\Php70\\Rector\\SecondRector", "second"),
            ]);
            let mut log = Changelog::new();
            log.push(rename("Rector\\Php70\\Rector\\UnknownRector", "x", Some("y")));
            log.push(rename("Rector\\Php70\\Rector\\SecondRector", "a", Some("b")));
            log.push(rename("Rector\\Php70\\Rector\\FirstRector", "c", Some("d")));

            let text = Reporter::new(&MarkdownDiffFormatter).render_changes(
                &log,
                &registry,
                &ValuePrinter,
            );
            let first = text.find("`FirstRector`").unwrap();
            let second = text.find("`SecondRector`").unwrap();
            let unknown = text.find("`UnknownRector`").unwrap();
            assert!(first < second);
            assert!(second < unknown);
        }

        #[test]
        fn removal_renders_empty_after() {
            let registry = registry(vec![documented("Rector\\Php70\\Rector\\FooRector", "foo")]);
            let mut log = Changelog::new();
            log.push(rename("Rector\\Php70\\Rector\\FooRector", "gone", None));
            let text = Reporter::new(&MarkdownDiffFormatter).render_changes(
                &log,
                &registry,
                &ValuePrinter,
            );
            assert!(text.contains("```diff\n-gone\n```"));
        }

        #[test]
        fn empty_changelog_renders_empty_toc() {
            let text = Reporter::new(&MarkdownDiffFormatter).render_changes(
                &Changelog::new(),
                &RuleRegistry::empty(),
                &ValuePrinter,
            );
            assert_eq!(text, "\n");
        }
    }
}
