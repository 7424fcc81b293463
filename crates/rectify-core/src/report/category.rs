//! Category detection and grouping for reports.
//!
//! Rule names are `\`-separated paths. The category of a rule is derived
//! from the path shape:
//!
//! | Name shape                                   | Category                   |
//! |----------------------------------------------|----------------------------|
//! | `Rector\Rector\...\<Group>\SomeRector`       | second-to-last segment     |
//! | `Rector\YamlRector\...\<Group>\SomeRector`   | second-to-last segment     |
//! | `Rector\<Package>\Rector\SomeRector`         | `<Package>`                |
//! | `Rector\<Package>\Rector\<Sub>\SomeRector`   | `<Package>\<Sub>`          |
//! | anything else                                | second-to-last segment     |

use std::sync::OnceLock;

use deunicode::deunicode;
use indexmap::IndexMap;
use regex::Regex;

/// Category used when a name has no second-to-last segment.
pub const UNCATEGORIZED: &str = "Other";

fn basic_rule_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^Rector\\(Yaml)?Rector").expect("static pattern is valid"))
}

/// Derive the report category of a rule from its qualified name.
pub fn detect_category(name: &str) -> String {
    let parts: Vec<&str> = name.split('\\').collect();
    let second_to_last = || {
        parts
            .len()
            .checked_sub(2)
            .map(|index| parts[index].to_string())
            .unwrap_or_else(|| UNCATEGORIZED.to_string())
    };

    if basic_rule_pattern().is_match(name) {
        return second_to_last();
    }
    match parts.len() {
        4 => parts[1].to_string(),
        5 => format!("{}\\{}", parts[1], parts[3]),
        _ => second_to_last(),
    }
}

/// Anchor slug of a category heading: backslashes dropped, transliterated
/// to ASCII, lowercased, runs of characters outside `[a-z0-9_]` collapsed to
/// `-`, edges trimmed.
pub fn slugify(category: &str) -> String {
    let ascii = deunicode(&category.replace('\\', ""));
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;
    for c in ascii.chars().map(|c| c.to_ascii_lowercase()) {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Group items by the category of their rule name.
///
/// Categories appear in order of first occurrence; items keep their input
/// order within a category.
pub fn group_by_category<T, F>(items: impl IntoIterator<Item = T>, name: F) -> IndexMap<String, Vec<T>>
where
    F: Fn(&T) -> &str,
{
    let mut groups: IndexMap<String, Vec<T>> = IndexMap::new();
    for item in items {
        let category = detect_category(name(&item));
        groups.entry(category).or_default().push(item);
    }
    groups
}

// ============================================================================
// Tests
// ============================================================================
