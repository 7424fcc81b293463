//! Diff generation for reports and CLI output.
//!
//! Two formatters implement [`DiffFormatter`]:
//!
//! - [`MarkdownDiffFormatter`]: bare line diff for ```` ```diff ```` blocks
//!   in markdown reports. Every line of both texts is shown, prefixed with
//!   `-`, `+` or a space; no file headers and no hunk markers.
//! - [`UnifiedDiffFormatter`]: standard unified diff with `--- a/` / `+++ b/`
//!   headers, compatible with `git apply`.

use similar::{Algorithm, ChangeTag, TextDiff};

use crate::collab::DiffFormatter;

/// Full-context line diff without headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownDiffFormatter;

impl DiffFormatter for MarkdownDiffFormatter {
    fn diff(&self, before: &str, after: &str) -> String {
        let diff = TextDiff::configure()
            .algorithm(Algorithm::Myers)
            .diff_lines(before, after);

        let mut out = String::new();
        for change in diff.iter_all_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => '-',
                ChangeTag::Insert => '+',
                ChangeTag::Equal => ' ',
            };
            out.push(sign);
            out.push_str(change.value());
            if change.missing_newline() {
                out.push('\n');
            }
        }
        out
    }
}

/// Unified diff for one source unit.
#[derive(Debug, Clone)]
pub struct UnifiedDiffFormatter {
    path: String,
    context: usize,
}

impl UnifiedDiffFormatter {
    /// Formatter labelling both sides with `path`.
    pub fn for_unit(path: impl Into<String>) -> Self {
        UnifiedDiffFormatter {
            path: path.into(),
            context: 3,
        }
    }

    /// Lines of context around each hunk.
    pub fn with_context(mut self, context: usize) -> Self {
        self.context = context;
        self
    }
}

impl DiffFormatter for UnifiedDiffFormatter {
    fn diff(&self, before: &str, after: &str) -> String {
        if before == after {
            return String::new();
        }
        let diff = TextDiff::from_lines(before, after);
        diff.unified_diff()
            .context_radius(self.context)
            .header(&format!("a/{}", self.path), &format!("b/{}", self.path))
            .to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
