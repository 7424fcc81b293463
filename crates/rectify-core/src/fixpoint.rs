//! Fixpoint controller: repeat traversal passes until nothing changes.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::ast::Node;
use crate::changelog::Changelog;
use crate::config::EngineOptions;
use crate::error::EngineError;
use crate::registry::RuleRegistry;
use crate::traverse::run_pass;

/// The pass ceiling was reached while rules were still changing the tree.
///
/// Non-fatal: the tree of the last pass is still returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NonConvergenceWarning {
    pub max_passes: usize,
}

impl fmt::Display for NonConvergenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rules still changed the tree after {} passes; convergence not proven",
            self.max_passes
        )
    }
}

/// Whether a run reached a fixpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum Convergence {
    Converged,
    NotConverged(NonConvergenceWarning),
}

impl Convergence {
    pub fn is_converged(&self) -> bool {
        matches!(self, Convergence::Converged)
    }

    /// The warning, if convergence was not proven.
    pub fn warning(&self) -> Option<&NonConvergenceWarning> {
        match self {
            Convergence::Converged => None,
            Convergence::NotConverged(warning) => Some(warning),
        }
    }
}

/// Result of [`run`].
#[derive(Debug, Clone)]
pub struct FixpointOutcome {
    /// Tree after the last pass.
    pub root: Node,
    /// Records of every pass, in pass order.
    pub changelog: Changelog,
    /// Number of passes performed.
    pub passes: usize,
    pub convergence: Convergence,
    /// Whether the last pass performed changed anything.
    pub last_pass_changed: bool,
}

/// Run passes over `root` until one reports no change, or until
/// `options.max_passes` passes were made.
pub fn run(
    root: Node,
    registry: &RuleRegistry,
    options: &EngineOptions,
) -> Result<FixpointOutcome, EngineError> {
    options.validate()?;

    let mut root = root;
    let mut changelog = Changelog::new();
    let mut passes = 0;
    let mut last_pass_changed = false;

    for pass in 1..=options.max_passes {
        let outcome = run_pass(root, registry, options, pass)?;
        root = outcome.root;
        passes = pass;
        last_pass_changed = outcome.changed;
        changelog.append(outcome.changes);
        if !last_pass_changed {
            break;
        }
    }

    let convergence = if last_pass_changed {
        let warning = NonConvergenceWarning {
            max_passes: options.max_passes,
        };
        warn!(passes, "{}", warning);
        Convergence::NotConverged(warning)
    } else {
        Convergence::Converged
    };
    debug!(passes, changes = changelog.len(), "fixpoint finished");

    Ok(FixpointOutcome {
        root,
        changelog,
        passes,
        convergence,
        last_pass_changed,
    })
}

// ============================================================================
// Tests
// ============================================================================
