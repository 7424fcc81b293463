//! Batch runner: process many independent source units on a worker pool.
//!
//! Each unit is loaded (parse, then resolve), validated against the slot
//! schemas and run to a fixpoint. Units share nothing but the read-only
//! [`RuleRegistry`], so they are spread over a `rayon` pool. Within one unit
//! everything is sequential.
//!
//! Failure isolation:
//!
//! - A [`SyntaxError`] (or a parser output that does not match the schemas)
//!   fails only its own unit.
//! - An [`EngineError`] raised while rewriting aborts the whole batch; it
//!   means a rule is broken, not the input.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{error, info};

use crate::ast::Node;
use crate::changelog::Changelog;
use crate::collab::Frontend;
use crate::config::EngineOptions;
use crate::error::{EngineError, SyntaxError};
use crate::fixpoint::{self, Convergence};
use crate::registry::RuleRegistry;

// ============================================================================
// Types
// ============================================================================

/// One source unit to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Caller-chosen identifier (usually a path).
    pub id: String,
    /// Source text handed to the parser.
    pub text: String,
}

impl SourceUnit {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        SourceUnit {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Outcome category of a unit. When several apply, the strongest wins:
/// failed, then non-converged, then changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Unchanged,
    Changed,
    NonConverged,
    Failed,
}

impl UnitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitStatus::Unchanged => "unchanged",
            UnitStatus::Changed => "changed",
            UnitStatus::NonConverged => "non_converged",
            UnitStatus::Failed => "failed",
        }
    }
}

/// A unit that was parsed and run to (or towards) a fixpoint.
#[derive(Debug, Clone)]
pub struct UnitRun {
    /// Tree as loaded, before any rule ran.
    pub original: Node,
    /// Tree after the last pass.
    pub root: Node,
    pub changelog: Changelog,
    pub passes: usize,
    pub convergence: Convergence,
}

/// What happened to one unit.
#[derive(Debug, Clone)]
pub struct UnitOutcome {
    pub unit: String,
    pub result: Result<UnitRun, SyntaxError>,
}

impl UnitOutcome {
    pub fn status(&self) -> UnitStatus {
        match &self.result {
            Err(_) => UnitStatus::Failed,
            Ok(run) if !run.convergence.is_converged() => UnitStatus::NonConverged,
            Ok(run) if !run.changelog.is_empty() => UnitStatus::Changed,
            Ok(_) => UnitStatus::Unchanged,
        }
    }

    /// The run, if the unit loaded.
    pub fn run(&self) -> Option<&UnitRun> {
        self.result.as_ref().ok()
    }

    /// The captured error, if the unit failed.
    pub fn error(&self) -> Option<&SyntaxError> {
        self.result.as_ref().err()
    }
}

/// Per-status unit counts. Every unit is counted exactly once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub changed: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub non_converged: usize,
}

impl BatchSummary {
    fn count(&mut self, status: UnitStatus) {
        match status {
            UnitStatus::Unchanged => self.unchanged += 1,
            UnitStatus::Changed => self.changed += 1,
            UnitStatus::NonConverged => self.non_converged += 1,
            UnitStatus::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.changed + self.unchanged + self.failed + self.non_converged
    }
}

/// Result of [`run_batch`]: per-unit outcomes in input order plus counts.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub units: Vec<UnitOutcome>,
    pub summary: BatchSummary,
}

impl BatchReport {
    fn from_outcomes(units: Vec<UnitOutcome>) -> Self {
        let mut summary = BatchSummary::default();
        for unit in &units {
            summary.count(unit.status());
        }
        BatchReport { units, summary }
    }

    /// Failed units with their captured errors.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &SyntaxError)> {
        self.units
            .iter()
            .filter_map(|unit| unit.error().map(|err| (unit.unit.as_str(), err)))
    }

    /// Outcome of a unit by id.
    pub fn get(&self, unit: &str) -> Option<&UnitOutcome> {
        self.units.iter().find(|outcome| outcome.unit == unit)
    }
}

// ============================================================================
// Running
// ============================================================================

/// Process `units` on a worker pool of `options.workers` threads.
///
/// Outcomes come back in input order regardless of scheduling.
pub fn run_batch(
    frontend: &Frontend<'_>,
    units: &[SourceUnit],
    registry: &RuleRegistry,
    options: &EngineOptions,
) -> Result<BatchReport, EngineError> {
    options.validate()?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers)
        .build()
        .map_err(|e| EngineError::WorkerPool(e.to_string()))?;

    let outcomes = pool.install(|| {
        units
            .par_iter()
            .map(|unit| process_unit(frontend, unit, registry, options))
            .collect::<Result<Vec<_>, _>>()
    })?;

    let report = BatchReport::from_outcomes(outcomes);
    info!(
        units = report.units.len(),
        changed = report.summary.changed,
        unchanged = report.summary.unchanged,
        failed = report.summary.failed,
        non_converged = report.summary.non_converged,
        "batch finished"
    );
    Ok(report)
}

/// Process a single unit on the current thread.
pub fn process_unit(
    frontend: &Frontend<'_>,
    unit: &SourceUnit,
    registry: &RuleRegistry,
    options: &EngineOptions,
) -> Result<UnitOutcome, EngineError> {
    let original = match load(frontend, unit) {
        Ok(root) => root,
        Err(err) => {
            error!(unit = %unit.id, error = %err, "unit failed");
            return Ok(UnitOutcome {
                unit: unit.id.clone(),
                result: Err(err),
            });
        }
    };

    let outcome = fixpoint::run(original.clone(), registry, options)?;
    let run = UnitRun {
        original,
        root: outcome.root,
        changelog: outcome.changelog,
        passes: outcome.passes,
        convergence: outcome.convergence,
    };
    let outcome = UnitOutcome {
        unit: unit.id.clone(),
        result: Ok(run),
    };
    info!(
        unit = %unit.id,
        status = outcome.status().as_str(),
        changes = outcome.run().map_or(0, |run| run.changelog.len()),
        "unit processed"
    );
    Ok(outcome)
}

fn load(frontend: &Frontend<'_>, unit: &SourceUnit) -> Result<Node, SyntaxError> {
    let root = frontend
        .load(&unit.text)
        .map_err(|err| err.in_unit(&unit.id))?;
    root.validate().map_err(|violation| {
        SyntaxError::new(
            format!("parser produced a malformed tree: {}", violation),
            root.line.unwrap_or(1) as usize,
            1,
        )
        .in_unit(&unit.id)
    })?;
    Ok(root)
}

// ============================================================================
// Tests
// ============================================================================
