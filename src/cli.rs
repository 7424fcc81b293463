//! CLI front door.
//!
//! The binary parses arguments and installs logging; the commands themselves
//! live here so they can be driven in-process:
//! - `process` - run the configured rules over JSON AST files
//! - `describe` - print rule documentation as markdown
//!
//! ## Error Handling
//!
//! All functions return `Result<T, EngineError>`. Per-file syntax errors are
//! not errors at this level: they are part of the returned [`BatchReport`]
//! and turn into a non-zero exit code through [`exit_code`].

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, info};
use walkdir::WalkDir;

use rectify_core::batch::{run_batch, BatchReport, SourceUnit, UnitOutcome};
use rectify_core::changelog::Changelog;
use rectify_core::collab::{DiffFormatter, Printer};
use rectify_core::config::{CliOverrides, Config, PathsConfig};
use rectify_core::diff::{MarkdownDiffFormatter, UnifiedDiffFormatter};
use rectify_core::error::{EngineError, OutputErrorCode};
use rectify_core::output::{emit_response, BatchResponse};
use rectify_core::report::{describe_registry, Reporter};
use rectify_php::parser::to_wire;
use rectify_php::resolver::strip_derived;
use rectify_php::rules::{build_registry, catalog_registry};
use rectify_php::PhpPrinter;

// ============================================================================
// Options
// ============================================================================

/// What `process` writes to its output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Unified diff per changed file.
    #[default]
    Diff,
    /// [`BatchResponse`] JSON.
    Json,
    /// Markdown report of the applied rewrites, grouped by rule category.
    Report,
}

/// Arguments of `rectify process`.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Files and directories to process (default: the workspace).
    pub paths: Vec<PathBuf>,
    /// Explicit config file (default: `rectify.toml` in the workspace).
    pub config: Option<PathBuf>,
    pub overrides: CliOverrides,
    pub format: OutputFormat,
    /// Rewrite changed files in place.
    pub write: bool,
}

/// A file selected for processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    pub unit: SourceUnit,
}

// ============================================================================
// Configuration and Inputs
// ============================================================================

/// Load the config file and apply command-line overrides.
pub fn load_config(
    workspace: &Path,
    explicit: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<Config, EngineError> {
    let mut config = match explicit {
        Some(path) => Config::load(&workspace.join(path))?,
        None => Config::load_from_dir(workspace)?,
    };
    config.apply_overrides(overrides)?;
    Ok(config)
}

/// Expand `paths` into source units, sorted by unit id.
///
/// Files named explicitly are always taken. Directories are walked and their
/// files kept when they match `filter.include` and not `filter.exclude`.
/// Unit ids are workspace-relative paths with `/` separators.
pub fn collect_inputs(
    workspace: &Path,
    paths: &[PathBuf],
    filter: &PathsConfig,
) -> Result<Vec<InputFile>, EngineError> {
    let include = build_glob_set(&filter.include)?;
    let exclude = build_glob_set(&filter.exclude)?;

    let mut selected: BTreeMap<String, PathBuf> = BTreeMap::new();
    for path in paths {
        let path = workspace.join(path);
        if fs::metadata(&path)?.is_file() {
            selected.insert(unit_id(workspace, &path), path);
            continue;
        }
        for entry in WalkDir::new(&path)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let id = unit_id(workspace, entry.path());
            if include.is_match(&id) && !exclude.is_match(&id) {
                selected.insert(id, entry.into_path());
            } else {
                debug!(file = %id, "skipped by path filter");
            }
        }
    }

    let mut inputs = Vec::with_capacity(selected.len());
    for (id, path) in selected {
        let text = fs::read_to_string(&path)?;
        inputs.push(InputFile {
            path,
            unit: SourceUnit::new(id, text),
        });
    }
    Ok(inputs)
}

fn unit_id(workspace: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(workspace).unwrap_or(path);
    relative.to_string_lossy().replace('\\', "/")
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, EngineError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            EngineError::Config(format!("invalid path pattern '{}': {}", pattern, e))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| EngineError::Config(format!("invalid path patterns: {}", e)))
}

// ============================================================================
// Commands
// ============================================================================

/// Run the configured rules over the selected files.
pub fn run_process(
    workspace: &Path,
    options: &ProcessOptions,
    out: &mut impl Write,
) -> Result<BatchReport, EngineError> {
    let config = load_config(workspace, options.config.as_deref(), &options.overrides)?;
    let registry = build_registry(&config.rules)?;

    let paths = if options.paths.is_empty() {
        vec![workspace.to_path_buf()]
    } else {
        options.paths.clone()
    };
    let inputs = collect_inputs(workspace, &paths, &config.paths)?;
    let units: Vec<SourceUnit> = inputs.iter().map(|input| input.unit.clone()).collect();
    info!(units = units.len(), rules = registry.len(), "processing");

    let report = run_batch(&rectify_php::frontend(), &units, &registry, &config.engine)?;

    let printer = PhpPrinter;
    match options.format {
        OutputFormat::Diff => write_diffs(&report, &printer, out)?,
        OutputFormat::Json => emit_response(&BatchResponse::from_report(&report, &printer), out)?,
        OutputFormat::Report => {
            let changelog: Changelog = report
                .units
                .iter()
                .filter_map(UnitOutcome::run)
                .flat_map(|run| run.changelog.iter().cloned())
                .collect();
            let markdown = Reporter::new(&MarkdownDiffFormatter).render_changes(
                &changelog,
                &registry,
                &printer,
            );
            write!(out, "{}", markdown)?;
        }
    }

    if options.write {
        write_back(&inputs, &report)?;
    }
    Ok(report)
}

/// Print rule documentation: every built-in rule, or only the configured ones.
pub fn run_describe(
    workspace: &Path,
    config: Option<&Path>,
    configured_only: bool,
    out: &mut impl Write,
) -> Result<(), EngineError> {
    let registry = if configured_only {
        let config = load_config(workspace, config, &CliOverrides::default())?;
        build_registry(&config.rules)?
    } else {
        catalog_registry()?
    };
    write!(out, "{}", describe_registry(&registry))?;
    Ok(())
}

/// Process exit code for a finished batch.
pub fn exit_code(report: &BatchReport) -> u8 {
    if report.summary.failed > 0 {
        OutputErrorCode::SyntaxError.code()
    } else {
        0
    }
}

fn write_diffs(
    report: &BatchReport,
    printer: &dyn Printer,
    out: &mut impl Write,
) -> Result<(), EngineError> {
    for outcome in &report.units {
        let Some(run) = outcome.run() else {
            continue;
        };
        if run.changelog.is_empty() {
            continue;
        }
        let diff = UnifiedDiffFormatter::for_unit(&outcome.unit)
            .diff(&printer.print(&run.original), &printer.print(&run.root));
        write!(out, "{}", diff)?;
    }
    Ok(())
}

/// Replace changed files with the wire form of their final tree.
///
/// Resolver attributes are left out so the next run derives them again from
/// the file as it is then.
fn write_back(inputs: &[InputFile], report: &BatchReport) -> Result<(), EngineError> {
    for (input, outcome) in inputs.iter().zip(&report.units) {
        let Some(run) = outcome.run() else {
            continue;
        };
        if run.changelog.is_empty() {
            continue;
        }
        let mut root = run.root.clone();
        strip_derived(&mut root);
        let text = serde_json::to_string_pretty(&to_wire(&root))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&input.path, text + "\n")?;
        info!(file = %outcome.unit, "rewrote file");
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
