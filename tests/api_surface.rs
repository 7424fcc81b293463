//! Compile-only test to verify public API surface.
//!
//! This file serves as a compile-time contract for the public API.
//! If this file fails to compile, the public API has regressed.
//!
//! Run with: cargo test -p rectify -- api_surface

// Allow unused imports - this test is about compile-time verification, not runtime usage
#![allow(unused_imports)]

// ============================================================================
// Engine Types
// ============================================================================

// ast module - tree data model and slot schemas
use rectify::ast::{
    Arity, Attributes, Node, NodeId, NodeKind, NodePath, PathStep, SchemaViolation, Slot,
    SlotSchema,
};

// rule module - rule abstraction and documentation
use rectify::rule::{
    short_name, CodeSample, Configuration, Rewrite, Rule, RuleDefinition, RuleDocumentation,
};

// registry module - interest-indexed rule buckets
use rectify::registry::{RegistryBuilder, RuleRegistry};

// traverse / fixpoint modules - passes and convergence
use rectify::fixpoint::{run, Convergence, FixpointOutcome, NonConvergenceWarning};
use rectify::traverse::{run_one_pass, PassOutcome};

// changelog module - accepted rewrites
use rectify::changelog::{ChangeLocation, ChangeRecord, Changelog};

// batch module - many source units on a worker pool
use rectify::batch::{
    process_unit, run_batch, BatchReport, BatchSummary, SourceUnit, UnitOutcome, UnitRun,
    UnitStatus,
};

// collab module - external collaborator contracts
use rectify::collab::{DiffFormatter, Frontend, Parser, Printer, ScopeResolver};

// diff module - diff formatters
use rectify::diff::{MarkdownDiffFormatter, UnifiedDiffFormatter};

// report module - markdown reports
use rectify::report::{
    describe_registry, detect_category, group_by_category, slugify, Reporter, UNCATEGORIZED,
};

// config module - rectify.toml
use rectify::config::{
    CliOverrides, Config, EngineOptions, PathsConfig, RuleSpec, CONFIG_FILE_NAME,
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_PASSES,
};

// error module - error types and codes
use rectify::error::{EngineError, OutputErrorCode, SyntaxError};

// output module - JSON output types
use rectify::output::{
    content_hash, emit_response, BatchResponse, ChangeInfo, ErrorInfo, ErrorResponse,
    UnitReport, SCHEMA_VERSION,
};

// ============================================================================
// PHP Adapter
// ============================================================================

use rectify::php::builders::{BRACED, RESOLVED_TYPE, SCOPE};
use rectify::php::parser::to_wire;
use rectify::php::rules::{
    build_registry, builtin_catalog, catalog_registry, find, AddInterfaceByParent,
    ArrayShapeFromConstantArrayReturn, CatalogEntry, RuleFactory,
    WrapVariableVariableNameInCurlyBraces,
};
use rectify::php::{frontend, DeclarationScopeResolver, JsonAstParser, PhpPrinter};

// ============================================================================
// Front Door
// ============================================================================

use rectify::cli::{
    collect_inputs, exit_code, load_config, run_describe, run_process, InputFile, OutputFormat,
    ProcessOptions,
};

/// Verify that key types are accessible and the collaborators are object safe.
#[test]
fn api_surface_compiles() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RuleRegistry>();
    assert_send_sync::<Node>();

    let _parser: &dyn Parser = &JsonAstParser;
    let _printer: &dyn Printer = &PhpPrinter;
    let _resolver: &dyn ScopeResolver = &DeclarationScopeResolver;
    let _differ: &dyn DiffFormatter = &MarkdownDiffFormatter;
    let _rule: Box<dyn Rule> = Box::new(WrapVariableVariableNameInCurlyBraces);
    let _frontend: Frontend<'static> = frontend();
}
