//! JSON output types for CLI responses.
//!
//! ## Design Principles
//!
//! 1. **Status first:** every response has `status` as its first field
//! 2. **Deterministic:** same input, same output (units in input order,
//!    changes in changelog order)
//! 3. **Versioned:** `schema_version` allows consumers to detect changes

use std::io::{self, Write};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::batch::{BatchReport, BatchSummary, UnitOutcome, UnitStatus};
use crate::changelog::ChangeRecord;
use crate::collab::Printer;
use crate::error::{EngineError, OutputErrorCode, SyntaxError};

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

/// SHA-256 of `text`, hex encoded.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

// ============================================================================
// Batch Response
// ============================================================================

/// One accepted rewrite, as reported to consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeInfo {
    pub rule: String,
    pub pass: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// Slot path from the root, e.g. `/stmts[0]/implements[1]`.
    pub path: String,
    pub removed: bool,
}

impl From<&ChangeRecord> for ChangeInfo {
    fn from(record: &ChangeRecord) -> Self {
        ChangeInfo {
            rule: record.rule.clone(),
            pass: record.pass,
            line: record.location.line,
            path: record.location.path.to_string(),
            removed: record.is_removal(),
        }
    }
}

/// Error information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl ErrorInfo {
    pub fn from_syntax_error(err: &SyntaxError) -> Self {
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.message.clone(),
            line: Some(err.line),
            column: Some(err.column),
        }
    }

    pub fn from_engine_error(err: &EngineError) -> Self {
        ErrorInfo {
            code: err.error_code().code(),
            message: err.to_string(),
            line: None,
            column: None,
        }
    }
}

/// Result of one source unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitReport {
    pub unit: String,
    pub status: UnitStatus,
    pub passes: usize,
    pub changes: Vec<ChangeInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    /// Hash of the printed tree before any rule ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_hash: Option<String>,
    /// Hash of the printed final tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_hash: Option<String>,
}

impl UnitReport {
    pub fn from_outcome(outcome: &UnitOutcome, printer: &dyn Printer) -> Self {
        match &outcome.result {
            Ok(run) => UnitReport {
                unit: outcome.unit.clone(),
                status: outcome.status(),
                passes: run.passes,
                changes: run.changelog.iter().map(ChangeInfo::from).collect(),
                error: None,
                before_hash: Some(content_hash(&printer.print(&run.original))),
                after_hash: Some(content_hash(&printer.print(&run.root))),
            },
            Err(err) => UnitReport {
                unit: outcome.unit.clone(),
                status: UnitStatus::Failed,
                passes: 0,
                changes: Vec::new(),
                error: Some(ErrorInfo::from_syntax_error(err)),
                before_hash: None,
                after_hash: None,
            },
        }
    }
}

/// Response of `rectify process --format json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    pub summary: BatchSummary,
    pub units: Vec<UnitReport>,
}

impl BatchResponse {
    pub fn from_report(report: &BatchReport, printer: &dyn Printer) -> Self {
        BatchResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            summary: report.summary,
            units: report
                .units
                .iter()
                .map(|outcome| UnitReport::from_outcome(outcome, printer))
                .collect(),
        }
    }
}

/// Response for fatal errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &EngineError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_engine_error(err),
        }
    }

    pub fn new(code: OutputErrorCode, message: impl Into<String>) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo {
                code: code.code(),
                message: message.into(),
                line: None,
                column: None,
            },
        }
    }
}

/// Emit a response as pretty-printed JSON.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================
