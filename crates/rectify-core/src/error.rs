//! Error types and error code constants for rectify.
//!
//! ## Error Taxonomy
//!
//! - [`SyntaxError`] comes from the parser and is scoped to one source unit.
//!   The batch runner records it against the unit and keeps going.
//! - [`EngineError`] covers configuration and structural failures. Registry
//!   errors abort before any unit is processed; structural errors raised
//!   during traversal abort the whole batch.
//! - Non-convergence is not an error: see
//!   [`NonConvergenceWarning`](crate::fixpoint::NonConvergenceWarning).
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments or configuration
//! - `3`: Syntax errors in a source unit
//! - `4`: Structural errors (a rule produced an illegal tree)
//! - `10`: Internal errors (I/O, worker pool)

use std::fmt;

use thiserror::Error;

use crate::ast::{NodeId, SchemaViolation};

// ============================================================================
// Output Error Codes
// ============================================================================

/// Stable error codes for JSON output and process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments or configuration.
    InvalidArguments = 2,
    /// A source unit failed to parse.
    SyntaxError = 3,
    /// A rule produced a tree the engine cannot accept.
    StructuralError = 4,
    /// Internal errors (I/O, thread pool).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Syntax Errors
// ============================================================================

/// A source unit could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error in {}: {message} at {line}:{column}", .unit.as_deref().unwrap_or("<input>"))]
pub struct SyntaxError {
    /// Source unit the error belongs to, once known.
    pub unit: Option<String>,
    /// Parser message.
    pub message: String,
    /// 1-indexed line.
    pub line: usize,
    /// 1-indexed column.
    pub column: usize,
}

impl SyntaxError {
    /// Create a syntax error at a position.
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        SyntaxError {
            unit: None,
            message: message.into(),
            line,
            column,
        }
    }

    /// Attach the source unit id.
    pub fn in_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

// ============================================================================
// Engine Errors
// ============================================================================

/// Fatal configuration and structural errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Two rules were registered under the same name.
    #[error("duplicate rule name: {name}")]
    DuplicateRuleName { name: String },

    /// The tree lost its shape: a node reappeared as its own ancestor or the
    /// depth ceiling was hit.
    #[error("structural integrity violated at node {node}: {reason}")]
    StructuralIntegrity { node: NodeId, reason: String },

    /// A rule produced a replacement the surrounding slot cannot hold.
    #[error("rule {rule} produced {found} for slot '{slot}' of {parent}")]
    SlotViolation {
        rule: String,
        parent: String,
        slot: String,
        found: String,
    },

    /// A configuration file named a rule that does not exist.
    #[error("unknown rule: {name}")]
    UnknownRule { name: String },

    /// A rule rejected its configuration.
    #[error("invalid configuration for {rule}: {message}")]
    InvalidConfiguration { rule: String, message: String },

    /// The configuration file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The worker pool could not be created.
    #[error("worker pool error: {0}")]
    WorkerPool(String),
}

impl EngineError {
    /// Create a slot violation error.
    pub fn slot_violation(
        rule: impl Into<String>,
        parent: impl Into<String>,
        slot: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        EngineError::SlotViolation {
            rule: rule.into(),
            parent: parent.into(),
            slot: slot.into(),
            found: found.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(rule: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidConfiguration {
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// Wrap a schema violation found inside a rule's replacement.
    pub fn from_schema(rule: &str, violation: SchemaViolation) -> Self {
        EngineError::SlotViolation {
            rule: rule.to_string(),
            parent: format!("{} {}", violation.kind, violation.node),
            slot: violation.slot,
            found: violation.reason,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

impl From<&EngineError> for OutputErrorCode {
    fn from(err: &EngineError) -> Self {
        match err {
            EngineError::DuplicateRuleName { .. } => OutputErrorCode::InvalidArguments,
            EngineError::UnknownRule { .. } => OutputErrorCode::InvalidArguments,
            EngineError::InvalidConfiguration { .. } => OutputErrorCode::InvalidArguments,
            EngineError::Config(_) => OutputErrorCode::InvalidArguments,
            EngineError::StructuralIntegrity { .. } => OutputErrorCode::StructuralError,
            EngineError::SlotViolation { .. } => OutputErrorCode::StructuralError,
            EngineError::Io(_) => OutputErrorCode::InternalError,
            EngineError::WorkerPool(_) => OutputErrorCode::InternalError,
        }
    }
}

impl From<&SyntaxError> for OutputErrorCode {
    fn from(_: &SyntaxError) -> Self {
        OutputErrorCode::SyntaxError
    }
}

// ============================================================================
// Tests
// ============================================================================
