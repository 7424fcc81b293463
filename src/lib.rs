//! Rectify: rule-driven source-to-source rewriting.
//!
//! Rules propose rewrites of AST nodes; the engine walks each tree, applies
//! them, and repeats passes until nothing changes. Results come back as a
//! changelog that can be rendered as diffs, JSON or a markdown report.

// Engine - re-exported from rectify-core
pub use rectify_core::ast;
pub use rectify_core::batch;
pub use rectify_core::changelog;
pub use rectify_core::collab;
pub use rectify_core::config;
pub use rectify_core::diff;
pub use rectify_core::error;
pub use rectify_core::fixpoint;
pub use rectify_core::output;
pub use rectify_core::registry;
pub use rectify_core::report;
pub use rectify_core::rule;
pub use rectify_core::traverse;

// Language adapter
pub use rectify_php as php;

// Front door
pub mod cli;
