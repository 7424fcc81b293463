//! Core infrastructure for rectify.
//!
//! This crate provides the language-agnostic rule-application engine:
//! - AST data model with per-kind slot schemas
//! - Rule and rule registry abstractions
//! - Traversal engine and fixpoint controller
//! - Batch runner over a worker pool
//! - Changelog and markdown reporting
//! - Collaborator contracts (parser, resolver, printer, diff formatter)
//! - Configuration, error types and JSON output types

pub mod ast;
pub mod batch;
pub mod changelog;
pub mod collab;
pub mod config;
pub mod diff;
pub mod error;
pub mod fixpoint;
pub mod output;
pub mod registry;
pub mod report;
pub mod rule;
pub mod traverse;
