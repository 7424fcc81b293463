//! PHP language support for rectify.
//!
//! This crate provides the language side of the engine:
//! - A reader for the JSON AST dump of the external PHP parser
//! - A declaration-level scope and type resolver
//! - A PHP pretty printer
//! - Node builders for rules and tests
//! - The built-in rule catalog

pub mod builders;
pub mod parser;
pub mod printer;
pub mod resolver;
pub mod rules;

pub use parser::JsonAstParser;
pub use printer::PhpPrinter;
pub use resolver::DeclarationScopeResolver;

use rectify_core::collab::Frontend;

/// Parser and resolver wired together.
pub fn frontend() -> Frontend<'static> {
    Frontend::new(&JsonAstParser).with_resolver(&DeclarationScopeResolver)
}
