//! Contracts of the external collaborators the engine consumes.
//!
//! Parsing, scope/type resolution, printing and diffing live outside the
//! engine. Language adapters implement these traits; the engine only calls
//! them synchronously and consumes their results.

use crate::ast::Node;
use crate::error::SyntaxError;

/// Turns source text into the root node of a source unit.
pub trait Parser: Send + Sync {
    /// Parse one source unit. Nodes of the returned tree carry assigned ids.
    fn parse(&self, source: &str) -> Result<Node, SyntaxError>;
}

/// Attaches analysis attributes (e.g. `scope`, `resolved_type`) to a freshly
/// parsed tree. Rules read them back through the attribute bag.
pub trait ScopeResolver: Send + Sync {
    fn resolve(&self, root: &mut Node);
}

/// Renders a node back to source text. Inverse of [`Parser`].
pub trait Printer: Send + Sync {
    fn print(&self, node: &Node) -> String;
}

/// Produces a plain, uncolored diff of two texts.
pub trait DiffFormatter {
    fn diff(&self, before: &str, after: &str) -> String;
}

/// The parser and optional resolver used to load source units.
#[derive(Clone, Copy)]
pub struct Frontend<'a> {
    pub parser: &'a dyn Parser,
    pub resolver: Option<&'a dyn ScopeResolver>,
}

impl<'a> Frontend<'a> {
    /// A frontend with no resolver.
    pub fn new(parser: &'a dyn Parser) -> Self {
        Frontend {
            parser,
            resolver: None,
        }
    }

    /// Run `resolver` after parsing.
    pub fn with_resolver(mut self, resolver: &'a dyn ScopeResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Parse and resolve one source unit.
    pub fn load(&self, source: &str) -> Result<Node, SyntaxError> {
        let mut root = self.parser.parse(source)?;
        if let Some(resolver) = self.resolver {
            resolver.resolve(&mut root);
        }
        Ok(root)
    }
}
