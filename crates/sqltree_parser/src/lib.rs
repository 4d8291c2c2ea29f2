//! sqltree_parser: Recursive descent parser for query text.
//!
//! Parses the token stream from the scanner into a raw syntax tree allocated
//! in the caller's arena. [`RawParser`] is the seam the parse entry point
//! calls through; [`SqlParser`] is the built-in implementation.

mod dml;
mod expression;
mod parser;
mod precedence;
mod select;
mod typename;
mod utilities;

pub use parser::Parser;
pub use utilities::utility_statement_name;

use sqltree_ast::NodeList;
use sqltree_core::ArenaContext;
use sqltree_diagnostics::Result;
use sqltree_options::ParseOptions;
use sqltree_scanner::{ScanOptions, Scanner};

/// Turns query text into a raw tree.
///
/// In the default mode the result is a list of `RawStmt` nodes, one per
/// statement. Fatal conditions are returned as errors; non-fatal ones are
/// reported through `sqltree_diagnostics::sink`.
pub trait RawParser {
    fn parse<'a>(&self, text: &str, options: &ParseOptions, arena: &ArenaContext<'a>) -> Result<NodeList<'a>>;
}

/// The built-in raw parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlParser;

impl RawParser for SqlParser {
    fn parse<'a>(&self, text: &str, options: &ParseOptions, arena: &ArenaContext<'a>) -> Result<NodeList<'a>> {
        let tokens = Scanner::tokenize(text, ScanOptions::from(options))?;
        tracing::trace!(tokens = tokens.len(), mode = %options.mode, "scanned");
        Parser::new(text, tokens, options.mode, arena).parse()
    }
}

impl<P: RawParser + ?Sized> RawParser for &P {
    fn parse<'a>(&self, text: &str, options: &ParseOptions, arena: &ArenaContext<'a>) -> Result<NodeList<'a>> {
        (**self).parse(text, options, arena)
    }
}
