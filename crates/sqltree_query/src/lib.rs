//! sqltree_query: The parse entry point.
//!
//! [`parse`] turns query text into a [`ParseResult`] without ever letting a
//! failure escape into the caller. The raw parse and the post-processing
//! passes run inside [`trap::guarded_call`], in a fresh arena scope that is
//! released when the call ends. The tree borrows that scope, so it is
//! handed to a consumer closure instead of being returned.
//!
//! ```ignore
//! let count = sqltree_query::parse("SELECT 1; SELECT 2", &ParseOptions::default(), |result| {
//!     result.statements().count()
//! });
//! ```

pub mod passes;
pub mod trap;

pub use sqltree_options::{OptionsError, ParseMode, ParseOptions};
pub use sqltree_parser::{RawParser, SqlParser};

use rayon::prelude::*;
use serde::Serialize;
use sqltree_ast::{Node, NodeList, RawStmt};
use sqltree_core::{ArenaContext, MemoryScope};
use sqltree_diagnostics::{sink, Diagnostic, ErrorInfo, Result};
use trap::Trapped;

/// Outcome of one parse call.
///
/// On failure `tree` is empty and `error` is set; diagnostics reported
/// before the failure are kept either way.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult<'a> {
    pub tree: NodeList<'a>,
    pub diagnostics: Vec<Diagnostic>,
    pub error: Option<ErrorInfo>,
}

impl<'a> ParseResult<'a> {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// The top-level statements, in source order.
    pub fn statements(&self) -> impl Iterator<Item = &'a RawStmt<'a>> {
        let tree = self.tree;
        tree.iter().filter_map(|node| node.downcast::<RawStmt>())
    }
}

/// Byte range of one top-level statement in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatementSpan {
    pub offset: usize,
    pub length: usize,
}

impl StatementSpan {
    /// A zero `stmt_len` means the statement runs to the end of the text.
    pub fn of(raw: &RawStmt<'_>, text_len: usize) -> Self {
        let offset = raw.stmt_location.offset().unwrap_or(0).min(text_len);
        let length = match usize::try_from(raw.stmt_len) {
            Ok(len) if len > 0 => len,
            _ => text_len - offset,
        };
        Self { offset, length }
    }

    /// The statement's text. Empty if the span does not fit `source`.
    pub fn text<'t>(&self, source: &'t str) -> &'t str {
        source.get(self.offset..self.offset + self.length).unwrap_or("")
    }
}

/// Owned digest of a [`ParseResult`] that outlives the call's arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseSummary {
    pub statements: Vec<StatementSummary>,
    pub diagnostics: Vec<Diagnostic>,
    pub error: Option<ErrorInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementSummary {
    /// Kind name of the statement, or the producer's name for an
    /// unrecognized one.
    pub kind: String,
    pub span: StatementSpan,
}

impl ParseSummary {
    pub fn from_result(result: &ParseResult<'_>, text: &str) -> Self {
        let statements = result
            .tree
            .iter()
            .map(|&node| match node {
                Node::RawStmt(raw) => StatementSummary {
                    kind: kind_name(raw.stmt),
                    span: StatementSpan::of(raw, text.len()),
                },
                other => StatementSummary {
                    kind: kind_name(other),
                    span: StatementSpan {
                        offset: 0,
                        length: text.len(),
                    },
                },
            })
            .collect();
        Self {
            statements,
            diagnostics: result.diagnostics.clone(),
            error: result.error.clone(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

fn kind_name(node: Node<'_>) -> String {
    match node {
        Node::Unrecognized(n) => n.name.to_string(),
        other => other.tag().name().to_string(),
    }
}

// ============================================================================
// QueryParser
// ============================================================================

/// A raw parser bound to a set of options.
///
/// Holds no per-call state, so one instance can serve any number of threads
/// at once.
#[derive(Debug, Clone, Default)]
pub struct QueryParser<P = SqlParser> {
    raw: P,
    options: ParseOptions,
}

impl QueryParser<SqlParser> {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            raw: SqlParser,
            options,
        }
    }

    /// Build from the packed integer option form, rejecting unknown bits.
    pub fn from_bits(bits: u32) -> std::result::Result<Self, OptionsError> {
        Ok(Self::new(ParseOptions::from_bits(bits)?))
    }
}

impl<P: RawParser> QueryParser<P> {
    /// Use a different raw parser behind the same boundary and passes.
    pub fn with_parser(raw: P, options: ParseOptions) -> Self {
        Self { raw, options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse `text` and hand the result to `consumer`.
    ///
    /// The arena scope holding the tree is released once `consumer`
    /// returns, or before it runs when the call failed.
    pub fn parse<R>(&self, text: &str, consumer: impl for<'a> FnOnce(&ParseResult<'a>) -> R) -> R {
        let _span = tracing::debug_span!("parse", bytes = text.len(), mode = %self.options.mode).entered();
        let scope = MemoryScope::new("parse");
        let arena = ArenaContext::new(&scope);
        let Trapped { outcome, diagnostics } =
            trap::guarded_call(self.options.max_stack_depth, || self.run(text, &arena));

        match outcome {
            Ok(tree) => {
                tracing::debug!(
                    statements = tree.len(),
                    diagnostics = diagnostics.len(),
                    bytes = scope.allocated_bytes(),
                    "parse finished"
                );
                let result = ParseResult {
                    tree,
                    diagnostics,
                    error: None,
                };
                let value = consumer(&result);
                drop(result);
                drop(arena);
                scope.release();
                value
            }
            Err(error) => {
                drop(arena);
                scope.release();
                consumer(&ParseResult {
                    tree: &[],
                    diagnostics,
                    error: Some(error),
                })
            }
        }
    }

    fn run<'a>(&self, text: &str, arena: &ArenaContext<'a>) -> Result<NodeList<'a>> {
        let mut tree = self.raw.parse(text, &self.options, arena)?;
        if self.options.resolve_statement_locations {
            // Validation walks the same nodes and reports them itself.
            let _quiet = self.options.validate.then(sink::capture);
            tree = passes::resolve_statement_locations(tree, arena)?;
        }
        if self.options.validate {
            passes::validate(tree)?;
        }
        Ok(tree)
    }

    /// Parse `text` into an owned [`ParseSummary`].
    pub fn summarize(&self, text: &str) -> ParseSummary {
        self.parse(text, |result| ParseSummary::from_result(result, text))
    }

    /// Byte ranges of the top-level statements in `text`.
    pub fn split(&self, text: &str) -> std::result::Result<Vec<StatementSpan>, ErrorInfo> {
        self.parse(text, |result| match &result.error {
            Some(error) => Err(error.clone()),
            None => Ok(result.statements().map(|raw| StatementSpan::of(raw, text.len())).collect()),
        })
    }
}

// ============================================================================
// Free functions
// ============================================================================

/// Parse `text` with `options` and hand the result to `consumer`.
pub fn parse<R>(text: &str, options: &ParseOptions, consumer: impl for<'a> FnOnce(&ParseResult<'a>) -> R) -> R {
    QueryParser::new(options.clone()).parse(text, consumer)
}

/// Byte ranges of the top-level statements in `text`.
pub fn split_statements(text: &str, options: &ParseOptions) -> std::result::Result<Vec<StatementSpan>, ErrorInfo> {
    QueryParser::new(options.clone()).split(text)
}

/// Parse many independent inputs across the rayon thread pool.
///
/// Every input gets its own call boundary and arena on whichever worker
/// picks it up; summaries come back in input order.
pub fn parse_batch<S: AsRef<str> + Sync>(inputs: &[S], options: &ParseOptions) -> Vec<ParseSummary> {
    let parser = QueryParser::new(options.clone());
    let _span = tracing::debug_span!("parse_batch", inputs = inputs.len()).entered();
    inputs.par_iter().map(|text| parser.summarize(text.as_ref())).collect()
}
