//! sqltree_scanner: Lexer for query text.
//!
//! Produces tokens with byte offsets from query text, covering:
//! - Keywords and case-folded identifiers (quoted identifiers kept verbatim)
//! - Nested block comments and line comments
//! - Standard, escape, bit, hex, and dollar-quoted string literals
//! - Integer, decimal, and real numbers with radix prefixes and separators
//! - Operators and `$n` parameters

mod keywords;
mod scanner;
mod token;

pub use keywords::{lookup_keyword, Keyword, KeywordCategory};
pub use scanner::{ScanOptions, Scanner, NAMEDATALEN};
pub use token::{Token, TokenKind};
