//! Tokens produced by the scanner.

use crate::keywords::Keyword;
use sqltree_core::TextSpan;

/// The kind of a scanned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// End of input.
    Eof,
    /// An identifier, quoted or not.
    Ident,
    /// An unquoted keyword.
    Keyword(Keyword),
    /// An integer that fits in 32 bits.
    IConst,
    /// Any other numeric literal.
    FConst,
    /// A string literal, after escape processing.
    SConst,
    /// `B'...'`
    BConst,
    /// `X'...'`
    XConst,
    /// `$n`
    Param,
    /// A multi-character or otherwise non-punctuation operator.
    Op,
    /// `::`
    Typecast,
    /// `..`
    DotDot,
    /// `:=`
    ColonEquals,
    /// `=>`
    EqualsGreater,
    /// `<=`
    LessEquals,
    /// `>=`
    GreaterEquals,
    /// `<>` or `!=`
    NotEquals,
    /// One of `, ( ) [ ] . ; : + - * / % ^ < > =`.
    Char(u8),
}

/// A scanned token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    /// Identifier name (case-folded unless quoted), processed string
    /// contents, numeric or operator text.
    pub value: String,
    /// Value of an `IConst` or `Param`.
    pub ival: i32,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self {
            kind,
            start,
            end,
            value: String::new(),
            ival: 0,
        }
    }

    pub fn with_value(mut self, value: String) -> Self {
        self.value = value;
        self
    }

    pub fn with_ival(mut self, ival: i32) -> Self {
        self.ival = ival;
        self
    }

    #[inline]
    pub fn span(&self) -> TextSpan {
        TextSpan::from_bounds(self.start, self.end)
    }

    #[inline]
    pub fn is_char(&self, c: u8) -> bool {
        self.kind == TokenKind::Char(c)
    }

    #[inline]
    pub fn is_keyword(&self, kw: Keyword) -> bool {
        self.kind == TokenKind::Keyword(kw)
    }

    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword(kw) => Some(kw),
            _ => None,
        }
    }
}
