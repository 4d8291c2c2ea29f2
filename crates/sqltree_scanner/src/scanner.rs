//! The query text scanner.
//!
//! Converts source text into tokens following the server's lexical rules:
//! case-folded identifiers, nested block comments, the string literal family
//! (`'...'`, `E'...'`, `B'...'`, `X'...'`, dollar quoting), numeric literals
//! with radix prefixes and `_` separators, and the operator character rules.
//! Lexical errors are fatal and carry the byte offset of the offending token.

use crate::keywords::lookup_keyword;
use crate::token::{Token, TokenKind};
use memchr::{memchr, memmem};
use sqltree_core::Location;
use sqltree_diagnostics::{messages, sink, Diagnostic, DiagnosticMessage, Error, Result};
use sqltree_options::ParseOptions;
use unicode_xid::UnicodeXID;

/// Identifiers are truncated to this many bytes minus one.
pub const NAMEDATALEN: usize = 64;

/// Dialect switches that change how string literals are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    pub backslash_quote: bool,
    pub standard_conforming_strings: bool,
    pub escape_string_warning: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            backslash_quote: true,
            standard_conforming_strings: true,
            escape_string_warning: true,
        }
    }
}

impl From<&ParseOptions> for ScanOptions {
    fn from(options: &ParseOptions) -> Self {
        Self {
            backslash_quote: options.backslash_quote,
            standard_conforming_strings: options.standard_conforming_strings,
            escape_string_warning: options.escape_string_warning,
        }
    }
}

/// How backslashes inside a quoted string are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escapes {
    /// Backslash is an ordinary character.
    None,
    /// `E'...'`: backslash escapes, silently.
    Extended,
    /// `'...'` with standard-conforming strings off: backslash escapes, with
    /// a warning on the first one.
    Legacy,
}

/// The scanner converts query text into tokens.
pub struct Scanner<'t> {
    text: &'t str,
    bytes: &'t [u8],
    pos: usize,
    options: ScanOptions,
}

impl<'t> Scanner<'t> {
    pub fn new(text: &'t str, options: ScanOptions) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            options,
        }
    }

    /// Scan `text` to the end. The last token is always `Eof`.
    pub fn tokenize(text: &'t str, options: ScanOptions) -> Result<Vec<Token>> {
        let mut scanner = Scanner::new(text, options);
        let mut tokens = Vec::new();
        loop {
            let token = scanner.scan()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    #[inline]
    pub fn text(&self) -> &'t str {
        self.text
    }

    /// Current byte offset.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    // ========================================================================
    // Character access
    // ========================================================================

    #[inline]
    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    /// The character at the current position, decoded.
    fn current_char(&self) -> Option<char> {
        self.text.get(self.pos..).and_then(|rest| rest.chars().next())
    }

    fn error_near(&self, message: &DiagnosticMessage, start: usize, end: usize) -> Error {
        let end = end.min(self.text.len());
        let near = self.text.get(start..end).unwrap_or("");
        Error::syntax(message, &[near], start)
    }

    /// An error quoting everything from `start` to the end of input.
    fn error_rest(&self, message: &DiagnosticMessage, start: usize) -> Error {
        self.error_near(message, start, self.text.len())
    }

    // ========================================================================
    // Core scanning
    // ========================================================================

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) -> Result<()> {
        while let Some(c) = self.peek(0) {
            match c {
                b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C => self.pos += 1,
                b'-' if self.peek(1) == Some(b'-') => {
                    self.pos = match memchr(b'\n', &self.bytes[self.pos..]) {
                        Some(nl) => self.pos + nl + 1,
                        None => self.bytes.len(),
                    };
                }
                b'/' if self.peek(1) == Some(b'*') => self.skip_block_comment()?,
                _ => break,
            }
        }
        Ok(())
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        let start = self.pos;
        self.pos += 2;
        let mut depth = 1usize;
        while depth > 0 {
            match (self.peek(0), self.peek(1)) {
                (None, _) => return Err(self.error_rest(&messages::UNTERMINATED_COMMENT, start)),
                (Some(b'/'), Some(b'*')) => {
                    depth += 1;
                    self.pos += 2;
                }
                (Some(b'*'), Some(b'/')) => {
                    depth -= 1;
                    self.pos += 2;
                }
                _ => self.pos += 1,
            }
        }
        Ok(())
    }

    /// Scan the next token.
    pub fn scan(&mut self) -> Result<Token> {
        self.skip_trivia()?;
        let start = self.pos;
        let Some(c) = self.peek(0) else {
            return Ok(Token::new(TokenKind::Eof, start, start));
        };

        match c {
            b'\'' => {
                let escapes = if self.options.standard_conforming_strings {
                    Escapes::None
                } else {
                    Escapes::Legacy
                };
                self.scan_string(start, escapes)
            }
            b'e' | b'E' if self.peek(1) == Some(b'\'') => {
                self.pos += 1;
                self.scan_string(start, Escapes::Extended)
            }
            b'n' | b'N' if self.peek(1) == Some(b'\'') => {
                self.pos += 1;
                let escapes = if self.options.standard_conforming_strings {
                    Escapes::None
                } else {
                    Escapes::Legacy
                };
                self.scan_string(start, escapes)
            }
            b'b' | b'B' if self.peek(1) == Some(b'\'') => {
                self.scan_bit_string(start, b'b', &messages::UNTERMINATED_BIT_STRING)
            }
            b'x' | b'X' if self.peek(1) == Some(b'\'') => {
                self.scan_bit_string(start, b'x', &messages::UNTERMINATED_HEX_STRING)
            }
            b'"' => self.scan_quoted_identifier(start),
            b'$' => self.scan_dollar(start),
            b'0'..=b'9' => self.scan_number(start),
            b'.' => match self.peek(1) {
                Some(b'0'..=b'9') => self.scan_number(start),
                Some(b'.') => {
                    self.pos += 2;
                    Ok(Token::new(TokenKind::DotDot, start, self.pos))
                }
                _ => {
                    self.pos += 1;
                    Ok(Token::new(TokenKind::Char(b'.'), start, self.pos))
                }
            },
            b':' => {
                let kind = match self.peek(1) {
                    Some(b':') => TokenKind::Typecast,
                    Some(b'=') => TokenKind::ColonEquals,
                    _ => TokenKind::Char(b':'),
                };
                self.pos += if kind == TokenKind::Char(b':') { 1 } else { 2 };
                Ok(Token::new(kind, start, self.pos))
            }
            b',' | b'(' | b')' | b'[' | b']' | b';' => {
                self.pos += 1;
                Ok(Token::new(TokenKind::Char(c), start, self.pos))
            }
            c if is_op_char(c) => self.scan_operator(start),
            _ => match self.current_char() {
                Some(ch) if is_identifier_start(ch) => self.scan_identifier(start),
                Some(ch) => Err(self.error_near(&messages::SYNTAX_ERROR_AT_OR_NEAR, start, start + ch.len_utf8())),
                None => Err(Error::internal("scanner position is not on a character boundary")),
            },
        }
    }

    // ========================================================================
    // Identifiers
    // ========================================================================

    fn scan_identifier(&mut self, start: usize) -> Result<Token> {
        while let Some(ch) = self.current_char() {
            if !is_identifier_part(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
        let word = self.text[start..self.pos].to_ascii_lowercase();
        if let Some(kw) = lookup_keyword(&word) {
            return Ok(Token::new(TokenKind::Keyword(kw), start, self.pos).with_value(word));
        }
        let name = truncate_identifier(word, start);
        Ok(Token::new(TokenKind::Ident, start, self.pos).with_value(name))
    }

    fn scan_quoted_identifier(&mut self, start: usize) -> Result<Token> {
        self.pos += 1;
        let mut name = String::new();
        loop {
            let Some(close) = memchr(b'"', &self.bytes[self.pos..]) else {
                return Err(self.error_rest(&messages::UNTERMINATED_QUOTED_IDENTIFIER, start));
            };
            name.push_str(&self.text[self.pos..self.pos + close]);
            self.pos += close + 1;
            if self.peek(0) == Some(b'"') {
                name.push('"');
                self.pos += 1;
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(self.error_near(&messages::ZERO_LENGTH_DELIMITED_IDENTIFIER, start, self.pos));
        }
        let name = truncate_identifier(name, start);
        Ok(Token::new(TokenKind::Ident, start, self.pos).with_value(name))
    }

    // ========================================================================
    // String literals
    // ========================================================================

    /// Scan a quoted string. `self.pos` is on the opening quote; `start` is
    /// where the token begins (before any `E`/`N` prefix).
    fn scan_string(&mut self, start: usize, escapes: Escapes) -> Result<Token> {
        let mut value: Vec<u8> = Vec::new();
        let mut warned = false;
        loop {
            // on the opening quote of a segment
            self.pos += 1;
            loop {
                let Some(c) = self.peek(0) else {
                    return Err(self.error_rest(&messages::UNTERMINATED_QUOTED_STRING, start));
                };
                match c {
                    b'\'' if self.peek(1) == Some(b'\'') => {
                        value.push(b'\'');
                        self.pos += 2;
                    }
                    b'\'' => {
                        self.pos += 1;
                        break;
                    }
                    b'\\' if escapes != Escapes::None => {
                        if escapes == Escapes::Legacy && self.options.escape_string_warning && !warned {
                            warned = true;
                            self.warn_nonstandard_escape(start);
                        }
                        self.scan_escape(start, &mut value)?;
                    }
                    _ => {
                        value.push(c);
                        self.pos += 1;
                    }
                }
            }
            if !self.at_string_continuation() {
                break;
            }
        }
        let value = String::from_utf8_lossy(&value).into_owned();
        Ok(Token::new(TokenKind::SConst, start, self.pos).with_value(value))
    }

    /// Whether the string just closed continues after whitespace that
    /// contains a newline. On success `self.pos` is on the next opening quote.
    fn at_string_continuation(&mut self) -> bool {
        let mut p = self.pos;
        let mut saw_newline = false;
        while let Some(&c) = self.bytes.get(p) {
            match c {
                b'\n' | b'\r' => saw_newline = true,
                b' ' | b'\t' | 0x0B | 0x0C => {}
                b'\'' if saw_newline => {
                    self.pos = p;
                    return true;
                }
                _ => return false,
            }
            p += 1;
        }
        false
    }

    fn warn_nonstandard_escape(&self, start: usize) {
        let message = match self.peek(1) {
            Some(b'\'') => &messages::NONSTANDARD_USE_OF_BACKSLASH_QUOTE,
            Some(b'\\') => &messages::NONSTANDARD_USE_OF_DOUBLE_BACKSLASH,
            _ => &messages::NONSTANDARD_USE_OF_ESCAPE,
        };
        sink::report(Diagnostic::with_location(Location::new(start), message, &[]));
    }

    /// Decode one backslash escape. `self.pos` is on the backslash.
    fn scan_escape(&mut self, start: usize, value: &mut Vec<u8>) -> Result<()> {
        let backslash = self.pos;
        let Some(c) = self.peek(1) else {
            return Err(self.error_rest(&messages::UNTERMINATED_QUOTED_STRING, start));
        };
        self.pos += 2;
        match c {
            b'b' => value.push(0x08),
            b'f' => value.push(0x0C),
            b'n' => value.push(b'\n'),
            b'r' => value.push(b'\r'),
            b't' => value.push(b'\t'),
            b'v' => value.push(0x0B),
            b'0'..=b'7' => {
                let mut byte = u32::from(c - b'0');
                for _ in 0..2 {
                    match self.peek(0) {
                        Some(d @ b'0'..=b'7') => {
                            byte = byte * 8 + u32::from(d - b'0');
                            self.pos += 1;
                        }
                        _ => break,
                    }
                }
                value.push((byte & 0xFF) as u8);
            }
            b'x' if self.peek(0).is_some_and(|d| d.is_ascii_hexdigit()) => {
                let mut byte = 0u8;
                for _ in 0..2 {
                    match self.peek(0).and_then(hex_value) {
                        Some(d) => {
                            byte = byte * 16 + d;
                            self.pos += 1;
                        }
                        None => break,
                    }
                }
                value.push(byte);
            }
            b'u' | b'U' => {
                let width = if c == b'u' { 4 } else { 8 };
                match self.read_code_point(width) {
                    Some(ch) => {
                        let mut buf = [0u8; 4];
                        value.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                    }
                    None => value.push(c),
                }
            }
            b'\'' => {
                if !self.options.backslash_quote {
                    return Err(Error::syntax(&messages::UNSAFE_USE_OF_BACKSLASH_QUOTE, &[], backslash));
                }
                value.push(b'\'');
            }
            _ => {
                // any other character stands for itself, multi-byte ones included
                let len = self.text[self.pos - 1..].chars().next().map_or(1, char::len_utf8);
                value.extend_from_slice(&self.bytes[self.pos - 1..self.pos - 1 + len]);
                self.pos += len - 1;
            }
        }
        Ok(())
    }

    fn read_code_point(&mut self, width: usize) -> Option<char> {
        let digits = self.text.get(self.pos..self.pos + width)?;
        if !digits.bytes().all(|d| d.is_ascii_hexdigit()) {
            return None;
        }
        let ch = u32::from_str_radix(digits, 16).ok().and_then(char::from_u32)?;
        self.pos += width;
        Some(ch)
    }

    /// `B'...'` and `X'...'`. The value keeps a lower-case prefix letter.
    fn scan_bit_string(&mut self, start: usize, prefix: u8, unterminated: &DiagnosticMessage) -> Result<Token> {
        self.pos += 2;
        let Some(close) = memchr(b'\'', &self.bytes[self.pos..]) else {
            return Err(self.error_rest(unterminated, start));
        };
        let mut value = String::with_capacity(close + 1);
        value.push(prefix as char);
        value.push_str(&self.text[self.pos..self.pos + close]);
        self.pos += close + 1;
        let kind = if prefix == b'b' { TokenKind::BConst } else { TokenKind::XConst };
        Ok(Token::new(kind, start, self.pos).with_value(value))
    }

    // ========================================================================
    // Dollar quotes and parameters
    // ========================================================================

    fn scan_dollar(&mut self, start: usize) -> Result<Token> {
        if self.peek(1).is_some_and(|c| c.is_ascii_digit()) {
            return self.scan_parameter(start);
        }
        let Some(tag_len) = self.dollar_tag_len() else {
            return Err(self.error_near(&messages::SYNTAX_ERROR_AT_OR_NEAR, start, start + 1));
        };
        let delimiter = &self.bytes[start..start + tag_len];
        let body = start + tag_len;
        let Some(close) = memmem::find(&self.bytes[body..], delimiter) else {
            return Err(self.error_rest(&messages::UNTERMINATED_DOLLAR_QUOTE, start));
        };
        let value = self.text[body..body + close].to_string();
        self.pos = body + close + tag_len;
        Ok(Token::new(TokenKind::SConst, start, self.pos).with_value(value))
    }

    /// Length of a `$tag$` opener at the current position, both dollars included.
    fn dollar_tag_len(&self) -> Option<usize> {
        let rest = self.text.get(self.pos + 1..)?;
        for (i, ch) in rest.char_indices() {
            if ch == '$' {
                return Some(i + 2);
            }
            let ok = if i == 0 { is_identifier_start(ch) } else { is_identifier_part(ch) };
            if !ok {
                return None;
            }
        }
        None
    }

    fn scan_parameter(&mut self, start: usize) -> Result<Token> {
        self.pos += 1;
        while self.peek(0).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.current_char().is_some_and(is_identifier_part) {
            self.skip_identifier_chars();
            return Err(self.error_near(&messages::TRAILING_JUNK_AFTER_PARAMETER, start, self.pos));
        }
        let digits = &self.text[start + 1..self.pos];
        let number: i32 = digits
            .parse()
            .map_err(|_| self.error_near(&messages::SYNTAX_ERROR_AT_OR_NEAR, start, self.pos))?;
        Ok(Token::new(TokenKind::Param, start, self.pos)
            .with_value(digits.to_string())
            .with_ival(number))
    }

    // ========================================================================
    // Numbers
    // ========================================================================

    fn scan_number(&mut self, start: usize) -> Result<Token> {
        if self.peek(0) == Some(b'0') {
            let radix = match self.peek(1) {
                Some(b'x' | b'X') => Some((16, &messages::INVALID_HEXADECIMAL_INTEGER)),
                Some(b'o' | b'O') => Some((8, &messages::INVALID_OCTAL_INTEGER)),
                Some(b'b' | b'B') => Some((2, &messages::INVALID_BINARY_INTEGER)),
                _ => None,
            };
            if let Some((radix, invalid)) = radix {
                return self.scan_radix_integer(start, radix, invalid);
            }
        }

        let mut is_float = false;
        self.scan_digits(10);
        if self.peek(0) == Some(b'.') && self.peek(1) != Some(b'.') {
            is_float = true;
            self.pos += 1;
            self.scan_digits(10);
        }
        if matches!(self.peek(0), Some(b'e' | b'E')) {
            let exponent_digits = match self.peek(1) {
                Some(b'+' | b'-') => self.peek(2).is_some_and(|c| c.is_ascii_digit()).then_some(2),
                Some(c) if c.is_ascii_digit() => Some(1),
                _ => None,
            };
            if let Some(skip) = exponent_digits {
                is_float = true;
                self.pos += skip;
                self.scan_digits(10);
            }
        }
        self.check_trailing_junk(start)?;

        let text = &self.text[start..self.pos];
        if !is_float {
            if let Ok(ival) = strip_underscores(text).parse::<i32>() {
                return Ok(Token::new(TokenKind::IConst, start, self.pos)
                    .with_value(text.to_string())
                    .with_ival(ival));
            }
        }
        Ok(Token::new(TokenKind::FConst, start, self.pos).with_value(text.to_string()))
    }

    fn scan_radix_integer(&mut self, start: usize, radix: u32, invalid: &DiagnosticMessage) -> Result<Token> {
        self.pos += 2;
        // a separator may directly follow the prefix
        if self.peek(0) == Some(b'_') && self.peek(1).is_some_and(|c| (c as char).is_digit(radix)) {
            self.pos += 1;
        }
        let digits_start = self.pos;
        self.scan_digits(radix);
        if self.pos == digits_start {
            self.skip_identifier_chars();
            return Err(self.error_near(invalid, start, self.pos));
        }
        self.check_trailing_junk(start)?;

        let text = &self.text[start..self.pos];
        let digits = strip_underscores(&self.text[digits_start..self.pos]);
        match i64::from_str_radix(&digits, radix).ok().and_then(|v| i32::try_from(v).ok()) {
            Some(ival) => Ok(Token::new(TokenKind::IConst, start, self.pos)
                .with_value(text.to_string())
                .with_ival(ival)),
            None => Ok(Token::new(TokenKind::FConst, start, self.pos).with_value(text.to_string())),
        }
    }

    /// Digits with single `_` separators between them.
    fn scan_digits(&mut self, radix: u32) {
        let is_digit = |c: Option<u8>| c.is_some_and(|c| (c as char).is_digit(radix));
        while is_digit(self.peek(0)) {
            self.pos += 1;
            if self.peek(0) == Some(b'_') && is_digit(self.peek(1)) {
                self.pos += 1;
            }
        }
    }

    fn check_trailing_junk(&mut self, start: usize) -> Result<()> {
        if self.current_char().is_some_and(is_identifier_part) {
            self.skip_identifier_chars();
            return Err(self.error_near(&messages::TRAILING_JUNK_AFTER_NUMERIC_LITERAL, start, self.pos));
        }
        Ok(())
    }

    fn skip_identifier_chars(&mut self) {
        while let Some(ch) = self.current_char() {
            if !is_identifier_part(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
    }

    // ========================================================================
    // Operators
    // ========================================================================

    fn scan_operator(&mut self, start: usize) -> Result<Token> {
        let mut end = start;
        while let Some(&c) = self.bytes.get(end) {
            if !is_op_char(c) {
                break;
            }
            // a comment start ends the operator
            if end > start {
                let next = self.bytes.get(end + 1).copied();
                if (c == b'-' && next == Some(b'-')) || (c == b'/' && next == Some(b'*')) {
                    break;
                }
            }
            end += 1;
        }

        // `+` and `-` can only end a multi-character operator that contains
        // one of the characters no built-in expression syntax uses.
        let mut len = end - start;
        if len > 1 {
            let op = &self.bytes[start..end];
            let has_special = op.iter().any(|c| b"~!@#^&|`?%".contains(c));
            if !has_special {
                while len > 1 && matches!(op[len - 1], b'+' | b'-') {
                    len -= 1;
                }
            }
        }
        self.pos = start + len;
        let op = &self.text[start..self.pos];

        let kind = match op {
            "<=" => TokenKind::LessEquals,
            ">=" => TokenKind::GreaterEquals,
            "<>" | "!=" => TokenKind::NotEquals,
            "=>" => TokenKind::EqualsGreater,
            _ if len == 1 && b"+-*/%^<>=".contains(&self.bytes[start]) => TokenKind::Char(self.bytes[start]),
            _ => TokenKind::Op,
        };
        let value = if kind == TokenKind::NotEquals { "<>".to_string() } else { op.to_string() };
        Ok(Token::new(kind, start, self.pos).with_value(value))
    }
}

fn is_op_char(c: u8) -> bool {
    b"~!@#^&|`?+-*/%<>=".contains(&c)
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || (!ch.is_ascii() && UnicodeXID::is_xid_start(ch))
}

fn is_identifier_part(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '$' || (!ch.is_ascii() && UnicodeXID::is_xid_continue(ch))
}

fn hex_value(c: u8) -> Option<u8> {
    (c as char).to_digit(16).map(|d| d as u8)
}

fn strip_underscores(text: &str) -> String {
    text.chars().filter(|c| *c != '_').collect()
}

/// Cut an identifier to `NAMEDATALEN - 1` bytes on a character boundary,
/// with a notice when anything is lost.
fn truncate_identifier(mut name: String, start: usize) -> String {
    if name.len() < NAMEDATALEN {
        return name;
    }
    let mut cut = NAMEDATALEN - 1;
    while !name.is_char_boundary(cut) {
        cut -= 1;
    }
    let truncated = name[..cut].to_string();
    sink::report(Diagnostic::with_location(
        Location::new(start),
        &messages::IDENTIFIER_WILL_BE_TRUNCATED,
        &[&name, &truncated],
    ));
    name.truncate(cut);
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        Scanner::tokenize(text, ScanOptions::default())
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_operator_trailing_minus_is_split() {
        assert_eq!(
            kinds("a*-1"),
            vec![
                TokenKind::Ident,
                TokenKind::Char(b'*'),
                TokenKind::Char(b'-'),
                TokenKind::IConst,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_operator_with_special_char_keeps_minus() {
        let tokens = Scanner::tokenize("a @- b", ScanOptions::default()).unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Op);
        assert_eq!(tokens[1].value, "@-");
    }

    #[test]
    fn test_comment_inside_operator_run() {
        assert_eq!(kinds("1+--x\n2"), vec![TokenKind::IConst, TokenKind::Char(b'+'), TokenKind::IConst, TokenKind::Eof]);
    }

    #[test]
    fn test_integer_range_is_not_float() {
        assert_eq!(
            kinds("1..2"),
            vec![TokenKind::IConst, TokenKind::DotDot, TokenKind::IConst, TokenKind::Eof]
        );
    }

    #[test]
    fn test_dollar_tag_len() {
        let scanner = Scanner::new("$fn$ body $fn$", ScanOptions::default());
        assert_eq!(scanner.dollar_tag_len(), Some(4));
        let scanner = Scanner::new("$$x$$", ScanOptions::default());
        assert_eq!(scanner.dollar_tag_len(), Some(2));
        let scanner = Scanner::new("$a b$", ScanOptions::default());
        assert_eq!(scanner.dollar_tag_len(), None);
    }
}
