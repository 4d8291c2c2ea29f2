//! Scanner integration tests.
//!
//! Verifies that the scanner tokenizes the lexical forms of query text and
//! reports lexical errors with the offending offset.

use sqltree_diagnostics::{sink, Error};
use sqltree_scanner::{Keyword, ScanOptions, Scanner, TokenKind};

/// Helper: scan all tokens and return (kind, value) pairs, `Eof` excluded.
fn scan_all(source: &str) -> Vec<(TokenKind, String)> {
    scan_with(source, ScanOptions::default())
}

fn scan_with(source: &str, options: ScanOptions) -> Vec<(TokenKind, String)> {
    let mut tokens = Scanner::tokenize(source, options).unwrap();
    assert_eq!(tokens.pop().map(|t| t.kind), Some(TokenKind::Eof));
    tokens.into_iter().map(|t| (t.kind, t.value)).collect()
}

/// Helper: scan all token kinds.
fn scan_kinds(source: &str) -> Vec<TokenKind> {
    scan_all(source).into_iter().map(|(k, _)| k).collect()
}

/// Helper: the error produced by scanning `source`.
fn scan_error(source: &str) -> (String, usize) {
    match Scanner::tokenize(source, ScanOptions::default()) {
        Err(Error::Syntax { message, cursor, .. }) => (message, cursor),
        other => panic!("expected a syntax error, got {other:?}"),
    }
}

// ============================================================================
// Trivia
// ============================================================================

#[test]
fn test_empty_source() {
    assert!(scan_all("").is_empty());
}

#[test]
fn test_whitespace_and_comments_only() {
    assert!(scan_all("  \n\t -- line comment\n /* block /* nested */ */ ").is_empty());
}

#[test]
fn test_unterminated_comment() {
    let (message, cursor) = scan_error("SELECT /* open");
    assert_eq!(message, "unterminated /* comment at or near \"/* open\"");
    assert_eq!(cursor, 7);
}

// ============================================================================
// Identifiers and keywords
// ============================================================================

#[test]
fn test_keywords_are_case_insensitive() {
    assert_eq!(
        scan_kinds("SeLeCt from"),
        vec![TokenKind::Keyword(Keyword::Select), TokenKind::Keyword(Keyword::From)]
    );
}

#[test]
fn test_identifiers_are_folded() {
    let tokens = scan_all("MyTable _x1 a$b");
    assert_eq!(tokens[0], (TokenKind::Ident, "mytable".to_string()));
    assert_eq!(tokens[1], (TokenKind::Ident, "_x1".to_string()));
    assert_eq!(tokens[2], (TokenKind::Ident, "a$b".to_string()));
}

#[test]
fn test_quoted_identifier_keeps_case_and_doubles_quotes() {
    let tokens = scan_all(r#""My""Table" "select""#);
    assert_eq!(tokens[0], (TokenKind::Ident, "My\"Table".to_string()));
    assert_eq!(tokens[1], (TokenKind::Ident, "select".to_string()));
}

#[test]
fn test_zero_length_quoted_identifier() {
    let (message, cursor) = scan_error(r#"SELECT """#);
    assert_eq!(message, "zero-length delimited identifier at or near \"\"\"\"");
    assert_eq!(cursor, 7);
}

#[test]
fn test_unicode_identifier() {
    let tokens = scan_all("café");
    assert_eq!(tokens, vec![(TokenKind::Ident, "café".to_string())]);
}

#[test]
fn test_long_identifier_is_truncated_with_notice() {
    let name = "a".repeat(70);
    let capture = sink::capture();
    let tokens = scan_all(&name);
    let diagnostics = capture.finish();
    assert_eq!(tokens[0].1.len(), 63);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, "42622");
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn test_numeric_literals() {
    let tokens = scan_all("42 3.14 .5 1e10 2.5E-3 1_000");
    let kinds: Vec<_> = tokens.iter().map(|(k, _)| *k).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::IConst,
            TokenKind::FConst,
            TokenKind::FConst,
            TokenKind::FConst,
            TokenKind::FConst,
            TokenKind::IConst
        ]
    );
    assert_eq!(tokens[1].1, "3.14");
}

#[test]
fn test_integer_values() {
    let tokens = Scanner::tokenize("1_000 0x1F 0o17 0b101", ScanOptions::default()).unwrap();
    let values: Vec<i32> = tokens[..4].iter().map(|t| t.ival).collect();
    assert_eq!(values, vec![1000, 31, 15, 5]);
}

#[test]
fn test_large_integer_becomes_float() {
    let tokens = scan_all("2147483648 2147483647");
    assert_eq!(tokens[0].0, TokenKind::FConst);
    assert_eq!(tokens[0].1, "2147483648");
    assert_eq!(tokens[1].0, TokenKind::IConst);
}

#[test]
fn test_trailing_junk_after_number() {
    let (message, cursor) = scan_error("SELECT 123abc");
    assert_eq!(message, "trailing junk after numeric literal at or near \"123abc\"");
    assert_eq!(cursor, 7);
}

#[test]
fn test_invalid_hex_integer() {
    let (message, _) = scan_error("SELECT 0x");
    assert_eq!(message, "invalid hexadecimal integer at or near \"0x\"");
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_standard_string_keeps_backslashes() {
    let tokens = scan_all(r"'it''s \n'");
    assert_eq!(tokens, vec![(TokenKind::SConst, r"it's \n".to_string())]);
}

#[test]
fn test_escape_string() {
    let tokens = scan_all(r"E'tab\there\x41\101é'");
    assert_eq!(tokens[0].1, "tab\there\u{41}Aé");
}

#[test]
fn test_string_continuation_across_newline() {
    let tokens = scan_all("'foo'\n  'bar'");
    assert_eq!(tokens, vec![(TokenKind::SConst, "foobar".to_string())]);
}

#[test]
fn test_adjacent_strings_without_newline_do_not_merge() {
    assert_eq!(scan_kinds("'a' 'b'"), vec![TokenKind::SConst, TokenKind::SConst]);
}

#[test]
fn test_unterminated_string() {
    let (message, cursor) = scan_error("SELECT 'abc");
    assert_eq!(message, "unterminated quoted string at or near \"'abc\"");
    assert_eq!(cursor, 7);
}

#[test]
fn test_bit_and_hex_strings() {
    let tokens = scan_all("B'1010' x'1F'");
    assert_eq!(tokens[0], (TokenKind::BConst, "b1010".to_string()));
    assert_eq!(tokens[1], (TokenKind::XConst, "x1F".to_string()));
}

#[test]
fn test_dollar_quoted_strings() {
    let tokens = scan_all("$$it's$$ $fn$ a $$ b $fn$");
    assert_eq!(tokens[0], (TokenKind::SConst, "it's".to_string()));
    assert_eq!(tokens[1], (TokenKind::SConst, " a $$ b ".to_string()));
}

#[test]
fn test_unterminated_dollar_quote() {
    let (message, cursor) = scan_error("SELECT $x$ abc");
    assert!(message.starts_with("unterminated dollar-quoted string"));
    assert_eq!(cursor, 7);
}

#[test]
fn test_nonstandard_strings_warn_once_per_literal() {
    let options = ScanOptions {
        standard_conforming_strings: false,
        ..ScanOptions::default()
    };
    let capture = sink::capture();
    let tokens = scan_with(r"'a\nb\tc' 'plain'", options);
    let diagnostics = capture.finish();
    assert_eq!(tokens[0].1, "a\nb\tc");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message_text, "nonstandard use of escape in a string literal");
    assert_eq!(diagnostics[0].location.0, 0);
}

#[test]
fn test_backslash_quote_rejected_when_disabled() {
    let options = ScanOptions {
        backslash_quote: false,
        ..ScanOptions::default()
    };
    match Scanner::tokenize(r"SELECT E'a\'b'", options) {
        Err(Error::Syntax { code, cursor, .. }) => {
            assert_eq!(code, "22P06");
            assert_eq!(cursor, 10);
        }
        other => panic!("expected an error, got {other:?}"),
    }
}

// ============================================================================
// Operators and punctuation
// ============================================================================

#[test]
fn test_punctuation_and_special_operators() {
    assert_eq!(
        scan_kinds("( ) , ; [ ] . :: := => <= >= <> != :"),
        vec![
            TokenKind::Char(b'('),
            TokenKind::Char(b')'),
            TokenKind::Char(b','),
            TokenKind::Char(b';'),
            TokenKind::Char(b'['),
            TokenKind::Char(b']'),
            TokenKind::Char(b'.'),
            TokenKind::Typecast,
            TokenKind::ColonEquals,
            TokenKind::EqualsGreater,
            TokenKind::LessEquals,
            TokenKind::GreaterEquals,
            TokenKind::NotEquals,
            TokenKind::NotEquals,
            TokenKind::Char(b':'),
        ]
    );
}

#[test]
fn test_multi_char_operator() {
    let tokens = scan_all("a ->> 'k' || b");
    assert_eq!(tokens[1], (TokenKind::Op, "->>".to_string()));
    assert_eq!(tokens[3], (TokenKind::Op, "||".to_string()));
}

#[test]
fn test_parameters() {
    let tokens = Scanner::tokenize("$1 + $23", ScanOptions::default()).unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Param);
    assert_eq!(tokens[0].ival, 1);
    assert_eq!(tokens[2].ival, 23);
}

#[test]
fn test_trailing_junk_after_parameter() {
    let (message, _) = scan_error("SELECT $1abc");
    assert_eq!(message, "trailing junk after parameter at or near \"$1abc\"");
}

#[test]
fn test_token_offsets() {
    let tokens = Scanner::tokenize("SELECT  a", ScanOptions::default()).unwrap();
    assert_eq!((tokens[0].start, tokens[0].end), (0, 6));
    assert_eq!((tokens[1].start, tokens[1].end), (8, 9));
    assert_eq!((tokens[2].start, tokens[2].end), (9, 9));
}
