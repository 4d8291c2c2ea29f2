//! sqltree_diagnostics: Diagnostic messages and error reporting infrastructure.
//!
//! Diagnostics are non-fatal notes produced while scanning, parsing, or
//! walking a tree (nonstandard string escapes, unrecognized node kinds).
//! Fatal conditions are [`Error`] values propagated with `?` up to the
//! per-call boundary, which turns them into an [`ErrorInfo`].
//!
//! Message texts and SQLSTATE codes follow the PostgreSQL server so tools
//! built on top can match on them.

pub mod error;
pub mod sink;

pub use error::{Error, ErrorCategory, ErrorInfo, Result, Severity};

use serde::Serialize;
use sqltree_core::Location;
use std::fmt;

/// Diagnostic category, matching the server's message severities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Notice,
    Warning,
    Error,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Notice => write!(f, "notice"),
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic message template with a SQLSTATE code and category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// Five-character SQLSTATE (e.g. `42601`).
    pub code: &'static str,
    /// The category of this diagnostic.
    pub category: DiagnosticCategory,
    /// The message template string. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with resolved message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    #[serde(rename = "message")]
    pub message_text: String,
    #[serde(rename = "sqlstate")]
    pub code: &'static str,
    pub category: DiagnosticCategory,
    /// Byte offset the diagnostic refers to, or unknown.
    pub location: Location,
}

impl Diagnostic {
    /// Create a new diagnostic without location info.
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
            location: Location::UNKNOWN,
        }
    }

    /// Create a new diagnostic pointing at a source offset.
    pub fn with_location(location: Location, message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            location,
            ..Self::new(message, args)
        }
    }

    /// Whether this is an error diagnostic.
    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.category, self.code, self.message_text)?;
        if let Some(offset) = self.location.offset() {
            write!(f, " (at offset {})", offset)?;
        }
        Ok(())
    }
}

/// Format a diagnostic message template by replacing `{0}`, `{1}`, etc. with
/// arguments. Substituted text is never rescanned, and placeholders without a
/// matching argument are kept as written.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let arg = after.find('}').and_then(|close| {
            let index: usize = after[..close].parse().ok()?;
            Some((args.get(index)?, close))
        });
        match arg {
            Some((arg, close)) => {
                result.push_str(arg);
                rest = &after[close + 1..];
            }
            None => {
                result.push('{');
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
        ($code:expr, Notice, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Notice, message: $msg }
        };
    }

    // ========================================================================
    // Lexical errors
    // ========================================================================
    pub const UNTERMINATED_QUOTED_STRING: DiagnosticMessage = diag!("42601", Error, "unterminated quoted string at or near \"{0}\"");
    pub const UNTERMINATED_QUOTED_IDENTIFIER: DiagnosticMessage = diag!("42601", Error, "unterminated quoted identifier at or near \"{0}\"");
    pub const UNTERMINATED_DOLLAR_QUOTE: DiagnosticMessage = diag!("42601", Error, "unterminated dollar-quoted string at or near \"{0}\"");
    pub const UNTERMINATED_COMMENT: DiagnosticMessage = diag!("42601", Error, "unterminated /* comment at or near \"{0}\"");
    pub const UNTERMINATED_BIT_STRING: DiagnosticMessage = diag!("42601", Error, "unterminated bit string literal at or near \"{0}\"");
    pub const UNTERMINATED_HEX_STRING: DiagnosticMessage = diag!("42601", Error, "unterminated hexadecimal string literal at or near \"{0}\"");
    pub const ZERO_LENGTH_DELIMITED_IDENTIFIER: DiagnosticMessage = diag!("42601", Error, "zero-length delimited identifier at or near \"{0}\"");
    pub const TRAILING_JUNK_AFTER_NUMERIC_LITERAL: DiagnosticMessage = diag!("42601", Error, "trailing junk after numeric literal at or near \"{0}\"");
    pub const TRAILING_JUNK_AFTER_PARAMETER: DiagnosticMessage = diag!("42601", Error, "trailing junk after parameter at or near \"{0}\"");
    pub const INVALID_HEXADECIMAL_INTEGER: DiagnosticMessage = diag!("42601", Error, "invalid hexadecimal integer at or near \"{0}\"");
    pub const INVALID_OCTAL_INTEGER: DiagnosticMessage = diag!("42601", Error, "invalid octal integer at or near \"{0}\"");
    pub const INVALID_BINARY_INTEGER: DiagnosticMessage = diag!("42601", Error, "invalid binary integer at or near \"{0}\"");
    pub const UNSAFE_USE_OF_BACKSLASH_QUOTE: DiagnosticMessage = diag!("22P06", Error, "unsafe use of \\' in a string literal");

    // ========================================================================
    // Grammar errors
    // ========================================================================
    pub const SYNTAX_ERROR_AT_OR_NEAR: DiagnosticMessage = diag!("42601", Error, "syntax error at or near \"{0}\"");
    pub const SYNTAX_ERROR_AT_END_OF_INPUT: DiagnosticMessage = diag!("42601", Error, "syntax error at end of input");
    pub const WRONG_NUMBER_OF_PARAMETERS: DiagnosticMessage = diag!("42601", Error, "wrong number of parameters on left side of OVERLAPS expression");
    pub const MULTIPLE_ORDER_BY_CLAUSES: DiagnosticMessage = diag!("42601", Error, "multiple ORDER BY clauses not allowed");
    pub const MULTIPLE_LIMIT_CLAUSES: DiagnosticMessage = diag!("42601", Error, "multiple LIMIT clauses not allowed");
    pub const MULTIPLE_OFFSET_CLAUSES: DiagnosticMessage = diag!("42601", Error, "multiple OFFSET clauses not allowed");
    pub const MULTIPLE_WITH_CLAUSES: DiagnosticMessage = diag!("42601", Error, "multiple WITH clauses not allowed");
    pub const FRAME_START_CANNOT_BE_UNBOUNDED_FOLLOWING: DiagnosticMessage = diag!("42P20", Error, "frame start cannot be UNBOUNDED FOLLOWING");
    pub const FRAME_END_CANNOT_BE_UNBOUNDED_PRECEDING: DiagnosticMessage = diag!("42P20", Error, "frame end cannot be UNBOUNDED PRECEDING");
    pub const FRAME_CURRENT_ROW_CANNOT_HAVE_PRECEDING_ROWS: DiagnosticMessage = diag!("42P20", Error, "frame starting from current row cannot have preceding rows");
    pub const FRAME_FOLLOWING_ROW_CANNOT_END_WITH_CURRENT_ROW: DiagnosticMessage = diag!("42P20", Error, "frame starting from following row cannot end with current row");
    pub const FRAME_FOLLOWING_ROW_CANNOT_HAVE_PRECEDING_ROWS: DiagnosticMessage = diag!("42P20", Error, "frame starting from following row cannot have preceding rows");
    pub const WITH_TIES_WITHOUT_ORDER_BY: DiagnosticMessage = diag!("42601", Error, "WITH TIES cannot be specified without ORDER BY clause");
    pub const IMPROPER_QUALIFIED_NAME: DiagnosticMessage = diag!("42601", Error, "improper qualified name (too many dotted names): {0}");
    pub const WRONG_NUMBER_OF_PARAMETERS_RIGHT: DiagnosticMessage = diag!("42601", Error, "wrong number of parameters on right side of OVERLAPS expression");
    pub const FLOAT_PRECISION_TOO_SMALL: DiagnosticMessage = diag!("22023", Error, "precision for type float must be at least 1 bit");
    pub const FLOAT_PRECISION_TOO_LARGE: DiagnosticMessage = diag!("22023", Error, "precision for type float must be less than 54 bits");
    pub const ROW_VALUE_MISMATCH: DiagnosticMessage = diag!("42601", Error, "number of columns does not match number of values");

    // ========================================================================
    // Resource and internal errors
    // ========================================================================
    pub const STACK_DEPTH_LIMIT_EXCEEDED: DiagnosticMessage = diag!("54001", Error, "stack depth limit exceeded");
    pub const INTERNAL_ERROR: DiagnosticMessage = diag!("XX000", Error, "{0}");
    pub const UNEXPECTED_NODE_KIND: DiagnosticMessage = diag!("XX000", Error, "unexpected node type {0} where {1} was expected");

    // ========================================================================
    // Warnings and notices
    // ========================================================================
    pub const NONSTANDARD_USE_OF_ESCAPE: DiagnosticMessage = diag!("22P06", Warning, "nonstandard use of escape in a string literal");
    pub const NONSTANDARD_USE_OF_BACKSLASH_QUOTE: DiagnosticMessage = diag!("22P06", Warning, "nonstandard use of \\' in a string literal");
    pub const NONSTANDARD_USE_OF_DOUBLE_BACKSLASH: DiagnosticMessage = diag!("22P06", Warning, "nonstandard use of \\\\ in a string literal");
    pub const UNRECOGNIZED_NODE_TYPE: DiagnosticMessage = diag!("01000", Warning, "unrecognized node type: {0}");
    pub const IDENTIFIER_WILL_BE_TRUNCATED: DiagnosticMessage = diag!("42622", Notice, "identifier \"{0}\" will be truncated to \"{1}\"");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message_placeholders() {
        let d = Diagnostic::new(&messages::SYNTAX_ERROR_AT_OR_NEAR, &["SELEC"]);
        assert_eq!(d.message_text, "syntax error at or near \"SELEC\"");
        assert_eq!(d.code, "42601");
        assert!(d.is_error());
    }

    #[test]
    fn test_format_message_single_pass() {
        assert_eq!(format_message("{0} and {1}", &["{1}", "b"]), "{1} and b");
        assert_eq!(format_message("{1}{0}", &["x", "y"]), "yx");
        assert_eq!(format_message("{2} {x} {", &["a"]), "{2} {x} {");
    }

    #[test]
    fn test_display_includes_offset() {
        let d = Diagnostic::with_location(Location(4), &messages::NONSTANDARD_USE_OF_ESCAPE, &[]);
        assert_eq!(
            d.to_string(),
            "warning 22P06: nonstandard use of escape in a string literal (at offset 4)"
        );
    }
}
