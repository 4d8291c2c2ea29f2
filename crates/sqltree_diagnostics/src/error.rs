//! Fatal errors and their structured, host-facing form.

use crate::{format_message, messages, DiagnosticMessage};
use serde::Serialize;
use sqltree_core::StackDepthExceeded;
use std::fmt;

/// A condition that aborts the current parse.
///
/// Raised anywhere in the scanner, parser, or tree passes and propagated
/// with `?` to the call boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Malformed input. `cursor` is the byte offset of the offending token.
    #[error("{message}")]
    Syntax {
        message: String,
        cursor: usize,
        code: &'static str,
    },
    /// The recursion ceiling was exceeded.
    #[error(transparent)]
    StackDepth(#[from] StackDepthExceeded),
    /// A broken internal invariant, never expected for any input.
    #[error("{0}")]
    Internal(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// A syntax-class error built from a message template.
    pub fn syntax(message: &DiagnosticMessage, args: &[&str], cursor: usize) -> Self {
        Error::Syntax {
            message: format_message(message.message, args),
            cursor,
            code: message.code,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal(message.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Syntax { .. } => ErrorCategory::Syntax,
            Error::StackDepth(_) => ErrorCategory::Resource,
            Error::Internal(_) => ErrorCategory::Internal,
        }
    }

    pub fn sqlstate(&self) -> &'static str {
        match self {
            Error::Syntax { code, .. } => code,
            Error::StackDepth(_) => messages::STACK_DEPTH_LIMIT_EXCEEDED.code,
            Error::Internal(_) => messages::INTERNAL_ERROR.code,
        }
    }

    /// Byte offset the error points at, when it has one.
    pub fn cursor(&self) -> Option<usize> {
        match self {
            Error::Syntax { cursor, .. } => Some(*cursor),
            _ => None,
        }
    }
}

/// Severity of a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// The input could not be parsed.
    Error,
    /// The library itself failed (broken invariant or panic).
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// What kind of failure an [`ErrorInfo`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Syntax,
    Resource,
    Internal,
}

/// Structured description of a failed parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{severity}: {message}")]
pub struct ErrorInfo {
    pub message: String,
    /// 0-based byte offset into the query text.
    pub cursor_offset: Option<usize>,
    pub severity: Severity,
    pub category: ErrorCategory,
    pub sqlstate: &'static str,
}

impl ErrorInfo {
    /// Describe a panic caught at the call boundary.
    pub fn from_panic(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cursor_offset: None,
            severity: Severity::Fatal,
            category: ErrorCategory::Internal,
            sqlstate: messages::INTERNAL_ERROR.code,
        }
    }
}

impl From<&Error> for ErrorInfo {
    fn from(err: &Error) -> Self {
        let category = err.category();
        Self {
            message: err.to_string(),
            cursor_offset: err.cursor(),
            severity: match category {
                ErrorCategory::Internal => Severity::Fatal,
                _ => Severity::Error,
            },
            category,
            sqlstate: err.sqlstate(),
        }
    }
}

impl From<Error> for ErrorInfo {
    fn from(err: Error) -> Self {
        ErrorInfo::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_info() {
        let err = Error::syntax(&messages::SYNTAX_ERROR_AT_OR_NEAR, &["SELEC"], 0);
        let info = ErrorInfo::from(err);
        assert_eq!(info.message, "syntax error at or near \"SELEC\"");
        assert_eq!(info.cursor_offset, Some(0));
        assert_eq!(info.severity, Severity::Error);
        assert_eq!(info.category, ErrorCategory::Syntax);
        assert_eq!(info.sqlstate, "42601");
    }

    #[test]
    fn test_stack_depth_is_resource() {
        let err: Error = StackDepthExceeded {
            depth: 501,
            limit: 500,
            stack_used: 4096,
        }
        .into();
        let info = ErrorInfo::from(&err);
        assert_eq!(info.message, "stack depth limit exceeded");
        assert_eq!(info.category, ErrorCategory::Resource);
        assert_eq!(info.sqlstate, "54001");
        assert_eq!(info.cursor_offset, None);
    }

    #[test]
    fn test_internal_is_fatal() {
        let info = ErrorInfo::from(Error::internal("scope exited twice"));
        assert_eq!(info.severity, Severity::Fatal);
        assert_eq!(info.to_string(), "FATAL: scope exited twice");
    }
}
