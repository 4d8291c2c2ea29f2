//! Per-thread diagnostic sink.
//!
//! Non-fatal diagnostics can be raised from any depth (a string literal deep
//! inside the scanner, an unknown node kind in the middle of a walk) without
//! threading a collection through every call. [`report`] logs the diagnostic
//! and appends it to the innermost active [`Capture`] on the calling thread.
//! Captures nest: finishing or dropping one reinstates the outer buffer.

use crate::{Diagnostic, DiagnosticCategory};
use std::cell::RefCell;
use std::marker::PhantomData;

thread_local! {
    static ACTIVE: RefCell<Option<Vec<Diagnostic>>> = const { RefCell::new(None) };
}

/// Record a non-fatal diagnostic.
pub fn report(diagnostic: Diagnostic) {
    match diagnostic.category {
        DiagnosticCategory::Notice => {
            tracing::info!(sqlstate = diagnostic.code, location = diagnostic.location.0, "{}", diagnostic.message_text)
        }
        DiagnosticCategory::Warning => {
            tracing::warn!(sqlstate = diagnostic.code, location = diagnostic.location.0, "{}", diagnostic.message_text)
        }
        DiagnosticCategory::Error => {
            tracing::debug!(sqlstate = diagnostic.code, location = diagnostic.location.0, "{}", diagnostic.message_text)
        }
    }
    ACTIVE.with(|active| {
        if let Some(buffer) = active.borrow_mut().as_mut() {
            buffer.push(diagnostic);
        }
    });
}

/// Whether a capture is active on the calling thread.
pub fn is_capturing() -> bool {
    ACTIVE.with(|active| active.borrow().is_some())
}

/// Start collecting diagnostics reported on the calling thread.
pub fn capture() -> Capture {
    let previous = ACTIVE.with(|active| active.replace(Some(Vec::new())));
    Capture {
        previous: Some(previous),
        _thread_bound: PhantomData,
    }
}

/// An active diagnostic buffer.
#[must_use = "diagnostics are discarded when the capture is dropped"]
pub struct Capture {
    // `None` once the outer buffer has been reinstated.
    previous: Option<Option<Vec<Diagnostic>>>,
    _thread_bound: PhantomData<*mut ()>,
}

impl Capture {
    /// Stop collecting and return what was reported.
    pub fn finish(mut self) -> Vec<Diagnostic> {
        self.reinstate()
    }

    fn reinstate(&mut self) -> Vec<Diagnostic> {
        match self.previous.take() {
            Some(previous) => ACTIVE
                .with(|active| active.replace(previous))
                .unwrap_or_default(),
            None => Vec::new(),
        }
    }
}

impl Drop for Capture {
    fn drop(&mut self) {
        self.reinstate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages;

    fn warn(name: &str) {
        report(Diagnostic::new(&messages::UNRECOGNIZED_NODE_TYPE, &[name]));
    }

    #[test]
    fn test_report_without_capture_is_dropped() {
        assert!(!is_capturing());
        warn("Foo");
    }

    #[test]
    fn test_nested_captures() {
        let outer = capture();
        warn("A");
        let inner = capture();
        warn("B");
        let inner_diags = inner.finish();
        warn("C");
        let outer_diags = outer.finish();
        assert!(!is_capturing());
        assert_eq!(inner_diags.len(), 1);
        assert!(inner_diags[0].message_text.ends_with("B"));
        let texts: Vec<_> = outer_diags.iter().map(|d| d.message_text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["unrecognized node type: A", "unrecognized node type: C"]
        );
    }

    #[test]
    fn test_dropped_capture_restores_outer() {
        let outer = capture();
        {
            let _inner = capture();
            warn("lost");
        }
        warn("kept");
        let diags = outer.finish();
        assert_eq!(diags.len(), 1);
    }
}
