//! The per-call guarded region.
//!
//! Everything a parse call does runs inside [`guarded_call`]. Fatal
//! conditions arrive as `Err` values from any depth and panics are caught,
//! so neither reaches the host. On every exit the calling thread's
//! recursion counter and ceiling are put back to their values at entry and
//! the diagnostic capture opened for the call is closed.

use sqltree_core::stack;
use sqltree_diagnostics::{sink, Diagnostic, ErrorCategory, ErrorInfo, Result};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// What a guarded call produced.
#[derive(Debug)]
pub struct Trapped<T> {
    pub outcome: std::result::Result<T, ErrorInfo>,
    /// Non-fatal diagnostics reported during the call, in order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Run `f` with a fresh recursion ceiling of `max_stack_depth` levels and
/// its own diagnostic capture.
pub fn guarded_call<T>(max_stack_depth: u32, f: impl FnOnce() -> Result<T>) -> Trapped<T> {
    let baseline = stack::snapshot();
    stack::set_max_depth(max_stack_depth);
    let capture = sink::capture();

    let outcome = match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            let info = ErrorInfo::from(&err);
            if info.category == ErrorCategory::Internal {
                tracing::error!(message = %info.message, "internal error trapped at call boundary");
            } else {
                tracing::debug!(category = ?info.category, cursor = ?info.cursor_offset, "parse failed: {}", info.message);
            }
            Err(info)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(%message, "panic trapped at call boundary");
            Err(ErrorInfo::from_panic(message))
        }
    };

    let diagnostics = capture.finish();
    stack::restore(baseline);
    Trapped { outcome, diagnostics }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    }
}
