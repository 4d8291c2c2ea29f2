//! Recursion depth guard.
//!
//! Every recursive step of the parser, walker, and mutator calls
//! [`check_stack_depth`] and holds the returned [`DepthGuard`] for the
//! duration of the step. Two limits apply per thread: a ceiling on nested
//! levels, and a budget of native stack bytes measured from the frame of the
//! outermost guarded step. Exceeding either fails with
//! [`StackDepthExceeded`] instead of overflowing the native stack, which
//! turns adversarially nested input into an ordinary error.

use std::cell::Cell;
use std::marker::PhantomData;

/// Default ceiling on nested recursive steps per thread.
pub const DEFAULT_MAX_STACK_DEPTH: u32 = 10_000;

/// Largest accepted level ceiling.
pub const MAX_STACK_DEPTH_LIMIT: u32 = 1_000_000;

/// Default native stack budget in bytes. Half of the 2 MiB that spawned
/// threads and rayon workers get, leaving the rest for the frames below the
/// outermost guarded step and above the last check.
pub const DEFAULT_STACK_BUDGET: usize = 1 << 20;

thread_local! {
    static DEPTH: Cell<u32> = const { Cell::new(0) };
    static LIMIT: Cell<u32> = const { Cell::new(DEFAULT_MAX_STACK_DEPTH) };
    static BASE: Cell<usize> = const { Cell::new(0) };
    static BUDGET: Cell<usize> = const { Cell::new(DEFAULT_STACK_BUDGET) };
}

/// The recursion ceiling or the stack budget was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("stack depth limit exceeded")]
pub struct StackDepthExceeded {
    pub depth: u32,
    pub limit: u32,
    /// Stack bytes in use at the failing step.
    pub stack_used: usize,
}

/// Decrements the depth counter when dropped.
#[must_use = "the depth is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct DepthGuard {
    _thread_bound: PhantomData<*mut ()>,
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

/// Address of a local in a fresh frame, close to the caller's stack pointer.
#[inline(never)]
fn stack_pointer() -> usize {
    let marker = 0u8;
    std::hint::black_box(&marker) as *const u8 as usize
}

/// Enter one level of recursion.
#[inline]
pub fn check_stack_depth() -> Result<DepthGuard, StackDepthExceeded> {
    let depth = DEPTH.with(|d| d.get()) + 1;
    let limit = LIMIT.with(|l| l.get());
    let here = stack_pointer();
    let stack_used = if depth == 1 {
        BASE.with(|b| b.set(here));
        0
    } else {
        // Stacks grow down on every supported target; abs_diff keeps the
        // measure meaningful either way.
        here.abs_diff(BASE.with(|b| b.get()))
    };
    if depth > limit || stack_used > BUDGET.with(|b| b.get()) {
        return Err(StackDepthExceeded {
            depth,
            limit,
            stack_used,
        });
    }
    DEPTH.with(|d| d.set(depth));
    Ok(DepthGuard {
        _thread_bound: PhantomData,
    })
}

/// Current recursion depth of the calling thread.
pub fn current_depth() -> u32 {
    DEPTH.with(|d| d.get())
}

/// Current ceiling of the calling thread.
pub fn max_depth() -> u32 {
    LIMIT.with(|l| l.get())
}

/// Native stack budget of the calling thread, in bytes.
pub fn stack_budget() -> usize {
    BUDGET.with(|b| b.get())
}

/// Set the native stack budget of the calling thread, returning the
/// previous one. Threads spawned with a larger stack can raise it; it must
/// stay well below the thread's stack size.
pub fn set_stack_budget(bytes: usize) -> usize {
    BUDGET.with(|b| b.replace(bytes))
}

/// Saved depth state, restored with [`restore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthSnapshot {
    depth: u32,
    limit: u32,
    base: usize,
}

/// Capture the calling thread's depth counter and ceiling.
pub fn snapshot() -> DepthSnapshot {
    DepthSnapshot {
        depth: current_depth(),
        limit: max_depth(),
        base: BASE.with(|b| b.get()),
    }
}

/// Reset the calling thread's depth counter and ceiling to a snapshot.
pub fn restore(snapshot: DepthSnapshot) {
    DEPTH.with(|d| d.set(snapshot.depth));
    LIMIT.with(|l| l.set(snapshot.limit));
    BASE.with(|b| b.set(snapshot.base));
}

/// Set the ceiling for the calling thread, returning the previous one.
///
/// The ceiling counts levels above the current depth and is capped at
/// [`MAX_STACK_DEPTH_LIMIT`].
pub fn set_max_depth(levels: u32) -> u32 {
    let ceiling = current_depth().saturating_add(levels.min(MAX_STACK_DEPTH_LIMIT));
    LIMIT.with(|l| l.replace(ceiling))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recurse(n: u32) -> Result<u32, StackDepthExceeded> {
        let _guard = check_stack_depth()?;
        if n == 0 {
            Ok(current_depth())
        } else {
            recurse(n - 1)
        }
    }

    #[test]
    fn test_guard_decrements_on_drop() {
        let before = current_depth();
        {
            let _a = check_stack_depth().unwrap();
            let _b = check_stack_depth().unwrap();
            assert_eq!(current_depth(), before + 2);
        }
        assert_eq!(current_depth(), before);
    }

    #[test]
    fn test_limit_exceeded() {
        let saved = snapshot();
        set_max_depth(10);
        assert_eq!(recurse(5), Ok(saved.depth + 6));
        let err = recurse(50).unwrap_err();
        assert_eq!(err.limit, saved.depth + 10);
        assert_eq!(current_depth(), saved.depth);
        restore(saved);
        assert_eq!(max_depth(), saved.limit);
    }

    fn burn(n: u32) -> Result<u32, StackDepthExceeded> {
        let _guard = check_stack_depth()?;
        let pad = [n as u8; 1024];
        std::hint::black_box(&pad);
        if n == 0 {
            Ok(current_depth())
        } else {
            burn(n - 1)
        }
    }

    #[test]
    fn test_stack_budget_exceeded() {
        let saved = snapshot();
        let previous = set_stack_budget(16 * 1024);
        let err = burn(1_000).unwrap_err();
        set_stack_budget(previous);
        assert!(err.stack_used > 16 * 1024);
        assert!(err.depth < 100);
        assert_eq!(current_depth(), saved.depth);
        assert_eq!(stack_budget(), DEFAULT_STACK_BUDGET);
    }

    #[test]
    fn test_ceiling_is_capped() {
        let saved = snapshot();
        set_max_depth(u32::MAX);
        assert_eq!(max_depth(), saved.depth + MAX_STACK_DEPTH_LIMIT);
        restore(saved);
    }
}
