//! sqltree_core: Core utilities for the sqltree query parser.
//!
//! Provides the scoped allocation arena every parse tree lives in, source
//! locations, and the per-thread recursion depth guard used by the parser,
//! walker, and mutator.

pub mod arena;
pub mod stack;
pub mod text;

// Re-export commonly used types
pub use arena::{ArenaContext, ArenaStats, MemoryScope, ScopeToken};
pub use stack::{
    check_stack_depth, DepthGuard, StackDepthExceeded, DEFAULT_MAX_STACK_DEPTH, DEFAULT_STACK_BUDGET, MAX_STACK_DEPTH_LIMIT,
};
pub use text::{Location, TextSpan};
