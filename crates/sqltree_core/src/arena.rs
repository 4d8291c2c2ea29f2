//! Scoped arena allocation.
//!
//! Every node produced while parsing one query lives in a tree of
//! [`MemoryScope`]s rooted at a single top-level scope. Releasing a scope
//! releases all of its descendants first and then itself, so tearing down a
//! parse is a single drop no matter how many child scopes were opened.
//!
//! The "current" scope is not a global. It is carried by an explicit
//! [`ArenaContext`] handle that the parser and tree passes thread through;
//! [`ArenaContext::enter`] returns a [`ScopeToken`] that restores the previous
//! current scope when dropped, on every exit path.
//!
//! Live scopes and bytes are accounted per thread, which is what makes leak
//! checks observable through [`stats`].

use bumpalo::Bump;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::marker::PhantomData;

thread_local! {
    static LIVE_SCOPES: Cell<usize> = const { Cell::new(0) };
    static LIVE_BYTES: Cell<usize> = const { Cell::new(0) };
}

/// Snapshot of the arena memory owned by the calling thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArenaStats {
    /// Number of scopes (top-level and nested) not yet released.
    pub live_scopes: usize,
    /// Bytes of chunk memory held by those scopes.
    pub live_bytes: usize,
}

/// Arena usage of the calling thread.
pub fn stats() -> ArenaStats {
    ArenaStats {
        live_scopes: LIVE_SCOPES.with(Cell::get),
        live_bytes: LIVE_BYTES.with(Cell::get),
    }
}

// ============================================================================
// MemoryScope
// ============================================================================

/// One allocation scope: a bump allocator plus the child scopes created
/// under it.
///
/// Scopes are bound to the thread that created them. Values allocated in a
/// scope never have their destructors run; only plain data (nodes, strings,
/// slices of references) is stored here.
pub struct MemoryScope {
    // Declared before `bump` so children always go first.
    children: RefCell<Vec<Box<MemoryScope>>>,
    bump: Bump,
    name: &'static str,
    accounted: Cell<usize>,
    _thread_bound: PhantomData<*mut ()>,
}

impl MemoryScope {
    /// Create a new top-level scope.
    pub fn new(name: &'static str) -> Self {
        Self::from_bump(name, Bump::new())
    }

    /// Create a new top-level scope with the specified initial capacity in bytes.
    pub fn with_capacity(name: &'static str, capacity: usize) -> Self {
        Self::from_bump(name, Bump::with_capacity(capacity))
    }

    fn from_bump(name: &'static str, bump: Bump) -> Self {
        LIVE_SCOPES.with(|n| n.set(n.get() + 1));
        let scope = Self {
            children: RefCell::new(Vec::new()),
            bump,
            name,
            accounted: Cell::new(0),
            _thread_bound: PhantomData,
        };
        scope.sync_accounting();
        tracing::trace!(scope = name, "arena scope created");
        scope
    }

    /// The name this scope was created with.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Create a child scope owned by this one.
    ///
    /// The child lives until this scope is reset or released.
    pub fn child(&self, name: &'static str) -> &MemoryScope {
        let boxed = Box::new(MemoryScope::new(name));
        let child: *const MemoryScope = &*boxed;
        self.children.borrow_mut().push(boxed);
        // SAFETY: the child is boxed, so its address is stable when the
        // vector reallocates. Children are only removed through `&mut self`
        // (`reset`, `release_children`) or on drop, none of which can happen
        // while the returned shared borrow of `self` is alive.
        unsafe { &*child }
    }

    /// Number of direct child scopes.
    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    /// Allocate a value in this scope and return a reference to it.
    #[inline]
    pub fn alloc<T>(&self, val: T) -> &T {
        let r = self.bump.alloc(val);
        self.sync_accounting();
        r
    }

    /// Allocate a string slice in this scope.
    #[inline]
    pub fn alloc_str(&self, s: &str) -> &str {
        let r = self.bump.alloc_str(s);
        self.sync_accounting();
        r
    }

    /// Copy a slice into this scope.
    #[inline]
    pub fn alloc_slice_copy<T: Copy>(&self, src: &[T]) -> &[T] {
        if src.is_empty() {
            return &[];
        }
        let r = self.bump.alloc_slice_copy(src);
        self.sync_accounting();
        r
    }

    /// Move the elements of a vector into this scope as a slice.
    pub fn alloc_vec<T>(&self, vec: Vec<T>) -> &[T] {
        if vec.is_empty() {
            return &[];
        }
        let r = self.bump.alloc_slice_fill_iter(vec);
        self.sync_accounting();
        r
    }

    /// Returns the chunk bytes held by this scope, excluding children.
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }

    /// Release every child scope, keeping this one.
    pub fn release_children(&mut self) {
        self.children.get_mut().clear();
    }

    /// Reset the scope: release all children and deallocate every object,
    /// keeping the first chunk for reuse.
    pub fn reset(&mut self) {
        self.release_children();
        self.bump.reset();
        self.sync_accounting();
    }

    /// Release this scope and all of its descendants.
    pub fn release(self) {
        drop(self);
    }

    fn sync_accounting(&self) {
        let now = self.bump.allocated_bytes();
        let before = self.accounted.replace(now);
        if now != before {
            LIVE_BYTES.with(|b| b.set((b.get() + now).saturating_sub(before)));
        }
    }
}

impl Drop for MemoryScope {
    fn drop(&mut self) {
        self.children.get_mut().clear();
        let bytes = self.accounted.get();
        LIVE_BYTES.with(|b| b.set(b.get().saturating_sub(bytes)));
        LIVE_SCOPES.with(|n| n.set(n.get().saturating_sub(1)));
        tracing::trace!(scope = self.name, bytes, "arena scope released");
    }
}

impl fmt::Debug for MemoryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryScope")
            .field("name", &self.name)
            .field("allocated_bytes", &self.allocated_bytes())
            .field("children", &self.child_count())
            .finish()
    }
}

// ============================================================================
// ArenaContext
// ============================================================================

/// Handle carrying the current allocation scope for one parse call.
///
/// Allocation helpers on the context always land in the current scope.
pub struct ArenaContext<'s> {
    top: &'s MemoryScope,
    current: Cell<&'s MemoryScope>,
    level: Cell<usize>,
}

impl<'s> ArenaContext<'s> {
    /// Create a context whose current scope is `top`.
    pub fn new(top: &'s MemoryScope) -> Self {
        Self {
            top,
            current: Cell::new(top),
            level: Cell::new(0),
        }
    }

    /// The scope this context was created over.
    #[inline]
    pub fn top(&self) -> &'s MemoryScope {
        self.top
    }

    /// The scope new allocations land in.
    #[inline]
    pub fn current(&self) -> &'s MemoryScope {
        self.current.get()
    }

    /// Number of scopes entered and not yet exited.
    pub fn level(&self) -> usize {
        self.level.get()
    }

    /// Create a child of the current scope and make it current.
    pub fn enter(&self, name: &'static str) -> ScopeToken<'_, 's> {
        let child = self.current().child(name);
        self.switch_to(child)
    }

    /// Make `scope` current until the returned token is dropped.
    pub fn switch_to(&self, scope: &'s MemoryScope) -> ScopeToken<'_, 's> {
        let previous = self.current.replace(scope);
        let level = self.level.get() + 1;
        self.level.set(level);
        ScopeToken {
            ctx: self,
            previous,
            level,
        }
    }

    /// Restore the scope that was current before `token` was issued.
    pub fn exit(&self, token: ScopeToken<'_, 's>) {
        drop(token);
    }

    #[inline]
    pub fn alloc<T>(&self, val: T) -> &'s T {
        self.current().alloc(val)
    }

    #[inline]
    pub fn alloc_str(&self, s: &str) -> &'s str {
        self.current().alloc_str(s)
    }

    #[inline]
    pub fn alloc_slice_copy<T: Copy>(&self, src: &[T]) -> &'s [T] {
        self.current().alloc_slice_copy(src)
    }

    #[inline]
    pub fn alloc_vec<T>(&self, vec: Vec<T>) -> &'s [T] {
        self.current().alloc_vec(vec)
    }
}

/// Restores the previously current scope when dropped.
#[must_use = "dropping the token immediately exits the scope"]
pub struct ScopeToken<'c, 's> {
    ctx: &'c ArenaContext<'s>,
    previous: &'s MemoryScope,
    level: usize,
}

impl Drop for ScopeToken<'_, '_> {
    fn drop(&mut self) {
        debug_assert_eq!(
            self.ctx.level.get(),
            self.level,
            "arena scopes exited out of order"
        );
        self.ctx.current.set(self.previous);
        self.ctx.level.set(self.level - 1);
    }
}
