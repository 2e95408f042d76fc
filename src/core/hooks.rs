//! Hook state: whether allocation calls are routed through the interceptor.
//!
//! Every intercepted operation allocates on its own behalf (index nodes,
//! event rendering), and that bookkeeping is served by the very allocator
//! being intercepted. The hook switch exists so those inner allocations
//! bypass the interceptor instead of recursing into it: disable, do the
//! work, re-enable. The re-enable is tied to a guard's `Drop` so no early
//! return or panic can leave interception off.
//!
//! The switch is an atomic flag, which keeps reads and writes well-defined,
//! but the check-then-disable sequence is not one atomic step. See the crate
//! docs for the resulting single-threaded-target limitation.

use std::sync::atomic::{AtomicBool, Ordering};

/// The process-wide "interceptor active / inactive" switch for one
/// installed interceptor.
pub struct HookState {
    active: AtomicBool,
    shut_down: AtomicBool,
}

impl HookState {
    /// A fresh switch: active, not shut down.
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(true),
            shut_down: AtomicBool::new(false),
        }
    }

    /// True when calls are currently routed through the interceptor.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    /// Route calls straight to the inner allocator until the returned guard
    /// drops. Not reentrant: the guard restores "active" unconditionally,
    /// there is no nesting count.
    pub fn scoped_disable(&self) -> HookGuard<'_> {
        self.active.store(false, Ordering::Relaxed);
        HookGuard { state: self }
    }

    /// The terminal transition, taken once by the leak reporter. After this,
    /// guards no longer restore "active".
    pub fn disable_permanently(&self) {
        self.shut_down.store(true, Ordering::Relaxed);
        self.active.store(false, Ordering::Relaxed);
    }

    /// True once [`HookState::disable_permanently`] has run.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Relaxed)
    }
}

impl Default for HookState {
    fn default() -> Self {
        Self::new()
    }
}

/// Re-enables interception when dropped, on every exit path.
pub struct HookGuard<'a> {
    state: &'a HookState,
}

impl Drop for HookGuard<'_> {
    fn drop(&mut self) {
        if !self.state.shut_down.load(Ordering::Relaxed) {
            self.state.active.store(true, Ordering::Relaxed);
        }
    }
}
