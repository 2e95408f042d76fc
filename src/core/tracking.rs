//! Tracking-mode interceptor.
//!
//! Wraps an inner allocator and keeps one [`AllocationRecord`] per
//! outstanding allocation. Every intercepted operation has the same shape:
//! disable interception for the duration of the call, perform the real
//! operation, update the index, let the guard re-enable interception,
//! return the inner allocator's result unchanged.

use std::alloc::{GlobalAlloc, Layout, System};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::TRACKING_STACK_DEPTH;
use crate::core::hooks::HookState;
use crate::core::index::{AllocationIndex, AllocationRecord};
use crate::report;
use crate::sync::mutex::Mutex;
use crate::trace::{BacktraceSymbolizer, CallStack, Symbolizer};

/// A leak-tracking interceptor over an inner allocator.
///
/// `const`-constructible so it can be installed with `#[global_allocator]`:
///
/// ```rust,no_run
/// use memhook::TrackingAlloc;
///
/// #[global_allocator]
/// static HOOK: TrackingAlloc = TrackingAlloc::system();
/// ```
///
/// Pointers returned to the caller are exactly the inner allocator's
/// pointers; the bookkeeping record lives in the index, not in a header in
/// front of the payload.
pub struct TrackingAlloc<A = System> {
    inner: A,
    hooks: HookState,
    index: Mutex<AllocationIndex>,
    reported: AtomicBool,
}

impl TrackingAlloc<System> {
    /// Tracking interceptor over the system allocator.
    pub const fn system() -> Self {
        Self::new(System)
    }
}

impl<A> TrackingAlloc<A> {
    /// Tracking interceptor over `inner`.
    pub const fn new(inner: A) -> Self {
        Self {
            inner,
            hooks: HookState::new(),
            index: Mutex::new(AllocationIndex::new()),
            reported: AtomicBool::new(false),
        }
    }

    /// The hook switch for this interceptor.
    pub fn hooks(&self) -> &HookState {
        &self.hooks
    }

    /// Number of currently outstanding tracked allocations.
    pub fn outstanding(&self) -> usize {
        self.index.lock().len()
    }

    /// Write the leak report for every outstanding allocation to `out`,
    /// permanently disabling interception first.
    ///
    /// Runs at most once: later calls (from any entry point) write nothing.
    /// Writes nothing at all when no allocation is outstanding.
    pub fn shutdown_report_to<W: Write + ?Sized>(
        &self,
        symbolizer: &dyn Symbolizer,
        out: &mut W,
    ) -> io::Result<()> {
        if self.reported.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.hooks.disable_permanently();

        let index = self.index.lock();

        #[cfg(feature = "log")]
        log::info!("memhook: {} outstanding allocation(s) at shutdown", index.len());

        report::write_leak_report(&index, symbolizer, out)
    }

    /// [`TrackingAlloc::shutdown_report_to`] with the default symbolizer,
    /// written to stderr. Write errors on the shutdown path are swallowed.
    pub fn shutdown_report(&self) {
        let stderr = io::stderr();
        let _ = self.shutdown_report_to(&BacktraceSymbolizer, &mut stderr.lock());
    }
}

impl<A: GlobalAlloc> TrackingAlloc<A> {
    /// Capture a stack and index a record for `ptr`.
    fn record(&self, ptr: *mut u8, size: usize) {
        let record = AllocationRecord {
            size,
            stack: CallStack::capture(TRACKING_STACK_DEPTH),
        };
        self.index.lock().insert(ptr as usize, record);
    }

    unsafe fn allocate(&self, layout: Layout) -> *mut u8 {
        let _guard = self.hooks.scoped_disable();

        let ptr = unsafe { self.inner.alloc(layout) };
        if !ptr.is_null() {
            self.record(ptr, layout.size());
        }
        // Null is the inner allocator's exhaustion signal; it is propagated
        // unrecorded and unretried.
        ptr
    }

    unsafe fn reallocate(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let _guard = self.hooks.scoped_disable();

        if ptr.is_null() {
            // realloc(NULL, n) is a fresh allocation under the usual
            // allocator contract; no removal is attempted.
            let new_layout = match Layout::from_size_align(new_size, layout.align()) {
                Ok(new_layout) => new_layout,
                Err(_) => return std::ptr::null_mut(),
            };
            let new_ptr = unsafe { self.inner.alloc(new_layout) };
            if !new_ptr.is_null() {
                self.record(new_ptr, new_size);
            }
            return new_ptr;
        }

        let old = self.index.lock().remove(ptr as usize);

        let new_ptr = unsafe { self.inner.realloc(ptr, layout, new_size) };
        if new_ptr.is_null() {
            // A failed realloc leaves the old block live and untouched, so
            // its record goes back under the old address.
            self.index.lock().insert(ptr as usize, old);
            return new_ptr;
        }

        self.record(new_ptr, new_size);
        new_ptr
    }

    unsafe fn release(&self, ptr: *mut u8, layout: Layout) {
        let _guard = self.hooks.scoped_disable();

        if !ptr.is_null() {
            self.index.lock().remove(ptr as usize);
            unsafe { self.inner.dealloc(ptr, layout) };
        }
    }
}

unsafe impl<A: GlobalAlloc> GlobalAlloc for TrackingAlloc<A> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if !self.hooks.is_active() {
            return unsafe { self.inner.alloc(layout) };
        }
        unsafe { self.allocate(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if !self.hooks.is_active() {
            unsafe { self.inner.dealloc(ptr, layout) };
            return;
        }
        unsafe { self.release(ptr, layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if !self.hooks.is_active() {
            return unsafe { self.inner.realloc(ptr, layout, new_size) };
        }
        unsafe { self.reallocate(ptr, layout, new_size) }
    }
}
