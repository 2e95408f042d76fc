//! Logging-mode interceptor.
//!
//! Same disable / real call / re-enable shape as tracking mode, but nothing
//! is retained: each intercepted call captures a stack, hands one
//! [`LogEvent`] to the sink before returning, and that is all. Returned
//! pointers are exactly the inner allocator's pointers.

use std::alloc::{GlobalAlloc, Layout, System};
use std::io::Write;

use crate::config::{LOGGING_STACK_DEPTH, REPORT_SKIP_FRAMES};
use crate::core::hooks::HookState;
use crate::trace::{BacktraceSymbolizer, CallStack, Symbolizer};

/// Which primitive produced a [`LogEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// A fresh allocation.
    Allocate,
    /// A resize of an existing allocation.
    Reallocate,
    /// A release.
    Free,
}

impl Operation {
    /// Short tag used in rendered output.
    pub fn tag(&self) -> &'static str {
        match self {
            Operation::Allocate => "alloc",
            Operation::Reallocate => "realloc",
            Operation::Free => "free",
        }
    }
}

/// One intercepted call. Emitted synchronously, then discarded.
#[derive(Debug, Clone, Copy)]
pub struct LogEvent {
    /// The intercepted primitive.
    pub operation: Operation,
    /// Pointer passed in by the caller (reallocate, free).
    pub input: Option<usize>,
    /// Pointer handed back to the caller (allocate, reallocate).
    pub output: Option<usize>,
    /// Call stack at the intercepted call.
    pub stack: CallStack,
}

/// Where log events go.
///
/// `emit` runs inside the intercepted call, before control returns to the
/// target program; a sink must not buffer past the call boundary.
pub trait EventSink {
    /// Consume one event.
    fn emit(&self, event: &LogEvent);
}

/// Default sink: one line per event plus the resolved stack, to stderr.
pub struct StderrSink;

impl EventSink for StderrSink {
    fn emit(&self, event: &LogEvent) {
        let symbols = BacktraceSymbolizer.resolve(event.stack.frames());

        let stderr = std::io::stderr();
        let mut out = stderr.lock();
        let _ = writeln!(
            out,
            "{} in={} out={}",
            event.operation.tag(),
            fmt_ptr(event.input),
            fmt_ptr(event.output),
        );
        for line in symbols.iter().skip(REPORT_SKIP_FRAMES) {
            let _ = writeln!(out, "  {}", line);
        }
        let _ = writeln!(out);
    }
}

fn fmt_ptr(ptr: Option<usize>) -> String {
    match ptr {
        Some(addr) => format!("{:#x}", addr),
        None => "-".to_string(),
    }
}

fn ptr_opt(ptr: *mut u8) -> Option<usize> {
    if ptr.is_null() {
        None
    } else {
        Some(ptr as usize)
    }
}

/// An event-logging interceptor over an inner allocator.
///
/// ```rust,no_run
/// use memhook::LoggingAlloc;
///
/// #[global_allocator]
/// static HOOK: LoggingAlloc = LoggingAlloc::system();
/// ```
pub struct LoggingAlloc<A = System, S = StderrSink> {
    inner: A,
    hooks: HookState,
    sink: S,
}

impl LoggingAlloc<System, StderrSink> {
    /// Logging interceptor over the system allocator, events to stderr.
    pub const fn system() -> Self {
        Self::with_sink(System, StderrSink)
    }
}

impl<A> LoggingAlloc<A, StderrSink> {
    /// Logging interceptor over `inner`, events to stderr.
    pub const fn new(inner: A) -> Self {
        Self::with_sink(inner, StderrSink)
    }
}

impl<A, S> LoggingAlloc<A, S> {
    /// Logging interceptor over `inner` with a custom sink.
    pub const fn with_sink(inner: A, sink: S) -> Self {
        Self {
            inner,
            hooks: HookState::new(),
            sink,
        }
    }

    /// The hook switch for this interceptor.
    pub fn hooks(&self) -> &HookState {
        &self.hooks
    }

    /// The installed sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<A, S: EventSink> LoggingAlloc<A, S> {
    fn emit(&self, operation: Operation, input: Option<usize>, output: Option<usize>) {
        self.sink.emit(&LogEvent {
            operation,
            input,
            output,
            stack: CallStack::capture(LOGGING_STACK_DEPTH),
        });
    }
}

unsafe impl<A: GlobalAlloc, S: EventSink + Sync> GlobalAlloc for LoggingAlloc<A, S> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if !self.hooks.is_active() {
            return unsafe { self.inner.alloc(layout) };
        }
        let _guard = self.hooks.scoped_disable();

        let ptr = unsafe { self.inner.alloc(layout) };
        self.emit(Operation::Allocate, None, ptr_opt(ptr));
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if !self.hooks.is_active() {
            unsafe { self.inner.dealloc(ptr, layout) };
            return;
        }
        let _guard = self.hooks.scoped_disable();

        unsafe { self.inner.dealloc(ptr, layout) };
        self.emit(Operation::Free, ptr_opt(ptr), None);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if !self.hooks.is_active() {
            return unsafe { self.inner.realloc(ptr, layout, new_size) };
        }
        let _guard = self.hooks.scoped_disable();

        let new_ptr = unsafe { self.inner.realloc(ptr, layout, new_size) };
        self.emit(Operation::Reallocate, ptr_opt(ptr), ptr_opt(new_ptr));
        new_ptr
    }
}
