//! # memhook
//!
//! Transparent interception of a process's allocation primitives.
//!
//! memhook wraps an inner allocator (by default [`std::alloc::System`]) and
//! observes every allocate, reallocate, and free that passes through it,
//! without any change to the observed code. Two operating modes:
//!
//! - **Tracking mode** ([`TrackingAlloc`]): keeps an ordered index of every
//!   outstanding allocation, tagged with its size and the call stack that
//!   created it, and renders everything still outstanding at shutdown as a
//!   leak report.
//! - **Logging mode** ([`LoggingAlloc`]): emits one event per intercepted
//!   call, with a captured call stack, synchronously to stderr (or a custom
//!   sink). No state is retained.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use memhook::{ReportGuard, TrackingAlloc};
//!
//! #[global_allocator]
//! static HOOK: TrackingAlloc = TrackingAlloc::system();
//!
//! fn main() {
//!     let _report = ReportGuard::new(&HOOK);
//!
//!     let leaked: &'static mut [u8; 16] = Box::leak(Box::new([0u8; 16]));
//!     let _ = leaked;
//!     // On exit, the guard prints every allocation never freed, with the
//!     // call stack that created it.
//! }
//! ```
//!
//! ## Reentrancy
//!
//! The interceptor's own bookkeeping is served by the same allocator it
//! instruments. Every intercepted call therefore disables interception for
//! its own duration (a scoped guard that re-enables on every exit path), so
//! bookkeeping allocations reach the inner allocator directly instead of
//! recursing into the interceptor.
//!
//! ## Limitation: single-threaded targets only
//!
//! There is one hook switch and one index per installed interceptor, and the
//! "is interception active?" check is not atomic with the bookkeeping that
//! follows it. With a multi-threaded target, a second thread can allocate
//! while the first holds the scoped disable; that allocation bypasses
//! tracking and the accounting becomes unreliable. Memory safety is never at
//! risk (the index sits behind a lock), but the reports are only trustworthy
//! for effectively single-threaded programs. This is a deliberate footprint
//! trade-off, not an oversight.
//!
//! ## Failure model
//!
//! Double frees, frees of pointers the index never saw, and index collisions
//! are [`ContractViolation`]s: they panic, and a panic inside a global
//! allocator aborts the process. Exhaustion of the inner allocator is
//! propagated exactly as the inner allocator surfaced it (a null pointer),
//! never retried or masked. Missing debug info degrades symbol resolution to
//! per-address placeholders and nothing else.

pub mod config;
pub mod report;
pub mod trace;

mod core;
mod error;
mod sync;

pub use crate::core::hooks::{HookGuard, HookState};
pub use crate::core::index::{AllocationIndex, AllocationRecord};
pub use crate::core::logging::{EventSink, LogEvent, LoggingAlloc, Operation, StderrSink};
pub use crate::core::tracking::TrackingAlloc;
pub use crate::error::ContractViolation;
pub use crate::report::{write_leak_report, ReportGuard};
pub use crate::trace::{BacktraceSymbolizer, CallStack, Symbolizer};
