//! Integration tests for memhook.
//!
//! The interceptors are driven directly as values (not installed with
//! `#[global_allocator]`), with the system allocator underneath, so the
//! pointers are real but the test harness's own allocations stay out of the
//! picture.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use memhook::{EventSink, LogEvent, LoggingAlloc, Operation, Symbolizer, TrackingAlloc};

fn layout(size: usize) -> Layout {
    Layout::from_size_align(size, 8).unwrap()
}

/// Deterministic stand-in for the backtrace symbolizer.
struct NumberedSymbolizer;

impl Symbolizer for NumberedSymbolizer {
    fn resolve(&self, frames: &[usize]) -> Vec<String> {
        (0..frames.len()).map(|i| format!("frame {}", i)).collect()
    }
}

fn report(tracker: &TrackingAlloc) -> String {
    let mut out = Vec::new();
    tracker
        .shutdown_report_to(&NumberedSymbolizer, &mut out)
        .unwrap();
    String::from_utf8(out).unwrap()
}

// =============================================================================
// Shutdown-report scenarios
// =============================================================================

#[test]
fn test_unfreed_allocation_is_reported() {
    // Scenario: allocate 16 bytes, never free, shut down.
    let tracker = TrackingAlloc::system();
    let ptr = unsafe { tracker.alloc(layout(16)) };
    assert!(!ptr.is_null());

    let text = report(&tracker);
    assert!(text.contains(&format!("{:#x} (16 bytes):", ptr as usize)));
    // A captured stack survives into the report (minus the two internal
    // frames).
    assert!(text.contains("frame 2"));

    unsafe { System.dealloc(ptr, layout(16)) };
}

#[test]
fn test_freed_allocation_is_not_reported() {
    // Scenario: allocate, free, shut down. Report is empty.
    let tracker = TrackingAlloc::system();
    let ptr = unsafe { tracker.alloc(layout(16)) };
    unsafe { tracker.dealloc(ptr, layout(16)) };

    assert!(report(&tracker).is_empty());
}

#[test]
fn test_realloc_then_free_leaves_nothing() {
    // Scenario: allocate 8, grow to 64, free the result. Report is empty.
    let tracker = TrackingAlloc::system();
    let small = unsafe { tracker.alloc(layout(8)) };
    let big = unsafe { tracker.realloc(small, layout(8), 64) };
    assert!(!big.is_null());
    unsafe { tracker.dealloc(big, layout(64)) };

    assert_eq!(tracker.outstanding(), 0);
    assert!(report(&tracker).is_empty());
}

#[test]
fn test_free_of_pre_realloc_pointer_is_fatal() {
    // Scenario: after a moving realloc, the old pointer is dead; freeing it
    // is a contract violation.
    let tracker = TrackingAlloc::system();
    let small = unsafe { tracker.alloc(layout(8)) };
    let big = unsafe { tracker.realloc(small, layout(8), 4096) };
    assert!(!big.is_null());

    if big == small {
        // In-place growth; the stale-pointer case does not arise. Clean up.
        unsafe { tracker.dealloc(big, layout(4096)) };
        return;
    }

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| unsafe {
        tracker.dealloc(small, layout(8))
    }));
    assert!(result.is_err());

    // The violation poisons the tracker by design (bookkeeping is not
    // recoverable); release the live block behind its back.
    unsafe { System.dealloc(big, layout(4096)) };
}

#[test]
fn test_realloc_null_behaves_as_fresh_allocate() {
    // Scenario: reallocate with a null input pointer and size 32.
    let tracker = TrackingAlloc::system();
    let ptr = unsafe { tracker.realloc(std::ptr::null_mut(), layout(32), 32) };
    assert!(!ptr.is_null());
    assert_eq!(tracker.outstanding(), 1);

    let text = report(&tracker);
    assert!(text.contains(&format!("{:#x} (32 bytes):", ptr as usize)));

    unsafe { System.dealloc(ptr, layout(32)) };
}

// =============================================================================
// Balance invariant
// =============================================================================

#[test]
fn test_index_tracks_exactly_the_live_set() {
    let tracker = TrackingAlloc::system();
    let mut live: Vec<(*mut u8, Layout)> = Vec::new();

    // A scripted mix of allocates, frees, and reallocs.
    for i in 0..32usize {
        let l = layout(8 + (i % 7) * 16);
        let ptr = unsafe { tracker.alloc(l) };
        assert!(!ptr.is_null());
        live.push((ptr, l));
        assert_eq!(tracker.outstanding(), live.len());

        if i % 3 == 2 {
            let (ptr, l) = live.remove(i % live.len());
            unsafe { tracker.dealloc(ptr, l) };
            assert_eq!(tracker.outstanding(), live.len());
        }

        if i % 4 == 3 {
            let (ptr, l) = live.pop().unwrap();
            let grown = layout(l.size() * 2);
            let new_ptr = unsafe { tracker.realloc(ptr, l, grown.size()) };
            assert!(!new_ptr.is_null());
            live.push((new_ptr, grown));
            assert_eq!(tracker.outstanding(), live.len());
        }
    }

    // Every live pointer appears in the report, then drain.
    let text = report(&tracker);
    for &(ptr, _) in &live {
        assert!(text.contains(&format!("{:#x}", ptr as usize)));
    }
    for (ptr, l) in live {
        unsafe { System.dealloc(ptr, l) };
    }
}

// =============================================================================
// Reentrancy discipline
// =============================================================================

/// Inner allocator that observes the interceptor's hook state from inside
/// the real allocation call.
struct ProbeAlloc;

static HOOKS_SEEN_ACTIVE: AtomicBool = AtomicBool::new(false);
static PROBE_TRACKER: TrackingAlloc<ProbeAlloc> = TrackingAlloc::new(ProbeAlloc);

fn probe_hook_state() {
    if PROBE_TRACKER.hooks().is_active() {
        HOOKS_SEEN_ACTIVE.store(true, Ordering::Relaxed);
    }
}

unsafe impl GlobalAlloc for ProbeAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        probe_hook_state();
        unsafe { System.alloc(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        probe_hook_state();
        unsafe { System.dealloc(ptr, layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        probe_hook_state();
        unsafe { System.realloc(ptr, layout, new_size) }
    }
}

#[test]
fn test_hooks_are_inactive_during_real_calls() {
    let ptr = unsafe { PROBE_TRACKER.alloc(layout(16)) };
    assert!(PROBE_TRACKER.hooks().is_active());

    let grown = unsafe { PROBE_TRACKER.realloc(ptr, layout(16), 32) };
    assert!(PROBE_TRACKER.hooks().is_active());

    unsafe { PROBE_TRACKER.dealloc(grown, layout(32)) };
    assert!(PROBE_TRACKER.hooks().is_active());

    // The inner allocator never once observed "active" from inside a real
    // call: no window exists for a nested allocation to reenter.
    assert!(!HOOKS_SEEN_ACTIVE.load(Ordering::Relaxed));
    assert_eq!(PROBE_TRACKER.outstanding(), 0);
}

// =============================================================================
// Logging mode
// =============================================================================

#[derive(Default)]
struct VecSink(Mutex<Vec<LogEvent>>);

impl EventSink for VecSink {
    fn emit(&self, event: &LogEvent) {
        self.0.lock().unwrap().push(*event);
    }
}

#[test]
fn test_logging_mode_emits_and_retains_nothing() {
    // Scenario: one allocate of size 10 produces exactly one event.
    let logger = LoggingAlloc::with_sink(System, VecSink::default());

    let ptr = unsafe { logger.alloc(Layout::from_size_align(10, 1).unwrap()) };
    assert!(!ptr.is_null());

    {
        let events = logger.sink().0.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].operation, Operation::Allocate);
        assert_eq!(events[0].output, Some(ptr as usize));
        assert!(!events[0].stack.is_empty());
    }

    // No bookkeeping state: the pointer is the system allocator's own, and
    // freeing it produces an event rather than an index lookup.
    unsafe { logger.dealloc(ptr, Layout::from_size_align(10, 1).unwrap()) };
    let events = logger.sink().0.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].operation, Operation::Free);
    assert_eq!(events[1].input, Some(ptr as usize));
}
