//! Leak report rendering and the shutdown lifecycle adapter.
//!
//! The report walks the allocation index in ascending address order and
//! renders one block per surviving allocation: address, size, then the
//! resolved call stack with the two interceptor-internal frames skipped.
//! Blocks are blank-line separated. An empty index produces no output.

use std::io::{self, Write};

use crate::config::REPORT_SKIP_FRAMES;
use crate::core::index::AllocationIndex;
use crate::core::tracking::TrackingAlloc;
use crate::trace::Symbolizer;

/// Render every outstanding allocation in `index` to `out`.
///
/// The traversal never mutates the index; the shutdown path does no
/// removals.
pub fn write_leak_report<W: Write + ?Sized>(
    index: &AllocationIndex,
    symbolizer: &dyn Symbolizer,
    out: &mut W,
) -> io::Result<()> {
    if index.is_empty() {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "memhook: outstanding allocations")?;
    writeln!(out)?;

    for (addr, record) in index.iter() {
        writeln!(out, "{:#x} ({} bytes):", addr, record.size)?;

        let symbols = symbolizer.resolve(record.stack.frames());
        for line in symbols.iter().skip(REPORT_SKIP_FRAMES) {
            writeln!(out, "  {}", line)?;
        }

        writeln!(out)?;
    }

    Ok(())
}

/// Runs the shutdown report when dropped.
///
/// The reporting contract is "run once, after program logic, before exit";
/// this guard is the plain-Rust way to get that: construct it first thing in
/// `main` and let it drop last. Hosts with their own lifecycle machinery
/// (e.g. `libc::atexit`) can call
/// [`TrackingAlloc::shutdown_report`] themselves instead; the entry point is
/// idempotent either way.
pub struct ReportGuard<'a, A> {
    tracker: &'a TrackingAlloc<A>,
}

impl<'a, A> ReportGuard<'a, A> {
    /// Report on `tracker` when this guard drops.
    pub fn new(tracker: &'a TrackingAlloc<A>) -> Self {
        Self { tracker }
    }
}

impl<A> Drop for ReportGuard<'_, A> {
    fn drop(&mut self) {
        self.tracker.shutdown_report();
    }
}
