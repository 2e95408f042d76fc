//! Tracking-mode demo: leak something on purpose and watch the report.
//!
//! Run with: cargo run --example leak_demo
//!
//! Build with debug info (the default dev profile) so the report shows
//! symbol names rather than raw addresses.

use memhook::{ReportGuard, TrackingAlloc};

#[global_allocator]
static HOOK: TrackingAlloc = TrackingAlloc::system();

fn make_some_garbage() {
    // Freed before shutdown: stays out of the report.
    let transient = vec![0u8; 256];
    drop(transient);

    // Never freed: one block in the report, created right here.
    let leaked: &'static mut Vec<u8> = Box::leak(Box::new(vec![0u8; 1024]));
    leaked.push(1);
}

fn main() {
    let _report = ReportGuard::new(&HOOK);

    make_some_garbage();

    println!("outstanding allocations: {}", HOOK.outstanding());
    // The runtime's own startup allocations are tracked too, so the count is
    // larger than the one deliberate leak above. The report that follows on
    // stderr lists every one of them, ascending by address.
}
