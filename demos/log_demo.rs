//! Logging-mode demo: every allocation, reallocation, and free in the
//! process is traced to stderr as it happens.
//!
//! Run with: cargo run --example log_demo 2>alloc.log
//!
//! Expect a lot of output; the Rust runtime allocates too.

use memhook::LoggingAlloc;

#[global_allocator]
static HOOK: LoggingAlloc = LoggingAlloc::system();

fn main() {
    let mut numbers = Vec::new();
    for i in 0..4 {
        // Growth reallocations show up as `realloc` events.
        numbers.push(i);
    }
    println!("sum: {}", numbers.iter().sum::<i32>());
}
