//! Build script for memhook.
//!
//! Emits build-time diagnostics for feature combinations that affect the
//! quality of the captured call stacks and leak reports.

use std::env;

fn main() {
    // Re-run if features change
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_PARKING_LOT");
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_LOG");

    let parking_lot_enabled = env::var("CARGO_FEATURE_PARKING_LOT").is_ok();
    let log_enabled = env::var("CARGO_FEATURE_LOG").is_ok();

    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let is_release = profile == "release";

    // Symbolization is only as good as the debug info in the final binary.
    // DEBUG reflects the `debug` setting of the active cargo profile.
    let debug_info = env::var("DEBUG").map(|v| v != "0" && v != "false").unwrap_or(false);
    if is_release && !debug_info {
        emit_warning("Release profile without debug info");
        emit_note("Leak reports and event logs will show raw addresses only.");
        emit_note("Add `debug = true` to your release profile for symbol names:");
        emit_note("  [profile.release]");
        emit_note("  debug = true");
    }

    if parking_lot_enabled {
        emit_info("Using parking_lot for the allocation index lock");
    }

    if log_enabled {
        emit_info("Log integration enabled (install/shutdown/violation diagnostics)");
        emit_note("Remember that log macros themselves allocate; events emitted while");
        emit_note("interception is disabled bypass tracking, as intended.");
    }
}

// =============================================================================
// Diagnostic emission helpers
// =============================================================================

fn emit_info(msg: &str) {
    println!("cargo:warning=[memhook] ℹ️  {}", msg);
}

fn emit_note(msg: &str) {
    if msg.is_empty() {
        println!("cargo:warning=[memhook]");
    } else {
        println!("cargo:warning=[memhook]    {}", msg);
    }
}

fn emit_warning(msg: &str) {
    println!("cargo:warning=[memhook] ⚠️  {}", msg);
}
