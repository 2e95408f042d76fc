//! Compile-time configuration.
//!
//! Both operating modes are fixed-behavior at build time; the only knobs are
//! the stack-capture depths, and those are constants, not runtime flags.

/// Frames captured per allocation in tracking mode.
pub const TRACKING_STACK_DEPTH: usize = 10;

/// Frames captured per event in logging mode.
pub const LOGGING_STACK_DEPTH: usize = 22;

/// Leading frames skipped when rendering a captured stack. The first two
/// frames are always interceptor-internal (the capture call and the
/// intercepted operation itself).
pub const REPORT_SKIP_FRAMES: usize = 2;

/// Capacity of the fixed stack buffer inside [`crate::CallStack`].
pub const MAX_STACK_DEPTH: usize = LOGGING_STACK_DEPTH;
