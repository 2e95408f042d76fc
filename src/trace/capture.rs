//! Fixed-depth call-stack capture.
//!
//! Capture walks the active call chain and records return addresses into a
//! buffer embedded in the [`CallStack`] value itself. No heap allocation
//! happens on this path, so capture is safe to run while interception is
//! disabled and the allocator is mid-operation.

use std::fmt;

use crate::config::MAX_STACK_DEPTH;

/// An ordered sequence of return addresses, most recent call first.
///
/// The two leading frames of any capture taken inside an intercepted
/// operation are interceptor-internal; renderers skip them
/// ([`crate::config::REPORT_SKIP_FRAMES`]), capture itself does not.
#[derive(Clone, Copy)]
pub struct CallStack {
    frames: [usize; MAX_STACK_DEPTH],
    len: usize,
}

impl CallStack {
    /// A stack with no frames.
    pub const fn empty() -> Self {
        Self {
            frames: [0; MAX_STACK_DEPTH],
            len: 0,
        }
    }

    /// Walk the current call chain, recording up to `max_depth` return
    /// addresses (clamped to [`MAX_STACK_DEPTH`]).
    pub fn capture(max_depth: usize) -> Self {
        let mut stack = Self::empty();
        let limit = max_depth.min(MAX_STACK_DEPTH);
        if limit == 0 {
            return stack;
        }

        backtrace::trace(|frame| {
            stack.frames[stack.len] = frame.ip() as usize;
            stack.len += 1;
            stack.len < limit
        });

        stack
    }

    /// The captured return addresses, in capture order.
    pub fn frames(&self) -> &[usize] {
        &self.frames[..self.len]
    }

    /// Number of frames actually captured.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

// Manual impl so the fixed buffer's unused tail stays out of the output.
impl fmt::Debug for CallStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for &addr in self.frames() {
            list.entry(&format_args!("{:#x}", addr));
        }
        list.finish()
    }
}
