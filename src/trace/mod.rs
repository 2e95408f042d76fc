//! Call-stack capture and symbol resolution.

mod capture;
mod symbolize;

pub use capture::CallStack;
pub use symbolize::{BacktraceSymbolizer, Symbolizer};
