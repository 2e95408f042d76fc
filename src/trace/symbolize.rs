//! Symbol resolution for captured return addresses.
//!
//! Resolution is a seam: the reporter and the default log sink consume any
//! [`Symbolizer`], and tests substitute a deterministic fake. The default
//! implementation asks the `backtrace` crate. Missing debug info degrades
//! each address to a non-empty placeholder rather than failing.

use std::ffi::c_void;

/// Resolves raw return addresses to display strings.
pub trait Symbolizer {
    /// One display string per input address, in the same order. Every output
    /// string is non-empty; an unresolvable address yields a placeholder.
    fn resolve(&self, frames: &[usize]) -> Vec<String>;
}

/// Default symbolizer backed by the `backtrace` crate.
pub struct BacktraceSymbolizer;

impl Symbolizer for BacktraceSymbolizer {
    fn resolve(&self, frames: &[usize]) -> Vec<String> {
        frames.iter().map(|&addr| resolve_one(addr)).collect()
    }
}

fn resolve_one(addr: usize) -> String {
    let mut line: Option<String> = None;

    // The callback can run more than once for inlined frames; keep the first.
    backtrace::resolve(addr as *mut c_void, |symbol| {
        if line.is_some() {
            return;
        }

        let name = symbol.name().map(|n| n.to_string());
        let location = match (symbol.filename(), symbol.lineno()) {
            (Some(file), Some(lineno)) => Some(format!("{}:{}", file.display(), lineno)),
            _ => None,
        };

        line = match (name, location) {
            (Some(name), Some(location)) => Some(format!("{} ({})", name, location)),
            (Some(name), None) => Some(name),
            (None, Some(location)) => Some(location),
            (None, None) => None,
        };
    });

    line.unwrap_or_else(|| format!("{:#x} <unresolved>", addr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_string_per_address() {
        let frames = [0x1000, 0x2000, 0x3000];
        let symbols = BacktraceSymbolizer.resolve(&frames);
        assert_eq!(symbols.len(), frames.len());
    }

    #[test]
    fn test_unresolvable_address_gets_placeholder() {
        // Address 0x1 resolves nowhere in any sane process image.
        let symbols = BacktraceSymbolizer.resolve(&[0x1]);
        assert_eq!(symbols.len(), 1);
        assert!(!symbols[0].is_empty());
    }

    #[test]
    fn test_empty_input_empty_output() {
        assert!(BacktraceSymbolizer.resolve(&[]).is_empty());
    }
}
