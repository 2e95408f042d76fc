//! Fatal bookkeeping faults.
//!
//! Diagnostic codes follow the pattern `MH0xx`. These faults indicate heap
//! corruption or target-program bugs that bookkeeping cannot safely continue
//! past, so there is no recoverable variant: [`fatal`] panics, and a panic
//! inside a global allocator aborts the process.

use std::fmt;

/// A breach of the allocation-index contract by the target program (or by a
/// corrupted heap).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractViolation {
    /// `MH001`: an insert collided with an address already indexed. The
    /// inner allocator handed out the same address twice without an
    /// intervening free, which means the heap itself is corrupt.
    DuplicateEntry {
        /// The colliding payload address.
        addr: usize,
    },

    /// `MH002`: a free or reallocate named an address the index does not
    /// hold. Either a double free, or a pointer this allocator never
    /// returned.
    UntrackedPointer {
        /// The address passed to free/reallocate.
        addr: usize,
    },
}

impl ContractViolation {
    /// Stable diagnostic code for this violation.
    pub fn code(&self) -> &'static str {
        match self {
            ContractViolation::DuplicateEntry { .. } => "MH001",
            ContractViolation::UntrackedPointer { .. } => "MH002",
        }
    }
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractViolation::DuplicateEntry { addr } => {
                write!(f, "allocation at {:#x} is already indexed", addr)
            }
            ContractViolation::UntrackedPointer { addr } => {
                write!(
                    f,
                    "pointer {:#x} is not an outstanding tracked allocation (double free or foreign pointer)",
                    addr
                )
            }
        }
    }
}

/// Report a contract violation and halt bookkeeping.
pub(crate) fn fatal(violation: ContractViolation) -> ! {
    #[cfg(feature = "log")]
    log::error!("[memhook][{}] {}", violation.code(), violation);

    panic!("[memhook][{}] {}", violation.code(), violation);
}
