//! The allocation index: an ordered map of outstanding allocations.
//!
//! Keyed by payload address because that is the only information available
//! at free time; ascending address order also makes the shutdown report
//! deterministic. Records are owned values in a standard ordered container,
//! associated with their payload purely through the key.

use std::collections::BTreeMap;

use crate::error::{self, ContractViolation};
use crate::trace::CallStack;

/// Metadata for one currently-outstanding allocation.
pub struct AllocationRecord {
    /// Requested payload size in bytes.
    pub size: usize,

    /// Call stack captured when the allocation (or its latest reallocation)
    /// was made.
    pub stack: CallStack,
}

/// Invariant: exactly one entry per outstanding tracked allocation, keyed by
/// that allocation's current address. An indexed address has never been
/// freed since its (re)insertion.
pub struct AllocationIndex {
    entries: BTreeMap<usize, AllocationRecord>,
}

impl AllocationIndex {
    /// An empty index.
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Insert the record for a fresh allocation.
    ///
    /// A collision means the inner allocator handed out a live address a
    /// second time: fatal, see [`ContractViolation::DuplicateEntry`].
    pub fn insert(&mut self, addr: usize, record: AllocationRecord) {
        if self.entries.insert(addr, record).is_some() {
            error::fatal(ContractViolation::DuplicateEntry { addr });
        }
    }

    /// Exact-address lookup.
    pub fn find(&self, addr: usize) -> Option<&AllocationRecord> {
        self.entries.get(&addr)
    }

    /// Remove and return the record for `addr`.
    ///
    /// Absence means a double free or a free of a pointer this allocator
    /// never returned: fatal, see [`ContractViolation::UntrackedPointer`].
    pub fn remove(&mut self, addr: usize) -> AllocationRecord {
        match self.entries.remove(&addr) {
            Some(record) => record,
            None => error::fatal(ContractViolation::UntrackedPointer { addr }),
        }
    }

    /// Number of outstanding allocations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is outstanding.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All outstanding allocations, ascending by address.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &AllocationRecord)> {
        self.entries.iter().map(|(&addr, record)| (addr, record))
    }
}

impl Default for AllocationIndex {
    fn default() -> Self {
        Self::new()
    }
}
