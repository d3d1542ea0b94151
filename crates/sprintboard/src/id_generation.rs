//! Sequential ID allocation for sprintboard stores.
//!
//! Every store owns its own [`IdAllocator`], so ticket, sub-task and sprint
//! ids live in independent counter spaces and two stores never share state.
//! Ids start at 1 and increase monotonically for the life of the allocator.
//!
//! # Example
//!
//! ```
//! use sprintboard::domain::TicketId;
//! use sprintboard::id_generation::IdAllocator;
//!
//! let allocator = IdAllocator::new();
//! let first: TicketId = allocator.allocate();
//! let second: TicketId = allocator.allocate();
//! assert_eq!(first, TicketId(1));
//! assert_eq!(second, TicketId(2));
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

const FIRST_ID: u64 = 1;

/// Lock-free monotonically increasing id source.
#[derive(Debug)]
pub struct IdAllocator {
    next: AtomicU64,
}

impl IdAllocator {
    /// Create an allocator whose first id is 1.
    pub fn new() -> Self {
        Self::starting_at(FIRST_ID)
    }

    /// Create an allocator whose first id is `first`.
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Hand out the next id.
    pub fn allocate<I: From<u64>>(&self) -> I {
        let raw = self.next.fetch_add(1, Ordering::Relaxed);
        trace!(id = raw, "Allocated id");
        I::from(raw)
    }

    /// The id the next call to [`allocate`](Self::allocate) will return.
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }

    /// Rewind to the first id. Only meaningful for an empty store.
    pub fn reset(&self) {
        self.next.store(FIRST_ID, Ordering::Relaxed);
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
