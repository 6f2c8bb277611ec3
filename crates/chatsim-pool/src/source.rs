//! Read interface shared by pools and views.

use chatsim_core::Record;
use std::sync::Arc;

/// Randomly addressable sequence of records.
pub trait RecordSource: Send + Sync {
    /// Number of records, or `None` when unbounded.
    fn total_size(&self) -> Option<u64>;

    /// Record at `index`; `None` past the end of a bounded source.
    fn fetch(&self, index: u64) -> Option<Record>;

    /// Whether indices past `total_size()` wrap back to the start.
    fn wraps(&self) -> bool {
        false
    }
}

impl<T: RecordSource + ?Sized> RecordSource for Arc<T> {
    fn total_size(&self) -> Option<u64> {
        (**self).total_size()
    }

    fn fetch(&self, index: u64) -> Option<Record> {
        (**self).fetch(index)
    }

    fn wraps(&self) -> bool {
        (**self).wraps()
    }
}
