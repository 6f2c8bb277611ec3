//! Sender directory collaborator.

use crate::record::Sender;

/// Ordered, indexable, read-only list of senders.
///
/// The synthesizer only ever reads one uniformly chosen index per record.
pub trait SenderDirectory: Send + Sync {
    /// Number of senders.
    fn len(&self) -> usize;

    /// Sender at `index`, if in range.
    fn sender(&self, index: usize) -> Option<&Sender>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SenderDirectory for Vec<Sender> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn sender(&self, index: usize) -> Option<&Sender> {
        self.get(index)
    }
}

/// Directory with no entries; records fall back to synthetic members.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyDirectory;

impl SenderDirectory for EmptyDirectory {
    fn len(&self) -> usize {
        0
    }

    fn sender(&self, _index: usize) -> Option<&Sender> {
        None
    }
}
