//! Bounded recency set of content hashes.

use std::collections::{HashSet, VecDeque};

/// Default number of hashes remembered.
pub const DEFAULT_RING_CAPACITY: usize = 2048;

/// Default number of regeneration attempts per record.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;

/// How hard materialization tries to avoid repeated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupPolicy {
    pub ring_capacity: usize,
    pub max_attempts: u32,
}

impl Default for DedupPolicy {
    fn default() -> Self {
        Self {
            ring_capacity: DEFAULT_RING_CAPACITY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// FIFO ring of hashes with O(1) membership.
///
/// Pushing a hash that is already present is a no-op; once over capacity
/// the oldest hash is forgotten.
#[derive(Debug, Clone)]
pub struct DedupRing {
    capacity: usize,
    order: VecDeque<u32>,
    members: HashSet<u32>,
}

impl DedupRing {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity + 1),
            members: HashSet::with_capacity(capacity + 1),
        }
    }

    pub fn contains(&self, hash: u32) -> bool {
        self.members.contains(&hash)
    }

    pub fn push(&mut self, hash: u32) {
        if !self.members.insert(hash) {
            return;
        }
        self.order.push_back(hash);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.members.remove(&oldest);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
