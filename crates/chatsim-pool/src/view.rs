//! Paged, lazily synthesized view with an LRU page cache.
//!
//! ```text
//!   get(i) ──► page resident? ──yes──► touch, return element
//!                   │no
//!                   ▼
//!            single record from pool / synthesizer (no page built)
//!
//!   next_page(s) ──► page resident? ──yes──► touch, return copy
//!                        │no
//!                        ▼
//!                build page, insert (evict LRU), return copy
//! ```
//!
//! The key→page map and the LRU order live behind one lock, so they are
//! never observed half-updated.

use crate::pool::MessagePool;
use crate::source::RecordSource;
use chatsim_core::Record;
use chatsim_generator::Synthesizer;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::debug;

/// Smallest allowed cache capacity, in pages.
pub const MIN_CACHE_PAGES: usize = 3;

/// View settings; values are clamped on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    /// Records per page, at least 1
    pub page_size: usize,
    /// Resident pages, at least [`MIN_CACHE_PAGES`]
    pub cache_pages: usize,
    /// Indices past the end wrap modulo the total size
    pub allow_wrap: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            page_size: 200,
            cache_pages: 12,
            allow_wrap: false,
        }
    }
}

impl ViewOptions {
    pub fn new(page_size: usize, cache_pages: usize) -> Self {
        Self {
            page_size,
            cache_pages,
            allow_wrap: false,
        }
    }

    pub fn with_wrap(mut self, allow_wrap: bool) -> Self {
        self.allow_wrap = allow_wrap;
        self
    }

    fn clamped(self) -> Self {
        Self {
            page_size: self.page_size.max(1),
            cache_pages: self.cache_pages.max(MIN_CACHE_PAGES),
            allow_wrap: self.allow_wrap,
        }
    }
}

/// Where records come from when a page is not resident.
#[derive(Debug, Clone)]
pub enum Backing {
    /// An already materialized pool.
    Pool(Arc<MessagePool>),
    /// On-demand synthesis.
    Synthesizer(Arc<Synthesizer>),
}

impl Backing {
    fn record(&self, index: u64) -> Option<Record> {
        match self {
            Backing::Pool(pool) => pool.fetch(index),
            Backing::Synthesizer(synth) => Some(synth.record_at(index)),
        }
    }
}

/// Cache occupancy snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewInfo {
    pub page_size: usize,
    pub total_size: Option<u64>,
    /// Resident page keys, least recently used first.
    pub cached_pages: Vec<u64>,
    pub cache_count: usize,
}

#[derive(Debug, Default)]
struct PageCache {
    order: VecDeque<u64>,
    pages: HashMap<u64, Vec<Record>>,
}

impl PageCache {
    /// Mark `key` most recently used; returns the page if resident.
    fn touch(&mut self, key: u64) -> Option<&Vec<Record>> {
        if !self.pages.contains_key(&key) {
            return None;
        }
        if let Some(pos) = self.order.iter().position(|k| *k == key) {
            self.order.remove(pos);
        }
        self.order.push_back(key);
        self.pages.get(&key)
    }

    fn insert(&mut self, key: u64, page: Vec<Record>, capacity: usize) {
        if self.pages.contains_key(&key) {
            self.touch(key);
            return;
        }
        self.pages.insert(key, page);
        self.order.push_back(key);
        while self.order.len() > capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.pages.remove(&evicted);
                debug!("Evicted page {}", evicted);
            }
        }
    }

    fn clear(&mut self) {
        self.order.clear();
        self.pages.clear();
    }
}

/// Randomly addressable, windowed view over a record sequence.
#[derive(Debug)]
pub struct PagedView {
    backing: Backing,
    page_size: usize,
    cache_capacity: usize,
    allow_wrap: bool,
    total_size: Option<u64>,
    cache: Mutex<PageCache>,
}

impl PagedView {
    /// View over a materialized pool; the total size is the pool length.
    pub fn over_pool(pool: Arc<MessagePool>, options: ViewOptions) -> Self {
        let total = pool.len() as u64;
        Self::new(Backing::Pool(pool), Some(total), options)
    }

    /// View that synthesizes on demand; the total size is the configured
    /// pool size.
    pub fn over_synthesizer(synthesizer: Arc<Synthesizer>, options: ViewOptions) -> Self {
        let total = synthesizer.size();
        Self::new(Backing::Synthesizer(synthesizer), Some(total), options)
    }

    /// View with an explicit total size; `None` means unbounded.
    pub fn new(backing: Backing, total_size: Option<u64>, options: ViewOptions) -> Self {
        let options = options.clamped();
        Self {
            backing,
            page_size: options.page_size,
            cache_capacity: options.cache_pages,
            allow_wrap: options.allow_wrap,
            total_size: total_size.filter(|t| *t > 0),
            cache: Mutex::new(PageCache::default()),
        }
    }

    /// Replace the total size; `None` makes the view unbounded.
    pub fn with_total_size(mut self, total_size: Option<u64>) -> Self {
        self.total_size = total_size.filter(|t| *t > 0);
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_size(&self) -> Option<u64> {
        self.total_size
    }

    pub fn allows_wrap(&self) -> bool {
        self.allow_wrap
    }

    /// Apply the wrap policy; `None` when past the end without wrapping.
    fn normalize(&self, index: u64) -> Option<u64> {
        match self.total_size {
            Some(total) if index >= total => self.allow_wrap.then(|| index % total),
            _ => Some(index),
        }
    }

    fn page_key(&self, index: u64) -> u64 {
        let size = self.page_size as u64;
        (index / size) * size
    }

    /// Record at `index`.
    ///
    /// Served from the cache when its page is resident (counts as a touch);
    /// otherwise the single record is produced directly without building or
    /// caching a page.
    pub fn get(&self, index: u64) -> Option<Record> {
        let index = self.normalize(index)?;
        let key = self.page_key(index);
        {
            let mut cache = self.cache.lock();
            if let Some(page) = cache.touch(key) {
                let offset = (index - key) as usize;
                return page.get(offset).cloned();
            }
        }
        self.backing.record(index)
    }

    /// Copy of the page containing `start`, building and caching it if needed.
    ///
    /// The page is short or empty when a non-wrapping end is reached.
    pub fn next_page(&self, start: u64) -> Vec<Record> {
        let Some(start) = self.normalize(start) else {
            return Vec::new();
        };
        let key = self.page_key(start);

        if let Some(page) = self.cache.lock().touch(key) {
            return page.clone();
        }

        let page = self.build_page(key);
        debug!("Built page {} ({} records)", key, page.len());

        let mut cache = self.cache.lock();
        cache.insert(key, page, self.cache_capacity);
        cache.touch(key).cloned().unwrap_or_default()
    }

    /// `pages` consecutive pages starting at the page containing `start`.
    pub fn prefetch(&self, start: u64, pages: usize) -> Vec<Vec<Record>> {
        let first = self.page_key(start);
        let size = self.page_size as u64;
        (0..pages.max(1) as u64)
            .map_while(|p| p.checked_mul(size).and_then(|step| first.checked_add(step)))
            .map(|key| self.next_page(key))
            .collect()
    }

    /// Drop every resident page.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    pub fn info(&self) -> ViewInfo {
        let cache = self.cache.lock();
        ViewInfo {
            page_size: self.page_size,
            total_size: self.total_size,
            cached_pages: cache.order.iter().copied().collect(),
            cache_count: cache.order.len(),
        }
    }

    fn build_page(&self, key: u64) -> Vec<Record> {
        let mut page = Vec::with_capacity(self.page_size);
        for offset in 0..self.page_size as u64 {
            let Some(index) = key.checked_add(offset).and_then(|i| self.normalize(i)) else {
                break;
            };
            match self.backing.record(index) {
                Some(record) => page.push(record),
                None => break,
            }
        }
        page
    }
}

impl RecordSource for PagedView {
    fn total_size(&self) -> Option<u64> {
        self.total_size
    }

    fn fetch(&self, index: u64) -> Option<Record> {
        self.get(index)
    }

    fn wraps(&self) -> bool {
        self.allow_wrap
    }
}
