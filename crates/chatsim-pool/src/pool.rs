//! Eager pool materialization.

use crate::dedup::{DedupPolicy, DedupRing};
use crate::error::PoolError;
use crate::source::RecordSource;
use chatsim_core::{PoolConfig, Record, SenderDirectory};
use chatsim_generator::generators::text::pad_text;
use chatsim_generator::vocab::EMOJI;
use chatsim_generator::{content_hash, Synthesizer, XorShift32};
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Progress is logged every this many records.
const PROGRESS_INTERVAL: usize = 10_000;

/// Metrics from a materialization run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MaterializeStats {
    /// Number of records produced.
    pub records: u64,
    /// Regeneration attempts across all records.
    pub dedup_retries: u64,
    /// Records accepted with a hash still present in the ring.
    pub dedup_exhausted: u64,
    /// Wall-clock time spent.
    pub duration: Duration,
}

impl MaterializeStats {
    /// Calculate records per second.
    pub fn records_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.records as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// A fully materialized, immutable sequence of records.
#[derive(Debug, Clone)]
pub struct MessagePool {
    config: PoolConfig,
    records: Vec<Record>,
    id_index: HashMap<String, usize>,
    stats: MaterializeStats,
}

impl MessagePool {
    /// Materialize a pool with the default dedup policy.
    pub fn materialize(config: PoolConfig, directory: Arc<dyn SenderDirectory>) -> Self {
        let synthesizer = Synthesizer::new(config, directory);
        Self::materialize_with(&synthesizer, DedupPolicy::default())
    }

    /// Materialize `synthesizer.size()` records, index by index.
    ///
    /// A record whose text hash is in the recency ring is regenerated from a
    /// shifted index and seed, with an emoji suffix on even attempts. When
    /// the attempt budget runs out the last candidate is kept.
    pub fn materialize_with(synthesizer: &Synthesizer, policy: DedupPolicy) -> Self {
        let start_time = Instant::now();
        let config = synthesizer.config().clone();
        let size = config.size as usize;
        let seed_base = config.seed_base;

        info!(
            "Materializing {} records (seed base {}, span {} days)",
            size, seed_base, config.span_days
        );

        let mut ring = DedupRing::new(policy.ring_capacity);
        let mut stats = MaterializeStats::default();
        let mut records = Vec::with_capacity(size);

        for i in 0..size {
            let index = i as u64;
            let mut record = synthesizer.record_at(index);
            let mut hash = content_hash(&record.text);

            let mut attempts: u32 = 0;
            while ring.contains(hash) && attempts < policy.max_attempts {
                let text = retry_text(synthesizer, index, attempts);
                hash = content_hash(&text);
                record.text = text;
                attempts += 1;
            }

            stats.dedup_retries += u64::from(attempts);
            if ring.contains(hash) {
                stats.dedup_exhausted += 1;
                debug!("Dedup budget exhausted at index {}", index);
            }
            ring.push(hash);
            records.push(record);

            if (i + 1) % PROGRESS_INTERVAL == 0 {
                debug!("Materialized {} records", i + 1);
            }
        }

        let id_index = records
            .iter()
            .enumerate()
            .map(|(pos, r)| (r.id.clone(), pos))
            .collect();

        stats.records = records.len() as u64;
        stats.duration = start_time.elapsed();

        info!(
            "Materialization complete: {} records in {:?} ({:.2} records/sec, {} retries, {} exhausted)",
            stats.records,
            stats.duration,
            stats.records_per_second(),
            stats.dedup_retries,
            stats.dedup_exhausted
        );

        Self {
            config,
            records,
            id_index,
            stats,
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn stats(&self) -> &MaterializeStats {
        &self.stats
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at `index`, or `None` when out of bounds.
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Up to `count` records from `start`; `start` is clamped into the pool.
    pub fn range(&self, start: usize, count: usize) -> &[Record] {
        if self.records.is_empty() {
            return &[];
        }
        let start = start.min(self.records.len() - 1);
        let count = count.min(self.records.len() - start);
        &self.records[start..start + count]
    }

    /// O(1) lookup by id.
    pub fn find_by_id(&self, id: &str) -> Option<&Record> {
        self.id_index.get(id).and_then(|pos| self.records.get(*pos))
    }

    /// Uniformly pick a record using the caller's generator.
    pub fn pick_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Record> {
        if self.records.is_empty() {
            return None;
        }
        self.records.get(rng.gen_range(0..self.records.len()))
    }

    /// Uniformly pick among records matching `filter`.
    pub fn pick_random_where<R, F>(&self, rng: &mut R, filter: F) -> Option<&Record>
    where
        R: Rng + ?Sized,
        F: Fn(&Record) -> bool,
    {
        let matching: Vec<&Record> = self.records.iter().filter(|r| filter(r)).collect();
        if matching.is_empty() {
            return None;
        }
        matching.get(rng.gen_range(0..matching.len())).copied()
    }

    fn export_bounds(&self, start: usize, end: Option<usize>) -> (usize, usize) {
        let len = self.records.len();
        let start = start.min(len);
        let end = end.unwrap_or(len).clamp(start, len);
        (start, end)
    }

    /// JSON array of records in `[start, end)`; `end` defaults to the pool
    /// length and both bounds are clamped.
    pub fn export_json(&self, start: usize, end: Option<usize>) -> Result<String, PoolError> {
        let (start, end) = self.export_bounds(start, end);
        Ok(serde_json::to_string(&self.records[start..end])?)
    }

    /// Write the same JSON array as [`export_json`](Self::export_json) to a
    /// file. Returns the number of records written.
    pub fn export_to_file<P: AsRef<Path>>(
        &self,
        path: P,
        start: usize,
        end: Option<usize>,
    ) -> Result<usize, PoolError> {
        let (start, end) = self.export_bounds(start, end);
        let path = path.as_ref();
        info!(
            "Exporting records {}..{} to '{}'",
            start,
            end,
            path.display()
        );

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &self.records[start..end])?;
        writer.flush()?;
        Ok(end - start)
    }
}

impl RecordSource for MessagePool {
    fn total_size(&self) -> Option<u64> {
        Some(self.records.len() as u64)
    }

    fn fetch(&self, index: u64) -> Option<Record> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.records.get(i))
            .cloned()
    }
}

/// Materialize on tokio's blocking pool.
///
/// The task owns its inputs, so the result is identical to
/// [`MessagePool::materialize`]. Must be called from within a runtime.
pub fn materialize_in_background(
    config: PoolConfig,
    directory: Arc<dyn SenderDirectory>,
) -> tokio::task::JoinHandle<MessagePool> {
    tokio::task::spawn_blocking(move || MessagePool::materialize(config, directory))
}

/// Inputs of [`estimate_for_duration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimateParams {
    pub msgs_per_min: u64,
    pub duration_days: u64,
    pub avg_msgs_per_person_per_day: u64,
}

impl Default for EstimateParams {
    fn default() -> Self {
        Self {
            msgs_per_min: 45,
            duration_days: 730,
            avg_msgs_per_person_per_day: 5,
        }
    }
}

/// Projected pool and directory size for a streaming duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationEstimate {
    pub total_msgs: u64,
    pub estimated_people: u64,
}

/// Arithmetic projection: messages at the given rate over the duration, and
/// the number of people needed at the given per-person daily volume.
pub fn estimate_for_duration(params: EstimateParams) -> DurationEstimate {
    let days = params.duration_days.max(1);
    let per_person = params.avg_msgs_per_person_per_day.max(1);
    let total_msgs = params.msgs_per_min.saturating_mul(60 * 24).saturating_mul(days);
    let estimated_people = total_msgs.div_ceil(per_person.saturating_mul(days));
    DurationEstimate {
        total_msgs,
        estimated_people,
    }
}

/// Replacement text for the record at `index` on retry `attempt` (0-based).
///
/// Text comes from the shifted index `index + attempt + 1` under seed base
/// `seed_base + attempt + 1`. Even attempts append a space and one emoji.
/// The result is padded to the minimum length.
fn retry_text(synthesizer: &Synthesizer, index: u64, attempt: u32) -> String {
    let seed_base = synthesizer.config().seed_base;
    let shifted = index.saturating_add(u64::from(attempt) + 1);
    let mut text = synthesizer
        .record_with_seed(shifted, seed_base.wrapping_add(attempt).wrapping_add(1))
        .text;

    let mut suffix_rng =
        XorShift32::new(seed_base.wrapping_add(attempt).wrapping_add(index as u32));
    if attempt % 2 == 0 {
        if let Some(emoji) = suffix_rng.pick(EMOJI) {
            text.push(' ');
            text.push_str(emoji);
        }
    }
    pad_text(&mut text, &mut suffix_rng);
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatsim_core::EmptyDirectory;
    use chatsim_generator::generators::text::MIN_TEXT_CHARS;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    fn test_config() -> PoolConfig {
        PoolConfig::default()
            .with_size(500)
            .with_seed_base(4000)
            .with_span_days(30)
    }

    fn test_pool() -> MessagePool {
        MessagePool::materialize(test_config(), Arc::new(EmptyDirectory))
    }

    #[test]
    fn test_deterministic_materialization() {
        let a = test_pool();
        let b = test_pool();
        assert_eq!(a.records(), b.records());
        assert_eq!(a.len(), 500);
    }

    #[test]
    fn test_ids_dense_and_indexed() {
        let pool = test_pool();
        for (i, record) in pool.records().iter().enumerate() {
            assert_eq!(record.id, format!("msg_{}", i + 1));
            assert_eq!(pool.find_by_id(&record.id), Some(record));
            assert!(record.text.chars().count() >= MIN_TEXT_CHARS);
        }
        assert!(pool.find_by_id("msg_0").is_none());
        assert!(pool.find_by_id("msg_501").is_none());
    }

    #[test]
    fn test_no_duplicate_hash_within_ring() {
        let pool = test_pool();
        let policy = DedupPolicy::default();
        let hashes: Vec<u32> = pool.records().iter().map(|r| content_hash(&r.text)).collect();

        let mut seen = std::collections::HashSet::new();
        let mut collisions = 0;
        for hash in &hashes {
            // 500 records fit inside the 2048-entry ring
            if !seen.insert(*hash) {
                collisions += 1;
            }
        }
        assert!(hashes.len() < policy.ring_capacity);
        assert_eq!(collisions as u64, pool.stats().dedup_exhausted);
    }

    #[test]
    fn test_retry_text_even_attempt_adds_emoji() {
        let synth = Synthesizer::new(test_config(), Arc::new(EmptyDirectory));
        let base = synth.record_with_seed(13, 4003).text;
        let emoji = XorShift32::new(4000 + 2 + 10).pick(EMOJI).unwrap();

        let text = retry_text(&synth, 10, 2);
        assert_eq!(text, format!("{base} {emoji}"));
        assert_ne!(text, synth.record_at(10).text);
    }

    #[test]
    fn test_retry_text_odd_attempt_uses_shifted_record() {
        let synth = Synthesizer::new(test_config(), Arc::new(EmptyDirectory));
        for index in [0u64, 9, 250] {
            let text = retry_text(&synth, index, 1);
            assert_eq!(text, synth.record_with_seed(index + 2, 4002).text);
            assert!(text.chars().count() >= MIN_TEXT_CHARS);
        }
    }

    #[test]
    fn test_retries_remove_most_duplicates() {
        let config = PoolConfig::default().with_size(20_000);
        let synth = Synthesizer::new(config, Arc::new(EmptyDirectory));
        let deduped = MessagePool::materialize_with(&synth, DedupPolicy::default());
        let raw = MessagePool::materialize_with(
            &synth,
            DedupPolicy {
                max_attempts: 0,
                ..DedupPolicy::default()
            },
        );

        assert_eq!(raw.stats().dedup_retries, 0);
        assert!(raw.stats().dedup_exhausted > 0);
        assert!(deduped.stats().dedup_retries > 0);
        assert!(deduped.stats().dedup_exhausted < raw.stats().dedup_exhausted);
    }

    #[test]
    fn test_tiny_ring_still_materializes() {
        let synth = Synthesizer::new(test_config(), Arc::new(EmptyDirectory));
        let pool = MessagePool::materialize_with(
            &synth,
            DedupPolicy {
                ring_capacity: 1,
                max_attempts: 0,
            },
        );
        assert_eq!(pool.len(), 500);
        assert_eq!(pool.stats().dedup_retries, 0);
    }

    #[test]
    fn test_range_clamps() {
        let pool = test_pool();
        assert_eq!(pool.range(0, 10).len(), 10);
        assert_eq!(pool.range(495, 10).len(), 5);
        assert_eq!(pool.range(10_000, 10).len(), 1);
        assert_eq!(pool.range(10_000, 10)[0].id, "msg_500");
        assert!(pool.range(3, 0).is_empty());
    }

    #[test]
    fn test_get_out_of_bounds() {
        let pool = test_pool();
        assert!(pool.get(499).is_some());
        assert!(pool.get(500).is_none());
        assert!(pool.fetch(500).is_none());
        assert_eq!(pool.total_size(), Some(500));
    }

    #[test]
    fn test_pick_random() {
        let pool = test_pool();
        let mut rng = StdRng::seed_from_u64(42);
        assert!(pool.pick_random(&mut rng).is_some());

        let mut rng = XorShift32::new(9);
        for _ in 0..20 {
            let picked = pool
                .pick_random_where(&mut rng, |r| r.reply_to.is_some())
                .expect("pool has replies");
            assert!(picked.reply_to.is_some());
        }
        assert!(pool
            .pick_random_where(&mut rng, |r| r.id == "missing")
            .is_none());
    }

    #[test]
    fn test_export_json() {
        let pool = test_pool();
        let json = pool.export_json(10, Some(13)).unwrap();
        let parsed: Vec<Record> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, pool.range(10, 3));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value[0].get("senderDisplayName").is_some());
        assert!(value[0].get("isOutbound").is_some());

        assert_eq!(pool.export_json(600, None).unwrap(), "[]");
        assert_eq!(pool.export_json(20, Some(5)).unwrap(), "[]");
    }

    #[test]
    fn test_export_to_file() {
        let pool = test_pool();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pool.json");

        let written = pool.export_to_file(&path, 0, None).unwrap();
        assert_eq!(written, 500);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, pool.export_json(0, None).unwrap());
    }

    #[test]
    fn test_estimate() {
        let estimate = estimate_for_duration(EstimateParams::default());
        assert_eq!(estimate.total_msgs, 45 * 60 * 24 * 730);
        assert_eq!(estimate.estimated_people, 12_960);

        let odd = estimate_for_duration(EstimateParams {
            msgs_per_min: 1,
            duration_days: 1,
            avg_msgs_per_person_per_day: 1000,
        });
        assert_eq!(odd.total_msgs, 1440);
        assert_eq!(odd.estimated_people, 2);
    }

    #[test]
    fn test_stats_rate() {
        let stats = MaterializeStats {
            records: 1000,
            duration: Duration::from_secs(10),
            ..Default::default()
        };
        assert_eq!(stats.records_per_second(), 100.0);
        assert_eq!(MaterializeStats::default().records_per_second(), 0.0);
    }

    #[tokio::test]
    async fn test_background_matches_foreground() {
        let background = materialize_in_background(test_config(), Arc::new(EmptyDirectory))
            .await
            .unwrap();
        assert_eq!(background.records(), test_pool().records());
    }
}
