//! Record timestamps spread across the pool span.

use crate::rng::XorShift32;

/// Maximum absolute jitter is half of this window (one hour each way).
const JITTER_WINDOW_MS: f64 = 3_600_000.0;

/// `earliest + (index / pool_size) * span + jitter` in epoch millis
/// (one draw).
pub fn generate_timestamp(
    rng: &mut XorShift32,
    index: u64,
    pool_size: u64,
    earliest_ms: i64,
    span_ms: i64,
) -> i64 {
    let frac = index as f64 / pool_size.max(1) as f64;
    let jitter = (rng.next_f64() - 0.5) * JITTER_WINDOW_MS;
    (earliest_ms as f64 + frac * span_ms as f64 + jitter).round() as i64
}
