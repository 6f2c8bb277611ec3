//! Pool generation configuration.
//!
//! A [`PoolConfig`] is immutable once a generation run starts; changing any
//! value means generating a new pool. All numeric inputs are clamped rather
//! than rejected.
//!
//! ```yaml
//! size: 50000
//! seedBase: 4000
//! spanDays: 730
//! replyFraction: 0.06
//! startDate: 2024-01-01T00:00:00Z
//! ```

use crate::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Smallest pool that can be materialized.
pub const MIN_POOL_SIZE: u64 = 50;

/// Largest pool that can be materialized.
pub const MAX_POOL_SIZE: u64 = 500_000;

/// Instant used as "now" when neither `startDate` nor `anchorDate` is set
/// (2025-01-01T00:00:00Z).
pub const DEFAULT_ANCHOR_MILLIS: i64 = 1_735_689_600_000;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Configuration of one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PoolConfig {
    /// Number of records, clamped to [`MIN_POOL_SIZE`, `MAX_POOL_SIZE`]
    pub size: u64,
    /// Root of all pseudo-randomness
    pub seed_base: u32,
    /// Days covered by the timestamps
    pub span_days: u32,
    /// Lower bound of the token-salad word count
    pub min_words: u32,
    /// Upper bound of the token-salad word count
    pub max_words: u32,
    pub reply_fraction: f64,
    pub attachment_fraction: f64,
    pub pinned_fraction: f64,
    /// Probability of picking one of the fixed admin/mod senders
    pub admin_boost: f64,
    /// Timestamp of the first record; defaults to `anchorDate - spanDays`
    pub start_date: Option<DateTime<Utc>>,
    /// "Now" for the default start date
    pub anchor_date: Option<DateTime<Utc>>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            size: 100_000,
            seed_base: 4000,
            span_days: 730,
            min_words: 4,
            max_words: 20,
            reply_fraction: 0.06,
            attachment_fraction: 0.04,
            pinned_fraction: 0.0008,
            admin_boost: 0.02,
            start_date: None,
            anchor_date: None,
        }
    }
}

impl PoolConfig {
    /// Parse a YAML document; missing fields take their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, CoreError> {
        let config: PoolConfig = serde_yaml::from_str(yaml)?;
        Ok(config.clamped())
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Clamp every value into its documented range.
    pub fn clamped(mut self) -> Self {
        self.size = self.size.clamp(MIN_POOL_SIZE, MAX_POOL_SIZE);
        self.span_days = self.span_days.max(1);
        self.min_words = self.min_words.max(1);
        self.max_words = self.max_words.max(self.min_words);
        self.reply_fraction = clamp_fraction(self.reply_fraction);
        self.attachment_fraction = clamp_fraction(self.attachment_fraction);
        self.pinned_fraction = clamp_fraction(self.pinned_fraction);
        self.admin_boost = clamp_fraction(self.admin_boost);
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size.clamp(MIN_POOL_SIZE, MAX_POOL_SIZE);
        self
    }

    pub fn with_seed_base(mut self, seed_base: u32) -> Self {
        self.seed_base = seed_base;
        self
    }

    pub fn with_span_days(mut self, span_days: u32) -> Self {
        self.span_days = span_days.max(1);
        self
    }

    pub fn with_start_date(mut self, start_date: DateTime<Utc>) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn with_anchor_date(mut self, anchor_date: DateTime<Utc>) -> Self {
        self.anchor_date = Some(anchor_date);
        self
    }

    /// Set reply, attachment and pinned fractions at once.
    pub fn with_fractions(mut self, reply: f64, attachment: f64, pinned: f64) -> Self {
        self.reply_fraction = clamp_fraction(reply);
        self.attachment_fraction = clamp_fraction(attachment);
        self.pinned_fraction = clamp_fraction(pinned);
        self
    }

    pub fn with_admin_boost(mut self, admin_boost: f64) -> Self {
        self.admin_boost = clamp_fraction(admin_boost);
        self
    }

    /// Length of the covered period in milliseconds.
    pub fn span_millis(&self) -> i64 {
        i64::from(self.span_days) * MILLIS_PER_DAY
    }

    /// Epoch milliseconds of the start of the covered period.
    pub fn earliest_millis(&self) -> i64 {
        match self.start_date {
            Some(start) => start.timestamp_millis(),
            None => {
                let anchor = self
                    .anchor_date
                    .map(|d| d.timestamp_millis())
                    .unwrap_or(DEFAULT_ANCHOR_MILLIS);
                anchor - self.span_millis()
            }
        }
    }
}

fn clamp_fraction(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.size, 100_000);
        assert_eq!(config.seed_base, 4000);
        assert_eq!(config.span_days, 730);
        assert_eq!(config, config.clone().clamped());
    }

    #[test]
    fn test_clamping() {
        let config = PoolConfig {
            size: 3,
            span_days: 0,
            min_words: 0,
            max_words: 0,
            reply_fraction: 1.5,
            attachment_fraction: -0.2,
            pinned_fraction: f64::NAN,
            ..Default::default()
        }
        .clamped();

        assert_eq!(config.size, MIN_POOL_SIZE);
        assert_eq!(config.span_days, 1);
        assert_eq!(config.min_words, 1);
        assert_eq!(config.max_words, 1);
        assert_eq!(config.reply_fraction, 1.0);
        assert_eq!(config.attachment_fraction, 0.0);
        assert_eq!(config.pinned_fraction, 0.0);

        assert_eq!(PoolConfig::default().with_size(9_000_000).size, MAX_POOL_SIZE);
    }

    #[test]
    fn test_from_yaml_partial() {
        let yaml = r#"
size: 50
seedBase: 4000
spanDays: 30
startDate: 2024-01-01T00:00:00Z
"#;
        let config = PoolConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.size, 50);
        assert_eq!(config.span_days, 30);
        assert_eq!(config.min_words, 4);
        assert_eq!(config.earliest_millis(), 1_704_067_200_000);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "size: 10\nreplyFraction: 2.0").unwrap();

        let config = PoolConfig::from_file(file.path()).unwrap();
        assert_eq!(config.size, MIN_POOL_SIZE);
        assert_eq!(config.reply_fraction, 1.0);
    }

    #[test]
    fn test_from_yaml_invalid() {
        let result = PoolConfig::from_yaml("size: [1, 2]");
        assert!(matches!(result, Err(CoreError::Yaml(_))));
    }

    #[test]
    fn test_earliest_from_anchor() {
        let config = PoolConfig::default().with_span_days(1);
        assert_eq!(
            config.earliest_millis(),
            DEFAULT_ANCHOR_MILLIS - MILLIS_PER_DAY
        );
    }
}
