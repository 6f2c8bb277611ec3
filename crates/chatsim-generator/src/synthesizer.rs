//! Single-record synthesis.

use crate::generators::price::{format_price, generate_levels};
use crate::generators::template::TemplateEnv;
use crate::generators::text::{generate_text, pad_text, TextParams};
use crate::generators::timestamp::generate_timestamp;
use crate::rng::XorShift32;
use crate::vocab::{ATTACHMENT_FILES, INDICATORS, ORDER_TYPES, SPECIAL_SENDERS, TIMEFRAMES, TOKENS};
use chatsim_core::{record_id, Attachment, PoolConfig, Record, Role, Sender, SenderDirectory};
use std::sync::Arc;

/// Multiplier applied to the index when deriving its seed.
pub const INDEX_SEED_STRIDE: u32 = 15_721;

/// Synthetic fallback members cycle through this many names.
const FALLBACK_MEMBERS: u64 = 5_000;

/// Replies only start after this index.
const REPLY_MIN_INDEX: u64 = 8;

/// Maximum distance, in records, of a reply target.
const REPLY_MAX_OFFSET: u64 = 500;

/// Seed of the generator for `index`: `seed_base + index * 15721` (wrapping).
pub fn index_seed(seed_base: u32, index: u64) -> u32 {
    // Truncating the index is the same as reducing the product mod 2^32.
    seed_base.wrapping_add((index as u32).wrapping_mul(INDEX_SEED_STRIDE))
}

/// Produces records as a pure function of index and configuration.
///
/// Cheap to share: the directory is behind an `Arc` and nothing is cached.
#[derive(Clone)]
pub struct Synthesizer {
    config: PoolConfig,
    directory: Arc<dyn SenderDirectory>,
    earliest_ms: i64,
    span_ms: i64,
}

impl std::fmt::Debug for Synthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synthesizer")
            .field("config", &self.config)
            .field("directory_len", &self.directory.len())
            .finish()
    }
}

impl Synthesizer {
    /// Create a synthesizer; the configuration is clamped first.
    pub fn new(config: PoolConfig, directory: Arc<dyn SenderDirectory>) -> Self {
        let config = config.clamped();
        let earliest_ms = config.earliest_millis();
        let span_ms = config.span_millis();
        Self {
            config,
            directory,
            earliest_ms,
            span_ms,
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Pool size used for timestamp placement.
    pub fn size(&self) -> u64 {
        self.config.size
    }

    /// The record at `index` for the configured seed base.
    pub fn record_at(&self, index: u64) -> Record {
        self.record_with_seed(index, self.config.seed_base)
    }

    /// The record at `index` under an alternative seed base.
    ///
    /// Draw order:
    /// 1. admin boost, then special sender or directory entry
    /// 2. token, indicator, timeframe, order type
    /// 3. price jitter, take-profit, stop-loss
    /// 4. text family and its draws
    /// 5. attachment presence, filename
    /// 6. reply presence, offset (only when index > 8)
    /// 7. pinned
    /// 8. timestamp jitter
    /// 9. padding emoji, if needed
    pub fn record_with_seed(&self, index: u64, seed_base: u32) -> Record {
        let mut rng = XorShift32::new(index_seed(seed_base, index));

        let sender = self.pick_sender(&mut rng, index);

        let token = pick_str(&mut rng, TOKENS);
        let indicator = pick_str(&mut rng, INDICATORS);
        let timeframe = pick_str(&mut rng, TIMEFRAMES);
        let order = pick_str(&mut rng, ORDER_TYPES);

        let levels = generate_levels(token, &mut rng);
        let env = TemplateEnv {
            token: token.to_string(),
            indicator: indicator.to_string(),
            timeframe: timeframe.to_string(),
            order: order.to_string(),
            price: format_price(levels.price),
            tp: format_price(levels.take_profit),
            stop: format_price(levels.stop_loss),
        };

        let mut text = generate_text(
            &mut rng,
            &env,
            TextParams {
                first_name: sender.first_name(),
                min_words: self.config.min_words,
                max_words: self.config.max_words,
            },
        );

        let attachment = if rng.chance(self.config.attachment_fraction) {
            let filename = pick_str(&mut rng, ATTACHMENT_FILES);
            Some(Attachment {
                filename: filename.to_string(),
                url: format!("assets/{filename}"),
            })
        } else {
            None
        };

        let is_reply = rng.chance(self.config.reply_fraction);
        let reply_to = if is_reply && index > REPLY_MIN_INDEX {
            let window = REPLY_MAX_OFFSET.min(index - 2) as f64;
            let offset = 2 + (rng.next_f64() * window) as u64;
            // index - offset is the 1-based suffix of an earlier record
            Some(record_id(index - offset - 1))
        } else {
            None
        };

        let pinned = rng.chance(self.config.pinned_fraction);

        let timestamp = generate_timestamp(
            &mut rng,
            index,
            self.config.size,
            self.earliest_ms,
            self.span_ms,
        );

        pad_text(&mut text, &mut rng);

        Record {
            id: record_id(index),
            sender_name: sender.name,
            sender_display_name: sender.display_name,
            sender_role: sender.role,
            sender_avatar_ref: sender.avatar_ref,
            text,
            timestamp,
            reply_to,
            pinned,
            attachment,
            is_outbound: false,
        }
    }

    /// Text of the first `count` records (clamped to [1, 200000]).
    pub fn templates(&self, count: u64) -> Vec<String> {
        let count = count.clamp(1, 200_000);
        (0..count).map(|i| self.record_at(i).text).collect()
    }

    fn pick_sender(&self, rng: &mut XorShift32, index: u64) -> Sender {
        if rng.chance(self.config.admin_boost) {
            if let Some((name, display, role)) = rng.pick(SPECIAL_SENDERS) {
                return Sender::new(*name, *display, *role);
            }
        }

        if !self.directory.is_empty() {
            let idx = rng.index(self.directory.len());
            if let Some(sender) = self.directory.sender(idx) {
                return sender.clone();
            }
        }

        let member = index % FALLBACK_MEMBERS;
        Sender::new(
            format!("Member_{member}"),
            format!("Member {member}"),
            Role::Verified,
        )
    }
}

fn pick_str(rng: &mut XorShift32, items: &[&'static str]) -> &'static str {
    rng.pick(items).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::text::MIN_TEXT_CHARS;
    use chatsim_core::{EmptyDirectory, DEFAULT_ANCHOR_MILLIS};

    fn synthesizer(config: PoolConfig) -> Synthesizer {
        Synthesizer::new(config, Arc::new(EmptyDirectory))
    }

    fn small_config() -> PoolConfig {
        PoolConfig::default()
            .with_size(1000)
            .with_seed_base(4000)
            .with_span_days(30)
    }

    #[test]
    fn test_index_seed() {
        assert_eq!(index_seed(4000, 0), 4000);
        assert_eq!(index_seed(4000, 2), 4000 + 2 * 15_721);
        assert_eq!(index_seed(u32::MAX, 1), 15_720);
    }

    #[test]
    fn test_record_is_pure() {
        let a = synthesizer(small_config());
        let b = synthesizer(small_config());
        for index in [0, 1, 9, 10, 500, 999, 5000] {
            assert_eq!(a.record_at(index), b.record_at(index));
        }
    }

    #[test]
    fn test_ids_and_text_minimum() {
        let synth = synthesizer(small_config());
        for index in 0..1000 {
            let record = synth.record_at(index);
            assert_eq!(record.id, format!("msg_{}", index + 1));
            assert!(record.text.chars().count() >= MIN_TEXT_CHARS);
            assert!(!record.is_outbound);
        }
    }

    #[test]
    fn test_replies_point_backward() {
        let config = small_config().with_fractions(1.0, 0.0, 0.0);
        let synth = synthesizer(config);
        for index in 0..1000u64 {
            let record = synth.record_at(index);
            match record.reply_position() {
                Some(target) => {
                    assert!(index > REPLY_MIN_INDEX);
                    assert!(target + 2 <= index);
                    assert!(index - target <= REPLY_MAX_OFFSET + 2);
                }
                None => assert!(index <= REPLY_MIN_INDEX),
            }
        }
    }

    #[test]
    fn test_fractions_zero_and_one() {
        let none = synthesizer(small_config().with_fractions(0.0, 0.0, 0.0));
        let all = synthesizer(small_config().with_fractions(0.0, 1.0, 1.0));
        for index in 0..200 {
            let r = none.record_at(index);
            assert!(r.attachment.is_none() && !r.pinned && r.reply_to.is_none());

            let r = all.record_at(index);
            let attachment = r.attachment.expect("attachment");
            assert!(ATTACHMENT_FILES.contains(&attachment.filename.as_str()));
            assert_eq!(attachment.url, format!("assets/{}", attachment.filename));
            assert!(r.pinned);
        }
    }

    #[test]
    fn test_admin_boost() {
        let synth = synthesizer(small_config().with_admin_boost(1.0));
        for index in 0..100 {
            let record = synth.record_at(index);
            assert!(matches!(record.sender_role, Role::Admin | Role::Mod));
        }
    }

    #[test]
    fn test_fallback_sender() {
        let synth = synthesizer(small_config().with_admin_boost(0.0));
        let record = synth.record_at(5003);
        assert_eq!(record.sender_name, "Member_3");
        assert_eq!(record.sender_display_name, "Member 3");
        assert_eq!(record.sender_role, Role::Verified);
    }

    #[test]
    fn test_directory_sender() {
        let directory = vec![Sender::new("luna", "Luna", Role::Verified).with_avatar("a.png")];
        let synth = Synthesizer::new(small_config().with_admin_boost(0.0), Arc::new(directory));
        let record = synth.record_at(3);
        assert_eq!(record.sender_name, "luna");
        assert_eq!(record.sender_avatar_ref, "a.png");
    }

    #[test]
    fn test_timestamps_roughly_monotonic() {
        let synth = synthesizer(small_config());
        let earliest = DEFAULT_ANCHOR_MILLIS - 30 * 86_400_000;
        let mut prev = i64::MIN;
        for index in (0..1000).step_by(50) {
            let ts = synth.record_at(index).timestamp;
            assert!(ts >= earliest - 1_800_000);
            assert!(ts > prev);
            prev = ts;
        }
    }

    #[test]
    fn test_seed_base_changes_output() {
        let synth = synthesizer(small_config());
        let same: usize = (0..50)
            .filter(|i| synth.record_at(*i).text == synth.record_with_seed(*i, 4001).text)
            .count();
        assert!(same < 50);
    }

    #[test]
    fn test_templates() {
        let synth = synthesizer(small_config());
        let texts = synth.templates(20);
        assert_eq!(texts.len(), 20);
        assert_eq!(texts[7], synth.record_at(7).text);
        assert_eq!(synth.templates(0).len(), 1);
    }
}
