//! Command-line argument definitions.

use anyhow::Context;
use chatsim_core::{EmptyDirectory, PoolConfig, SenderDirectory};
use chatsim_generator::{PeopleConfig, SyntheticPeople};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "chatsim")]
#[command(about = "Deterministic synthetic chat message generator")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Materialize a full pool and report generation statistics
    Generate {
        #[command(flatten)]
        common: CommonGenerateArgs,

        /// Also write the whole pool as a JSON array to this file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Export a slice of a materialized pool as a JSON array
    Export {
        #[command(flatten)]
        common: CommonGenerateArgs,

        /// First index (inclusive)
        #[arg(long, default_value = "0")]
        start: usize,

        /// Last index (exclusive); defaults to the pool size
        #[arg(long)]
        end: Option<usize>,

        /// Output file; stdout when omitted
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Read pages through the paged view
    Page {
        #[command(flatten)]
        common: CommonGenerateArgs,

        #[command(flatten)]
        view: ViewArgs,

        /// Index inside the first page to read
        #[arg(long, default_value = "0")]
        start: u64,

        /// Number of consecutive pages to read
        #[arg(long, default_value = "1")]
        pages: usize,
    },

    /// Emit records as JSON lines at a steady rate
    Stream {
        #[command(flatten)]
        common: CommonGenerateArgs,

        #[command(flatten)]
        stream: StreamArgs,
    },

    /// Estimate message and people counts for a simulated period
    Estimate {
        /// Messages per minute
        #[arg(long, default_value = "45")]
        msgs_per_min: u64,

        /// Simulated period in days
        #[arg(long, default_value = "730")]
        days: u64,

        /// Average messages one person sends per day
        #[arg(long, default_value = "5")]
        avg_per_person_per_day: u64,
    },

    /// Print the synthetic sender directory
    People {
        #[command(flatten)]
        people: PeopleArgs,

        /// Number of entries to print; all when omitted
        #[arg(long)]
        limit: Option<usize>,
    },
}

/// Sender directory arguments.
#[derive(Args, Clone, Debug)]
pub struct PeopleArgs {
    /// Number of synthetic senders
    #[arg(long, default_value = "4872", env = "CHATSIM_PEOPLE_SIZE")]
    pub people_size: usize,

    /// Seed of the sender directory
    #[arg(long, default_value = "2026", env = "CHATSIM_PEOPLE_SEED")]
    pub people_seed: u32,
}

impl PeopleArgs {
    pub fn to_config(&self) -> PeopleConfig {
        PeopleConfig {
            size: self.people_size,
            seed_base: self.people_seed,
        }
    }
}

/// Generation arguments shared by every command that synthesizes records.
///
/// Values given on the command line override the config file, which
/// overrides the built-in defaults.
#[derive(Args, Clone, Debug)]
pub struct CommonGenerateArgs {
    /// Path to a YAML pool configuration file
    #[arg(long, short = 'c', env = "CHATSIM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of records (clamped to 50..=500000)
    #[arg(long, env = "CHATSIM_SIZE")]
    pub size: Option<u64>,

    /// Seed for deterministic generation (same seed = same records)
    #[arg(long, env = "CHATSIM_SEED_BASE")]
    pub seed_base: Option<u32>,

    /// Days covered by the timestamps
    #[arg(long)]
    pub span_days: Option<u32>,

    #[arg(long)]
    pub min_words: Option<u32>,

    #[arg(long)]
    pub max_words: Option<u32>,

    #[arg(long)]
    pub reply_fraction: Option<f64>,

    #[arg(long)]
    pub attachment_fraction: Option<f64>,

    #[arg(long)]
    pub pinned_fraction: Option<f64>,

    /// Probability of a fixed admin/mod sender
    #[arg(long)]
    pub admin_boost: Option<f64>,

    /// Date of the first record (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// "Now" for the default start date (YYYY-MM-DD); today when omitted
    #[arg(long, env = "CHATSIM_ANCHOR_DATE")]
    pub anchor_date: Option<NaiveDate>,

    /// Use generic member names instead of the synthetic directory
    #[arg(long)]
    pub no_people: bool,

    #[command(flatten)]
    pub people: PeopleArgs,
}

impl CommonGenerateArgs {
    /// Resolve the effective pool configuration.
    pub fn to_config(&self) -> anyhow::Result<PoolConfig> {
        let mut config = match &self.config {
            Some(path) => PoolConfig::from_file(path)
                .with_context(|| format!("Failed to load pool config from {path:?}"))?,
            None => PoolConfig::default(),
        };

        if let Some(size) = self.size {
            config.size = size;
        }
        if let Some(seed_base) = self.seed_base {
            config.seed_base = seed_base;
        }
        if let Some(span_days) = self.span_days {
            config.span_days = span_days;
        }
        if let Some(min_words) = self.min_words {
            config.min_words = min_words;
        }
        if let Some(max_words) = self.max_words {
            config.max_words = max_words;
        }
        if let Some(reply) = self.reply_fraction {
            config.reply_fraction = reply;
        }
        if let Some(attachment) = self.attachment_fraction {
            config.attachment_fraction = attachment;
        }
        if let Some(pinned) = self.pinned_fraction {
            config.pinned_fraction = pinned;
        }
        if let Some(admin_boost) = self.admin_boost {
            config.admin_boost = admin_boost;
        }
        if let Some(start) = self.start_date {
            config.start_date = Some(midnight(start));
        }
        match self.anchor_date {
            Some(anchor) => config.anchor_date = Some(midnight(anchor)),
            None if config.anchor_date.is_none() => {
                config.anchor_date = Some(midnight(Utc::now().date_naive()))
            }
            None => {}
        }

        Ok(config.clamped())
    }

    /// The sender directory selected by the flags.
    pub fn directory(&self) -> Arc<dyn SenderDirectory> {
        if self.no_people {
            Arc::new(EmptyDirectory)
        } else {
            Arc::new(SyntheticPeople::generate(self.people.to_config()))
        }
    }
}

/// Paged view arguments.
#[derive(Args, Clone, Debug)]
pub struct ViewArgs {
    /// Records per page
    #[arg(long, default_value = "200")]
    pub page_size: usize,

    /// Pages kept in the LRU cache (at least 3)
    #[arg(long, default_value = "12")]
    pub cache_pages: usize,

    /// Wrap indices past the end instead of truncating
    #[arg(long)]
    pub wrap: bool,

    /// Serve pages from a materialized pool instead of synthesizing on demand
    #[arg(long)]
    pub materialize: bool,
}

/// Stream emitter arguments.
#[derive(Args, Clone, Debug)]
pub struct StreamArgs {
    /// Records per minute (clamped to 1..=2000)
    #[arg(long, default_value = "45", env = "CHATSIM_RATE")]
    pub rate: u32,

    /// Jitter span in milliseconds; a quarter of the interval when omitted
    #[arg(long)]
    pub jitter_ms: Option<u64>,

    /// Index of the first streamed record
    #[arg(long, default_value = "0")]
    pub start_index: u64,

    /// Seed of the emitter's jitter generator
    #[arg(long, default_value = "1592590900")]
    pub stream_seed: u32,

    /// Stop after this many records; runs until Ctrl-C when omitted
    #[arg(long)]
    pub count: Option<u64>,

    /// Render this many leading records up front
    #[arg(long, default_value = "0")]
    pub inject: usize,

    /// Probability a record is preceded by a typing signal
    #[arg(long, default_value = "0")]
    pub typing_fraction: f64,
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Commands {
        let mut argv = vec!["chatsim"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv).command
    }

    #[test]
    fn test_overrides_and_anchor() {
        let Commands::Generate { common, .. } = parse(&[
            "generate",
            "--size",
            "60",
            "--seed-base",
            "7",
            "--reply-fraction",
            "2.0",
            "--anchor-date",
            "2024-06-01",
        ]) else {
            panic!("expected generate");
        };
        let config = common.to_config().unwrap();
        assert_eq!(config.size, 60);
        assert_eq!(config.seed_base, 7);
        assert_eq!(config.reply_fraction, 1.0);
        assert_eq!(
            config.anchor_date.unwrap().to_rfc3339(),
            "2024-06-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_config_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.yaml");
        std::fs::write(
            &path,
            "size: 500\nseedBase: 11\nanchorDate: 2023-01-01T00:00:00Z\n",
        )
        .unwrap();

        let Commands::Export { common, .. } = parse(&[
            "export",
            "--config",
            path.to_str().unwrap(),
            "--size",
            "10",
        ]) else {
            panic!("expected export");
        };
        let config = common.to_config().unwrap();
        // flag wins, then clamped
        assert_eq!(config.size, 50);
        assert_eq!(config.seed_base, 11);
        assert_eq!(
            config.anchor_date.unwrap().to_rfc3339(),
            "2023-01-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_missing_config_file() {
        let Commands::Generate { common, .. } =
            parse(&["generate", "--config", "/nonexistent/chatsim.yaml"])
        else {
            panic!("expected generate");
        };
        let err = common.to_config().unwrap_err();
        assert!(format!("{err:#}").contains("Failed to load pool config"));
    }

    #[test]
    fn test_view_and_stream_defaults() {
        let Commands::Page { view, pages, .. } = parse(&["page"]) else {
            panic!("expected page");
        };
        assert_eq!(view.page_size, 200);
        assert_eq!(view.cache_pages, 12);
        assert!(!view.wrap);
        assert_eq!(pages, 1);

        let Commands::Stream { stream, .. } = parse(&["stream", "--count", "3"]) else {
            panic!("expected stream");
        };
        assert_eq!(stream.rate, 45);
        assert_eq!(stream.count, Some(3));
        assert_eq!(stream.jitter_ms, None);
    }
}
