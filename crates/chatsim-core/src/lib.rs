//! Core types for the chatsim synthetic message generator.
//!
//! This crate holds the data model shared by the generator, pool and stream
//! crates:
//!
//! - [`Record`] - one synthesized chat message, with its [`Sender`] fields,
//!   optional [`Attachment`] and backward `reply_to` reference
//! - [`PoolConfig`] - generation configuration, clamped to documented bounds
//! - [`SenderDirectory`] - read-only, indexable list of senders consumed by
//!   the synthesizer
//!
//! Everything downstream is a pure function of these inputs: the same
//! `PoolConfig` and directory always yield the same records.

pub mod config;
pub mod directory;
pub mod error;
pub mod record;

pub use config::{PoolConfig, DEFAULT_ANCHOR_MILLIS, MAX_POOL_SIZE, MIN_POOL_SIZE};
pub use directory::{EmptyDirectory, SenderDirectory};
pub use error::CoreError;
pub use record::{parse_record_id, record_id, Attachment, Record, Role, Sender};
