//! Deterministic record synthesizer for chatsim.
//!
//! Every record is a pure function of its index and the [`PoolConfig`]:
//! a fresh [`XorShift32`] is seeded with `seedBase + index * 15721` and the
//! synthesizer consumes its draws in a fixed order. Reordering any draw
//! changes the output, so the order is part of the contract.
//!
//! # Architecture
//!
//! ```text
//! PoolConfig + SenderDirectory
//!        │
//!        ▼
//! ┌─────────────────────┐
//! │    Synthesizer      │
//! │                     │
//! │  index ─► XorShift32│
//! │  sender, market,    │
//! │  text, attachment,  │
//! │  reply, pinned, ts  │
//! └─────────┬───────────┘
//!           │
//!           ▼
//!   Record { id: "msg_{index+1}", .. }
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use chatsim_core::PoolConfig;
//! use chatsim_generator::{Synthesizer, SyntheticPeople, PeopleConfig};
//!
//! let people = SyntheticPeople::generate(PeopleConfig::default());
//! let config = PoolConfig::default().with_size(1000);
//! let synthesizer = Synthesizer::new(config, Arc::new(people));
//!
//! let record = synthesizer.record_at(10);
//! assert_eq!(record.id, "msg_11");
//! assert_eq!(record, synthesizer.record_at(10));
//! ```
//!
//! [`PoolConfig`]: chatsim_core::PoolConfig

pub mod generators;
pub mod hash;
pub mod people;
pub mod rng;
pub mod synthesizer;
pub mod vocab;

// Re-exports for convenience
pub use hash::content_hash;
pub use people::{PeopleConfig, SyntheticPeople};
pub use rng::XorShift32;
pub use synthesizer::{index_seed, Synthesizer, INDEX_SEED_STRIDE};
