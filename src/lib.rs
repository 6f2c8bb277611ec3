//! chatsim library
//!
//! Command-line front end over the chatsim crates:
//!
//! - `chatsim_core` - record model and pool configuration
//! - `chatsim_generator` - deterministic synthesizer and sender directory
//! - `chatsim_pool` - materialized pools and paged LRU views
//! - `chatsim_stream` - timer-driven emission
//!
//! # CLI Usage
//!
//! ```bash
//! # Materialize 50k records and print generation statistics
//! chatsim generate --size 50000 --seed-base 4000
//!
//! # Export records 100..200 as JSON
//! chatsim export --size 1000 --start 100 --end 200 -o slice.json
//!
//! # Read two pages of 50 lazily, wrapping past the end
//! chatsim page --size 1000 --page-size 50 --start 980 --pages 2 --wrap
//!
//! # Stream 20 records at 120/min as JSON lines
//! chatsim stream --size 5000 --rate 120 --count 20
//! ```

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, CommonGenerateArgs, PeopleArgs, StreamArgs, ViewArgs};
