//! Timer-driven streaming of chatsim records.
//!
//! - [`Scheduler`] / [`TimerHandle`] - schedule-and-cancel abstraction with a
//!   tokio implementation and a virtual-clock [`ManualScheduler`]
//! - [`Renderer`] / [`TypingSignal`] - output collaborators, injected once
//! - [`Emitter`] - emits one record per tick at a rate with jitter
//! - [`inject_initial`] - renders the head of a source in one go
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use chatsim_core::{EmptyDirectory, PoolConfig};
//! use chatsim_pool::MessagePool;
//! use chatsim_stream::{Emitter, ManualScheduler, StreamOptions};
//!
//! let config = PoolConfig::default().with_size(50);
//! let pool = Arc::new(MessagePool::materialize(config, Arc::new(EmptyDirectory)));
//! let clock = ManualScheduler::new();
//!
//! let emitter = Emitter::builder(pool, Arc::new(clock.clone()))
//!     .options(StreamOptions::default().with_rate(60).with_jitter_ms(0))
//!     .build();
//! emitter.start();
//! clock.advance(Duration::from_secs(3));
//! emitter.stop();
//! assert_eq!(emitter.cursor(), 3);
//! ```

pub mod emitter;
pub mod inject;
pub mod render;
pub mod scheduler;

pub use emitter::{
    base_interval_ms, EmitObserver, Emitter, EmitterBuilder, StreamOptions, TypingOptions,
};
pub use inject::{inject_initial, InjectSummary, DEFAULT_INJECT_COUNT};
pub use render::{
    render_guarded, JsonLinesRenderer, LogTyping, NoopRenderer, NoopTyping, RenderError, Renderer,
    TypingSignal,
};
pub use scheduler::{ManualScheduler, Scheduler, Task, TimerHandle, TokioScheduler};
