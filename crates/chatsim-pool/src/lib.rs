//! Pool materialization and paged views over chatsim records.
//!
//! Two independent ways to reach a record:
//!
//! - [`MessagePool`] materializes the whole sequence eagerly, suppressing
//!   near-duplicate adjacent text with a [`DedupRing`], and indexes it by id.
//! - [`PagedView`] serves any index lazily, caching recently used pages with
//!   strict LRU eviction. It can sit on top of a pool or synthesize on demand.
//!
//! Both implement [`RecordSource`], the read interface used by the stream
//! emitter.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use chatsim_core::{EmptyDirectory, PoolConfig};
//! use chatsim_pool::{MessagePool, PagedView, ViewOptions};
//!
//! let config = PoolConfig::default().with_size(50).with_span_days(30);
//! let pool = Arc::new(MessagePool::materialize(config, Arc::new(EmptyDirectory)));
//!
//! let view = PagedView::over_pool(pool.clone(), ViewOptions::new(10, 3));
//! let page = view.next_page(20);
//! assert_eq!(page.len(), 10);
//! assert_eq!(page[0], pool.records()[20]);
//! ```

pub mod dedup;
pub mod error;
pub mod pool;
pub mod source;
pub mod view;

pub use dedup::{DedupPolicy, DedupRing};
pub use error::PoolError;
pub use pool::{
    estimate_for_duration, materialize_in_background, DurationEstimate, EstimateParams,
    MaterializeStats, MessagePool,
};
pub use source::RecordSource;
pub use view::{Backing, PagedView, ViewInfo, ViewOptions};
