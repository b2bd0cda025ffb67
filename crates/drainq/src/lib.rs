//! Bounded, cancellable task distribution for Tokio.
//!
//! A single producer feeds items into a fixed-capacity queue; a fixed pool of
//! worker loops drains it in parallel, each handing tasks to caller-supplied
//! [`Worker`] logic. Items can optionally be grouped into fixed-size chunks,
//! workers can be paced to respect downstream rate limits, and the whole
//! pipeline supports cooperative cancellation and a graceful drain.
//!
//! ```text
//! enqueue ─▶ [ChunkAggregator] ─▶ bounded queue ─┬─▶ worker # 0 ─▶ Worker::process
//!                                                ├─▶ worker # 1 ─▶ Worker::process
//!                                                └─▶ worker # N ─▶ Worker::process
//! ```
//!
//! ## Features
//!
//! - `tracing` (default): lifecycle, progress and summary events via
//!   [`tracing`](https://docs.rs/tracing).
//! - `serde`: `Serialize`/`Deserialize` for [`QueueConfig`].
//! - `cache-padded`: pads the shared progress counters to a cache line.

mod chunk;
mod config;
mod error;
mod manager;
mod queue;
mod stats;
mod task;
mod worker;

pub use crate::chunk::*;
pub use crate::config::*;
pub use crate::error::*;
pub use crate::manager::*;
pub use crate::stats::StatsSnapshot;
pub use crate::task::*;
pub use crate::worker::Worker;
pub use tokio_util::sync::CancellationToken;
