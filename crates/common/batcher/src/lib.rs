//! Collect a stream of items into batches for bulk delivery.
//!
//! A [`BatchExecutor`] buffers pushed items and hands them to a sink as one
//! batch, either as soon as the buffer reaches its capacity or once a quiet
//! window has elapsed since the first buffered item. Sink invocations are
//! serialized: a batch is never delivered while a previous delivery is still
//! in flight.

mod config;
mod error;
mod executor;
mod sink;

pub use crate::config::BatchConfig;
pub use crate::config::BatchConfigBuilder;
pub use crate::config::BuildableBatchConfigBuilder;
pub use crate::config::SizedBatchConfigBuilder;
pub use crate::error::FlushError;
pub use crate::error::InvalidBatchConfig;
pub use crate::executor::BatchExecutor;
pub use crate::sink::BatchSink;
pub use crate::sink::FnSink;
pub use crate::sink::SinkError;
