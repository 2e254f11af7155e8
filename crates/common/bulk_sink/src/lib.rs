//! Sink strategies that turn batches into backing-store writes.
//!
//! Every strategy implements [`batcher::BatchSink`] over the write
//! primitives of a [`RecordStore`]:
//!
//! - [`DirectBulkSink`] hands the whole batch to one unordered bulk write.
//! - [`IncrementSink`] issues one counter increment per item, in a single
//!   unordered pass.
//! - [`AggregateSink`] collapses items sharing a key into one increment of
//!   the combined magnitude.
//! - [`ChunkedBulkSink`] writes fixed-size chunks of individual records,
//!   each chunk concurrently, one chunk at a time.

mod aggregate;
mod chunked;
mod direct;
mod increment;
mod memory;
mod store;
#[cfg(test)]
mod testing;

pub use crate::aggregate::AggregateSink;
pub use crate::chunked::ChunkedBulkSink;
pub use crate::chunked::InvalidChunkSize;
pub use crate::direct::DirectBulkSink;
pub use crate::increment::IncrementSink;
pub use crate::memory::InMemoryStore;
pub use crate::store::RecordStore;
