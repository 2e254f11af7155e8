use async_trait::async_trait;
use batcher::SinkError;
use std::hash::Hash;

/// The write primitives a bulk sink dispatches to.
///
/// Implementations abstract the backing store; the sink strategies never
/// see anything below these three calls.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    type Record: Send + 'static;
    type Key: Eq + Hash + Send + 'static;

    /// Write a single record.
    async fn insert_one(&self, record: Self::Record) -> Result<(), SinkError>;

    /// Write a set of records in one call.
    ///
    /// The write is unordered: one record failing must not prevent the
    /// others from being applied.
    async fn insert_many(&self, records: Vec<Self::Record>) -> Result<(), SinkError>;

    /// Apply a set of counter increments in one unordered call, creating
    /// missing counters on first use. Deltas may repeat a key; each one
    /// is applied.
    async fn increment_many(&self, deltas: Vec<(Self::Key, u64)>) -> Result<(), SinkError>;
}
