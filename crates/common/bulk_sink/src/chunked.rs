use crate::store::RecordStore;
use async_trait::async_trait;
use batcher::BatchSink;
use batcher::SinkError;
use futures::future::try_join_all;
use std::sync::Arc;

/// Rejected chunk size, reported at construction.
#[derive(thiserror::Error, Debug, Eq, PartialEq)]
#[error("chunk_size must be at least 1")]
pub struct InvalidChunkSize;

/// Re-partitions each batch into fixed-size chunks and writes the records
/// of a chunk concurrently, awaiting the whole chunk before starting the
/// next one.
///
/// In-flight writes against the store never exceed one chunk's worth. A
/// failed chunk fails the whole delivery; the remaining chunks are not
/// attempted.
pub struct ChunkedBulkSink<S> {
    store: Arc<S>,
    chunk_size: usize,
}

impl<S> ChunkedBulkSink<S> {
    pub fn new(store: Arc<S>, chunk_size: usize) -> Result<ChunkedBulkSink<S>, InvalidChunkSize> {
        if chunk_size == 0 {
            return Err(InvalidChunkSize);
        }

        Ok(ChunkedBulkSink { store, chunk_size })
    }
}

#[async_trait]
impl<S: RecordStore> BatchSink<S::Record> for ChunkedBulkSink<S> {
    async fn deliver(&self, batch: Vec<S::Record>) -> Result<(), SinkError> {
        let mut records = batch.into_iter();
        loop {
            let chunk: Vec<_> = records.by_ref().take(self.chunk_size).collect();
            if chunk.is_empty() {
                break;
            }

            // The trailing partial chunk takes this same path, so every
            // write is awaited before the delivery reports completion.
            let writes = chunk.into_iter().map(|record| self.store.insert_one(record));
            try_join_all(writes).await?;
        }

        Ok(())
    }
}
