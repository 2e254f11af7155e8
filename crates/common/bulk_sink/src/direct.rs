use crate::store::RecordStore;
use async_trait::async_trait;
use batcher::BatchSink;
use batcher::SinkError;
use std::sync::Arc;

/// Hands each batch to the store as a single unordered bulk write.
pub struct DirectBulkSink<S> {
    store: Arc<S>,
}

impl<S> DirectBulkSink<S> {
    pub fn new(store: Arc<S>) -> DirectBulkSink<S> {
        DirectBulkSink { store }
    }
}

#[async_trait]
impl<S: RecordStore> BatchSink<S::Record> for DirectBulkSink<S> {
    async fn deliver(&self, batch: Vec<S::Record>) -> Result<(), SinkError> {
        self.store.insert_many(batch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;

    #[tokio::test]
    async fn delivers_the_whole_batch_in_one_write() {
        let store: Arc<InMemoryStore<u32, u32>> = Arc::new(InMemoryStore::new());
        let sink = DirectBulkSink::new(Arc::clone(&store));

        sink.deliver(vec![1, 2, 3]).await.unwrap();

        assert_eq!(store.records(), vec![1, 2, 3]);
    }
}
