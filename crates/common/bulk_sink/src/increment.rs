use crate::store::RecordStore;
use async_trait::async_trait;
use batcher::BatchSink;
use batcher::SinkError;
use std::sync::Arc;

/// Issues one counter increment per batched item, all in a single
/// unordered pass over the store.
///
/// Repeated keys are not collapsed; see [`AggregateSink`](crate::AggregateSink)
/// for the variant that is.
pub struct IncrementSink<S, F> {
    store: Arc<S>,
    key_of: F,
}

impl<S, F> IncrementSink<S, F> {
    pub fn new(store: Arc<S>, key_of: F) -> IncrementSink<S, F> {
        IncrementSink { store, key_of }
    }
}

#[async_trait]
impl<B, S, F> BatchSink<B> for IncrementSink<S, F>
where
    B: Send + 'static,
    S: RecordStore,
    F: Fn(&B) -> S::Key + Send + Sync + 'static,
{
    async fn deliver(&self, batch: Vec<B>) -> Result<(), SinkError> {
        let deltas = batch.iter().map(|item| ((self.key_of)(item), 1)).collect();
        self.store.increment_many(deltas).await
    }
}
