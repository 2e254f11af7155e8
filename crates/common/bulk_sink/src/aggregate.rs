use crate::store::RecordStore;
use async_trait::async_trait;
use batcher::BatchSink;
use batcher::SinkError;
use std::collections::HashMap;
use std::sync::Arc;

/// Collapses each batch by key before writing: `n` items sharing a key
/// become a single increment of magnitude `n`.
///
/// The aggregation is order-independent and exact; summed over all keys,
/// the written magnitudes equal the batch length.
pub struct AggregateSink<S, F> {
    store: Arc<S>,
    key_of: F,
}

impl<S, F> AggregateSink<S, F> {
    pub fn new(store: Arc<S>, key_of: F) -> AggregateSink<S, F> {
        AggregateSink { store, key_of }
    }
}

#[async_trait]
impl<B, S, F> BatchSink<B> for AggregateSink<S, F>
where
    B: Send + 'static,
    S: RecordStore,
    F: Fn(&B) -> S::Key + Send + Sync + 'static,
{
    async fn deliver(&self, batch: Vec<B>) -> Result<(), SinkError> {
        let mut counts: HashMap<S::Key, u64> = HashMap::new();
        for item in &batch {
            *counts.entry((self.key_of)(item)).or_insert(0) += 1;
        }

        self.store.increment_many(counts.into_iter().collect()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ProbeStore;

    #[tokio::test]
    async fn collapses_repeated_keys_into_one_delta() {
        let store: Arc<ProbeStore<u32, i64>> = Arc::new(ProbeStore::new());
        let sink = AggregateSink::new(Arc::clone(&store), |item: &i64| *item);

        sink.deliver(vec![1, 1, 2]).await.unwrap();

        let calls = store.increment_calls();
        assert_eq!(calls.len(), 1);

        let mut deltas = calls[0].clone();
        deltas.sort_unstable();
        assert_eq!(deltas, vec![(1, 2), (2, 1)]);
    }

    #[tokio::test]
    async fn magnitudes_sum_to_the_batch_length() {
        let store: Arc<ProbeStore<u32, u32>> = Arc::new(ProbeStore::new());
        let sink = AggregateSink::new(Arc::clone(&store), |item: &u32| item % 3);

        let batch: Vec<u32> = (0..17).collect();
        sink.deliver(batch).await.unwrap();

        let total: u64 = store.increment_calls()[0].iter().map(|(_, n)| n).sum();
        assert_eq!(total, 17);
    }
}
