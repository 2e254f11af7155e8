use crate::store::RecordStore;
use async_trait::async_trait;
use batcher::SinkError;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

/// A [`RecordStore`] keeping everything in process memory.
///
/// Stands in for a real backing store in tests and benchmark deployments;
/// writes never fail.
pub struct InMemoryStore<R, K> {
    records: Mutex<Vec<R>>,
    counters: Mutex<HashMap<K, u64>>,
}

impl<R, K> InMemoryStore<R, K> {
    pub fn new() -> InMemoryStore<R, K> {
        InMemoryStore {
            records: Mutex::new(Vec::new()),
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Number of records written so far.
    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Number of distinct counters created so far.
    pub fn counter_count(&self) -> usize {
        self.counters.lock().unwrap().len()
    }

    /// Current value of one counter.
    pub fn counter_value(&self, key: &K) -> Option<u64>
    where
        K: Eq + Hash,
    {
        self.counters.lock().unwrap().get(key).copied()
    }

    /// Snapshot of the stored records.
    pub fn records(&self) -> Vec<R>
    where
        R: Clone,
    {
        self.records.lock().unwrap().clone()
    }
}

impl<R, K> Default for InMemoryStore<R, K> {
    fn default() -> InMemoryStore<R, K> {
        InMemoryStore::new()
    }
}

#[async_trait]
impl<R, K> RecordStore for InMemoryStore<R, K>
where
    R: Send + 'static,
    K: Eq + Hash + Send + 'static,
{
    type Record = R;
    type Key = K;

    async fn insert_one(&self, record: R) -> Result<(), SinkError> {
        self.records.lock().unwrap().push(record);
        Ok(())
    }

    async fn insert_many(&self, records: Vec<R>) -> Result<(), SinkError> {
        self.records.lock().unwrap().extend(records);
        Ok(())
    }

    async fn increment_many(&self, deltas: Vec<(K, u64)>) -> Result<(), SinkError> {
        let mut counters = self.counters.lock().unwrap();
        for (key, delta) in deltas {
            *counters.entry(key).or_insert(0) += delta;
        }

        Ok(())
    }
}
