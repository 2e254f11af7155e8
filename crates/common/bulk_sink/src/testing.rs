use crate::store::RecordStore;
use async_trait::async_trait;
use batcher::SinkError;
use std::hash::Hash;
use std::sync::Mutex;

/// A store that records the shape of every write it receives.
pub struct ProbeStore<R, K> {
    records: Mutex<Vec<R>>,
    increment_calls: Mutex<Vec<Vec<(K, u64)>>>,
}

impl<R, K> ProbeStore<R, K> {
    pub fn new() -> ProbeStore<R, K> {
        ProbeStore {
            records: Mutex::new(Vec::new()),
            increment_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn increment_calls(&self) -> Vec<Vec<(K, u64)>>
    where
        K: Clone,
    {
        self.increment_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl<R, K> RecordStore for ProbeStore<R, K>
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
        self.increment_calls.lock().unwrap().push(deltas);
        Ok(())
    }
}
