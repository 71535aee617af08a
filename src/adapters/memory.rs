use crate::domain::model::CleanRecord;
use crate::domain::ports::ContactStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

/// In-process store for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<CleanRecord>>,
    batch_calls: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<CleanRecord> {
        self.records.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    /// Number of `insert_many` calls that reached storage.
    pub async fn batch_calls(&self) -> usize {
        *self.batch_calls.lock().await
    }
}

#[async_trait]
impl ContactStore for MemoryStore {
    async fn insert_one(&self, record: &CleanRecord) -> Result<()> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }

    async fn insert_many(&self, records: &[CleanRecord]) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        *self.batch_calls.lock().await += 1;
        self.records.lock().await.extend_from_slice(records);
        Ok(records.len() as u64)
    }
}
