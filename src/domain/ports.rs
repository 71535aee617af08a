use crate::domain::model::CleanRecord;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Persistence collaborator for validated contacts.
///
/// Implementations own their connection handling; callers issue at most one
/// outstanding call per ingestion.
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn insert_one(&self, record: &CleanRecord) -> Result<()>;

    /// Inserts every record or none. An empty slice returns `Ok(0)` without
    /// touching storage.
    async fn insert_many(&self, records: &[CleanRecord]) -> Result<u64>;

    /// Liveness probe used by the health endpoint and `check-db`.
    async fn check_connection(&self) -> Result<bool> {
        Ok(true)
    }
}
