use crate::core::ingest::Ingestor;
use crate::core::{BatchResult, RawRecord};
use crate::utils::error::Result;

/// Drives one CSV run: ingest every row, then report the counts.
pub struct ImportEngine {
    ingestor: Ingestor,
}

impl ImportEngine {
    pub fn new(ingestor: Ingestor) -> Self {
        Self { ingestor }
    }

    pub async fn run<I>(&self, rows: I) -> Result<BatchResult>
    where
        I: IntoIterator<Item = Result<RawRecord>>,
    {
        tracing::info!("Starting CSV import...");

        let result = self.ingestor.try_ingest_many(rows).await?;

        tracing::info!("CSV import complete.");
        tracing::info!("Valid rows: {}", result.valid_count);
        tracing::info!("Invalid rows: {}", result.invalid_count);
        tracing::info!("Inserted rows: {}", result.inserted_count);

        Ok(result)
    }
}
