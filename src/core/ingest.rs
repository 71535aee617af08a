use crate::core::row::{self, Intake};
use crate::domain::model::{BatchResult, RawRecord, RowRejection, SubmissionOutcome, Verdict};
use crate::domain::ports::ContactStore;
use crate::utils::error::Result;
use std::sync::Arc;

/// Validates raw records and hands the accepted ones to a [`ContactStore`].
#[derive(Clone)]
pub struct Ingestor {
    store: Arc<dyn ContactStore>,
}

impl Ingestor {
    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self { store }
    }

    /// Single form submission. A rejection never reaches the store; a store
    /// failure comes back as `Err`, separate from a rejection.
    pub async fn ingest_one(&self, raw: RawRecord) -> Result<SubmissionOutcome> {
        match row::validate(&raw, Intake::Form) {
            Verdict::Rejected(errors) => {
                tracing::debug!("Submission rejected with {} error(s)", errors.len());
                Ok(SubmissionOutcome {
                    accepted: false,
                    errors,
                    inserted_count: 0,
                })
            }
            Verdict::Accepted(clean) => {
                self.store.insert_one(&clean).await?;
                tracing::debug!("Submission stored");
                Ok(SubmissionOutcome {
                    accepted: true,
                    errors: Vec::new(),
                    inserted_count: 1,
                })
            }
        }
    }

    /// CSV batch: validates every row in order, then stores the accepted rows
    /// with one `insert_many` call. A store failure fails the whole batch.
    pub async fn ingest_many<I>(&self, rows: I) -> Result<BatchResult>
    where
        I: IntoIterator<Item = RawRecord>,
    {
        self.try_ingest_many(rows.into_iter().map(Ok)).await
    }

    /// Like [`Ingestor::ingest_many`] for sources that can fail mid-read; the
    /// first read error aborts the batch before anything is stored.
    pub async fn try_ingest_many<I>(&self, rows: I) -> Result<BatchResult>
    where
        I: IntoIterator<Item = Result<RawRecord>>,
    {
        let mut result = BatchResult::default();
        let mut accepted = Vec::new();

        for (index, raw) in rows.into_iter().enumerate() {
            let row_number = index + 1;
            match row::validate(&raw?, Intake::Csv) {
                Verdict::Accepted(clean) => {
                    result.valid_count += 1;
                    accepted.push(clean);
                }
                Verdict::Rejected(errors) => {
                    result.invalid_count += 1;
                    let rejection = RowRejection {
                        row: row_number,
                        errors,
                    };
                    tracing::warn!("{}", rejection);
                    result.rejections.push(rejection);
                }
            }
        }

        if accepted.is_empty() {
            tracing::debug!("No valid rows, skipping insert");
            return Ok(result);
        }

        tracing::debug!("Inserting {} valid rows in one batch", accepted.len());
        result.inserted_count = self.store.insert_many(&accepted).await?;
        Ok(result)
    }
}
