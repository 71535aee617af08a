pub mod fields;
pub mod import;
pub mod ingest;
pub mod row;

pub use crate::domain::model::{BatchResult, CleanRecord, RawRecord, SubmissionOutcome, Verdict};
pub use crate::domain::ports::ContactStore;
pub use crate::utils::error::Result;
