pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliArgs, Command};

pub use adapters::{csv_source::CsvSource, memory::MemoryStore, mysql::MySqlStore};
pub use config::AppConfig;
pub use crate::core::{import::ImportEngine, ingest::Ingestor, row::Intake};
pub use domain::model::{
    BatchResult, CleanRecord, FieldError, RawRecord, SubmissionOutcome, Verdict,
};
pub use domain::ports::ContactStore;
pub use utils::error::{IntakeError, Result};
