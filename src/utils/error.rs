use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Input not found: {path}")]
    InputNotFound { path: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

pub type Result<T> = std::result::Result<T, IntakeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Configuration,
    Storage,
    Input,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IntakeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            IntakeError::DatabaseError(_) | IntakeError::StorageError { .. } => {
                ErrorCategory::Storage
            }
            IntakeError::ConfigError { .. }
            | IntakeError::ConfigValidationError { .. }
            | IntakeError::InvalidConfigValueError { .. }
            | IntakeError::MissingConfigError { .. } => ErrorCategory::Configuration,
            IntakeError::CsvError(_) | IntakeError::InputNotFound { .. } => ErrorCategory::Input,
            IntakeError::IoError(_) => ErrorCategory::System,
            IntakeError::ValidationError { .. } => ErrorCategory::Validation,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::Low,
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// True for failures of the storage collaborator, which callers report as
    /// "storage unavailable" rather than "bad input".
    pub fn is_storage(&self) -> bool {
        self.category() == ErrorCategory::Storage
    }

    pub fn storage(message: impl Into<String>) -> Self {
        IntakeError::StorageError {
            message: message.into(),
        }
    }

    /// A submission that could not be read as a record at all.
    pub fn validation(message: impl Into<String>) -> Self {
        IntakeError::ValidationError {
            message: message.into(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            IntakeError::CsvError(e) => format!("The CSV file could not be read: {}", e),
            IntakeError::IoError(e) => format!("A file or network operation failed: {}", e),
            IntakeError::DatabaseError(e) => format!("The database rejected the request: {}", e),
            IntakeError::StorageError { message } => {
                format!("Storage is unavailable: {}", message)
            }
            IntakeError::ConfigError { message } => format!("Invalid configuration: {}", message),
            IntakeError::ConfigValidationError { field, message } => {
                format!("Configuration field '{}' is invalid: {}", field, message)
            }
            IntakeError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration field '{}' is invalid: {}", field, reason)
            }
            IntakeError::MissingConfigError { field } => {
                format!("Configuration field '{}' is required", field)
            }
            IntakeError::InputNotFound { path } => format!("CSV not found at: {}", path),
            IntakeError::ValidationError { message } => {
                format!("The submission could not be read: {}", message)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            IntakeError::CsvError(_) => {
                "Check that the file has the header first_name,last_name,email,phone,eir_code"
            }
            IntakeError::IoError(_) => "Check file permissions and that the address is free",
            IntakeError::DatabaseError(_) | IntakeError::StorageError { .. } => {
                "Check that the database is running and the credentials are correct"
            }
            IntakeError::ConfigError { .. }
            | IntakeError::ConfigValidationError { .. }
            | IntakeError::InvalidConfigValueError { .. }
            | IntakeError::MissingConfigError { .. } => {
                "Review the configuration file and the DB_* environment variables"
            }
            IntakeError::InputNotFound { .. } => "Pass the CSV location with --csv",
            IntakeError::ValidationError { .. } => {
                "Send the fields first_name, second_name, email, phone and eir_code"
            }
        }
    }
}
