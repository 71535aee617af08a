use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Unvalidated input from a form submission or one CSV row.
///
/// Keys are normalized on construction (trimmed, ASCII lowercase) so header
/// spelling like ` First_Name` still lines up with the logical field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub data: HashMap<String, serde_json::Value>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<serde_json::Value>) {
        self.data.insert(normalize_key(key), value.into());
    }

    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// String form of a field: missing and null become "", numbers and
    /// booleans use their literal text. The value is not trimmed here.
    pub fn text(&self, key: &str) -> String {
        match self.data.get(key) {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => number_text(n),
            Some(other) => other.to_string(),
        }
    }
}

impl<K: AsRef<str>, V: Into<serde_json::Value>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut record = RawRecord::new();
        for (key, value) in iter {
            record.insert(key.as_ref(), value);
        }
        record
    }
}

/// Whole floats print without a fraction, so `8712345678.0` reads as `8712345678`.
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => f.to_string(),
        _ => n.to_string(),
    }
}

fn normalize_key(key: &str) -> String {
    key.trim_start_matches('\u{feff}').trim().to_ascii_lowercase()
}

/// A contact whose five fields all passed validation, already trimmed.
///
/// Only the row validator builds these, so holding one means every field is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanRecord {
    pub(crate) first_name: String,
    pub(crate) second_name: String,
    pub(crate) email: String,
    pub(crate) phone: String,
    pub(crate) eir_code: String,
}

impl CleanRecord {
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn second_name(&self) -> &str {
        &self.second_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn eir_code(&self) -> &str {
        &self.eir_code
    }

    /// Form-shaped raw record carrying the same values.
    pub fn to_raw(&self) -> RawRecord {
        RawRecord::new()
            .with("first_name", self.first_name.as_str())
            .with("second_name", self.second_name.as_str())
            .with("email", self.email.as_str())
            .with("phone", self.phone.as_str())
            .with("eir_code", self.eir_code.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FirstName,
    SecondName,
    Email,
    Phone,
    EirCode,
}

impl Field {
    /// Validation order, also the order of reported errors.
    pub const ALL: [Field; 5] = [
        Field::FirstName,
        Field::SecondName,
        Field::Email,
        Field::Phone,
        Field::EirCode,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::FirstName => "first_name",
            Field::SecondName => "second_name",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::EirCode => "eir_code",
        }
    }

    pub fn rule(self) -> &'static str {
        match self {
            Field::FirstName | Field::SecondName => {
                "must be alphanumeric and between 1 and 20 characters"
            }
            Field::Email => "must be a valid email address",
            Field::Phone => "must be exactly 10 digits (numbers only)",
            Field::EirCode => "must be 6 alphanumeric characters starting with a number",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Field) -> Self {
        Self {
            field,
            message: format!("{} {}", field.name(), field.rule()),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted(CleanRecord),
    Rejected(Vec<FieldError>),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted(_))
    }
}

/// A rejected CSV row; `row` counts data rows from 1, header excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowRejection {
    pub row: usize,
    pub errors: Vec<FieldError>,
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {} failed: {}", self.row, join_messages(&self.errors))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub valid_count: usize,
    pub invalid_count: usize,
    pub inserted_count: u64,
    pub rejections: Vec<RowRejection>,
}

/// Result of a single form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionOutcome {
    pub accepted: bool,
    pub errors: Vec<FieldError>,
    pub inserted_count: u64,
}

pub fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
