use crate::core::fields;
use crate::domain::model::{CleanRecord, Field, FieldError, RawRecord, Verdict};

/// Where a raw record came from, which decides the column feeding each field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intake {
    /// Web form: `first_name, second_name, email, phone, eir_code`.
    Form,
    /// CSV file: `first_name, last_name, email, phone, eir_code`.
    Csv,
}

impl Intake {
    pub fn column(self, field: Field) -> &'static str {
        match (self, field) {
            (Intake::Csv, Field::SecondName) => "last_name",
            (_, field) => field.name(),
        }
    }
}

fn passes(field: Field, value: &str) -> bool {
    match field {
        Field::FirstName | Field::SecondName => fields::is_name(value),
        Field::Email => fields::is_email(value),
        Field::Phone => fields::is_phone(value),
        Field::EirCode => fields::is_postal_code(value),
    }
}

/// Judges one record. Every failing field is reported, in field order.
pub fn validate(raw: &RawRecord, intake: Intake) -> Verdict {
    let mut errors = Vec::new();
    let values = Field::ALL.map(|field| {
        let value = raw.text(intake.column(field)).trim().to_string();
        if !passes(field, &value) {
            errors.push(FieldError::new(field));
        }
        value
    });

    if !errors.is_empty() {
        return Verdict::Rejected(errors);
    }

    let [first_name, second_name, email, phone, eir_code] = values;
    Verdict::Accepted(CleanRecord {
        first_name,
        second_name,
        email,
        phone,
        eir_code,
    })
}
