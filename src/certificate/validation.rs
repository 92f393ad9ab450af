//! Roster validation.
//!
//! Columns are checked once per batch against the header row; field values
//! are checked per record. A record failing the field check is skipped with
//! the reason [`MISSING_DATA`].

use std::fmt;

use super::record::{
    Record, COURSE_DATE, COURSE_DESCRIPTION, COURSE_NAME, PERSON_NAME, REQUIRED_COLUMNS,
};

/// Failure reason reported for rows with blank required fields.
pub const MISSING_DATA: &str = "Missing data";

/// Result of validating a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Invalid(String),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Validation error for a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Column the error refers to
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create error for empty required field
    pub fn empty_field(field: &str) -> Self {
        Self::new(field, format!("{} must not be empty", field))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors for one record.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    /// Names of the offending fields, in the order they were checked.
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Validate that a string is not empty after trimming
pub fn validate_required(value: &str, field: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::empty_field(field));
    }
}

/// Collect every field-level problem of a record.
pub fn record_errors(record: &Record) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    validate_required(&record.person_name, PERSON_NAME, &mut errors);
    validate_required(&record.course_name, COURSE_NAME, &mut errors);
    validate_required(&record.course_description, COURSE_DESCRIPTION, &mut errors);
    validate_required(&record.course_date, COURSE_DATE, &mut errors);

    errors
}

/// Check that every required field of a record carries a value.
pub fn validate_record(record: &Record) -> ValidationOutcome {
    let errors = record_errors(record);
    if errors.is_empty() {
        ValidationOutcome::Valid
    } else {
        log::debug!("Record failed validation: {}", errors);
        ValidationOutcome::Invalid(MISSING_DATA.to_string())
    }
}

/// Required columns absent from `headers`, in canonical order.
pub fn missing_columns<S: AsRef<str>>(headers: &[S]) -> Vec<&'static str> {
    REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|required| !headers.iter().any(|h| h.as_ref() == *required))
        .collect()
}
