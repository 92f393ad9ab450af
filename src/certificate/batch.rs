//! Batch orchestration.
//!
//! A batch moves through `Start -> Validated(headers) -> PerRow -> Done`.
//! Column problems and empty rosters stop the batch before any row is
//! touched; everything that goes wrong inside a row is recorded against that
//! row and the loop moves on.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{error, info, warn};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use super::identifier::{IdentifierDeriver, IdentifierError};
use super::record::{Record, Roster};
use super::validation::{missing_columns, validate_record, ValidationOutcome};
use crate::generators::{DocumentRenderer, RenderError, Variant};

/// Batch-level failures. Nothing is rendered when one of these is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("CSV file is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("CSV file is empty or could not be parsed.")]
    EmptyInput,
}

impl BatchError {
    /// Short machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingColumns(_) => "MissingColumns",
            Self::EmptyInput => "EmptyInput",
        }
    }
}

/// Why a single row produced no certificate.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("{0}")]
    Invalid(String),
    #[error("{0}")]
    Identifier(#[from] IdentifierError),
    #[error("{0}")]
    Render(#[from] RenderError),
    #[error("{0}")]
    Unexpected(String),
}

/// Overall outcome of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BatchSummary {
    AllSucceeded,
    PartialSuccess,
    TotalFailure,
    NothingGenerated,
}

impl BatchSummary {
    pub fn classify(has_successes: bool, has_failures: bool) -> Self {
        match (has_successes, has_failures) {
            (true, false) => Self::AllSucceeded,
            (true, true) => Self::PartialSuccess,
            (false, true) => Self::TotalFailure,
            (false, false) => Self::NothingGenerated,
        }
    }
}

/// Successes and failures of one batch, in row order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub processed_rows: usize,
    pub generated: Vec<String>,
    pub failed: Vec<String>,
}

impl BatchResult {
    pub fn summary(&self) -> BatchSummary {
        BatchSummary::classify(!self.generated.is_empty(), !self.failed.is_empty())
    }

    /// User-facing message for the summary.
    pub fn summary_message(&self) -> String {
        match self.summary() {
            BatchSummary::AllSucceeded => "Successfully generated all certificates!".to_string(),
            BatchSummary::PartialSuccess => format!(
                "Successfully generated {} PDF(s), but failed for {} entries. See details below.",
                self.generated.len(),
                self.failed.len()
            ),
            BatchSummary::TotalFailure => {
                "Failed to generate any certificates. See details below.".to_string()
            }
            BatchSummary::NothingGenerated => {
                "No certificates were generated. Please check your CSV data.".to_string()
            }
        }
    }
}

/// Drives validation, identifier derivation and rendering for a roster.
pub struct BatchProcessor {
    deriver: IdentifierDeriver,
    renderer: Arc<dyn DocumentRenderer>,
    output_dir: PathBuf,
}

impl BatchProcessor {
    pub fn new(
        deriver: IdentifierDeriver,
        renderer: Arc<dyn DocumentRenderer>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            deriver,
            renderer,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Process every record of `roster` with the background `variant`.
    pub fn process(&self, roster: &Roster, variant: &str) -> Result<BatchResult, BatchError> {
        if roster.headers().is_empty() && roster.is_empty() {
            warn!("Rejecting batch: roster has neither headers nor rows");
            return Err(BatchError::EmptyInput);
        }

        let missing = missing_columns(roster.headers());
        if !missing.is_empty() {
            let err = BatchError::MissingColumns(missing.into_iter().map(String::from).collect());
            warn!("Rejecting batch: {}", err);
            return Err(err);
        }

        if roster.is_empty() {
            warn!("Rejecting batch: roster has no data rows");
            return Err(BatchError::EmptyInput);
        }

        let variant = Variant::parse(variant);
        info!(
            "Processing {} rows with variant {:?}",
            roster.len(),
            variant
        );

        let mut result = BatchResult {
            processed_rows: roster.len(),
            ..BatchResult::default()
        };

        for (index, record) in roster.records().iter().enumerate() {
            let row = index + 1;
            match self.process_row(record, variant) {
                Ok(file_name) => {
                    info!("Generated certificate: {}", file_name);
                    result.generated.push(file_name);
                }
                Err(err) => {
                    let description =
                        format!("Row {} (Person: {}) - {}", row, record.display_name(), err);
                    match err {
                        RowError::Invalid(_) => {
                            warn!("Skipping row {} due to missing data: {:?}", row, record)
                        }
                        _ => error!("Error generating PDF for row {}: {}", row, err),
                    }
                    result.failed.push(description);
                }
            }
        }

        info!(
            "Batch finished: {} generated, {} failed ({:?})",
            result.generated.len(),
            result.failed.len(),
            result.summary()
        );
        Ok(result)
    }

    fn process_row(&self, record: &Record, variant: Variant) -> Result<String, RowError> {
        if let ValidationOutcome::Invalid(reason) = validate_record(record) {
            return Err(RowError::Invalid(reason));
        }

        let identifier = self.deriver.derive(
            &record.person_name,
            &record.course_name,
            &record.course_date,
        )?;
        let file_name = identifier.file_name();
        let output_path = self.output_dir.join(&file_name);

        let rendered = panic::catch_unwind(AssertUnwindSafe(|| {
            self.renderer
                .render(record, &identifier, variant, &output_path)
        }));

        match rendered {
            Ok(outcome) => outcome?,
            Err(payload) => return Err(RowError::Unexpected(panic_message(payload.as_ref()))),
        }

        Ok(file_name)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "renderer panicked".to_string()
    }
}
