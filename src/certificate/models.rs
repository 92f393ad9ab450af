use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::batch::{BatchResult, BatchSummary};

/// Public path under which generated certificates are served.
pub const GENERATED_ROUTE: &str = "/generated";

/// Multipart form accepted by the upload endpoint. Documentation only.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadCertificatesRequest {
    /// Roster with the columns Person Name, Course Name, Course Description, Course Date.
    #[schema(value_type = String, format = Binary)]
    pub csv_file: Vec<u8>,
    /// Background variant: classic, modern, elegant or minimal.
    #[schema(example = "classic")]
    pub variant: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GeneratedCertificate {
    #[schema(example = "AS-PythonPr-150123-042917.pdf")]
    pub file_name: String,
    #[schema(example = "/generated/AS-PythonPr-150123-042917.pdf")]
    pub url: String,
}

impl GeneratedCertificate {
    pub fn new(file_name: String) -> Self {
        let url = format!("{}/{}", GENERATED_ROUTE, file_name);
        Self { file_name, url }
    }
}

/// Response body of a processed batch.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BatchReport {
    pub summary: BatchSummary,
    #[schema(example = "Successfully generated all certificates!")]
    pub message: String,
    #[schema(example = "Processed 2 rows.")]
    pub processed_message: String,
    pub processed_rows: usize,
    pub generated: Vec<GeneratedCertificate>,
    #[schema(example = json!(["Row 2 (Person: N/A) - Missing data"]))]
    pub failed: Vec<String>,
}

impl From<BatchResult> for BatchReport {
    fn from(result: BatchResult) -> Self {
        Self {
            summary: result.summary(),
            message: result.summary_message(),
            processed_message: format!("Processed {} rows.", result.processed_rows),
            processed_rows: result.processed_rows,
            generated: result
                .generated
                .into_iter()
                .map(GeneratedCertificate::new)
                .collect(),
            failed: result.failed,
        }
    }
}
