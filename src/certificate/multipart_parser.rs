use actix_multipart::Multipart;
use actix_web::HttpResponse;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::ErrorResponse;

pub const CSV_FILE_FIELD: &str = "csv_file";
pub const VARIANT_FIELD: &str = "variant";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Client-supplied name, unsanitized. Empty when the browser sent none.
    pub filename: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn has_csv_extension(&self) -> bool {
        self.filename.to_lowercase().ends_with(".csv")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CertificateUpload {
    pub csv_file: Option<UploadedFile>,
    pub variant: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MultipartParseError {
    #[error("Multipart field error: {0}")]
    FieldError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Invalid UTF-8 data: {0}")]
    Utf8Error(String),
}

impl From<MultipartParseError> for HttpResponse {
    fn from(error: MultipartParseError) -> Self {
        match error {
            MultipartParseError::FieldError(_) | MultipartParseError::Utf8Error(_) => {
                HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!("{}", error)))
            }
            MultipartParseError::IoError(_) => HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&format!("{}", error))),
        }
    }
}

pub struct MultipartParser;

impl MultipartParser {
    /// Collect the CSV file part and the optional variant selector.
    ///
    /// Unknown fields are drained and ignored.
    pub async fn parse_certificate_upload(
        mut multipart: Multipart,
    ) -> Result<CertificateUpload, MultipartParseError> {
        let mut upload = CertificateUpload::default();

        while let Some(item) = multipart.next().await {
            let mut field = item.map_err(|e| MultipartParseError::FieldError(e.to_string()))?;
            let content_disposition = field.content_disposition().ok_or_else(|| {
                MultipartParseError::FieldError("Content disposition not found".to_string())
            })?;
            let name = content_disposition
                .get_name()
                .ok_or_else(|| MultipartParseError::FieldError("Field name not found".to_string()))?
                .to_string();
            let filename = content_disposition
                .get_filename()
                .map(|s| s.to_string())
                .unwrap_or_default();

            let mut buffer = Vec::new();
            while let Some(chunk) = field.next().await {
                let data_chunk = chunk.map_err(|e| MultipartParseError::IoError(e.to_string()))?;
                buffer.extend_from_slice(&data_chunk);
            }

            match name.as_str() {
                CSV_FILE_FIELD => {
                    upload.csv_file = Some(UploadedFile {
                        filename,
                        data: buffer,
                    });
                }
                VARIANT_FIELD => {
                    upload.variant = String::from_utf8(buffer)
                        .map_err(|e| MultipartParseError::Utf8Error(e.to_string()))?
                        .trim()
                        .to_string();
                }
                _ => continue,
            }
        }

        Ok(upload)
    }
}
