use actix_files::NamedFile;
use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{debug, error, info, warn};

use super::models::{BatchReport, UploadCertificatesRequest};
use super::multipart_parser::MultipartParser;
use super::record::Roster;
use crate::{storage, AppState, ErrorResponse};

pub const NO_FILE_PART: &str = "No file part in the request. Please choose a CSV file.";
pub const NO_FILE_SELECTED: &str = "No file selected. Please choose a CSV file.";
pub const INVALID_FILE_TYPE: &str = "Invalid file type. Please upload a .csv file.";

#[utoipa::path(
    context_path = "/api",
    tag = "Certificate Service",
    post,
    path = "/certificates",
    request_body(content = inline(UploadCertificatesRequest), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Batch processed; see summary for per-row outcome", body = BatchReport),
        (status = 400, description = "Missing, mistyped or unparseable CSV upload", body = ErrorResponse),
        (status = 422, description = "CSV lacks required columns or data rows", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn generate_certificates(payload: Multipart, data: web::Data<AppState>) -> impl Responder {
    info!("Executing generate_certificates handler");

    let upload = match MultipartParser::parse_certificate_upload(payload).await {
        Ok(upload) => upload,
        Err(e) => {
            error!("Failed to parse certificate upload: {}", e);
            return HttpResponse::from(e);
        }
    };

    let variant = upload.variant;
    let file = match upload.csv_file {
        Some(file) => file,
        None => return HttpResponse::BadRequest().json(ErrorResponse::bad_request(NO_FILE_PART)),
    };
    if file.filename.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse::bad_request(NO_FILE_SELECTED));
    }
    if !file.has_csv_extension() {
        return HttpResponse::BadRequest().json(ErrorResponse::bad_request(INVALID_FILE_TYPE));
    }

    let upload_dir = data.config.upload_dir.clone();
    let saved = web::block(move || {
        storage::save_upload(&upload_dir, &file.filename, &file.data).map(|path| (path, file))
    })
    .await;
    let file = match saved {
        Ok(Ok((path, file))) => {
            info!("File saved to {}", path.display());
            file
        }
        Ok(Err(e)) => {
            error!("Error saving uploaded roster: {}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&format!("Error saving file: {}", e)));
        }
        Err(e) => {
            error!("Blocking task failed while saving roster: {}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&format!("Error saving file: {}", e)));
        }
    };

    let roster = match Roster::from_csv_bytes(&file.data) {
        Ok(roster) => roster,
        Err(e) => {
            warn!("CSV parsing error for file {}: {}", file.filename, e);
            return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!(
                "Error parsing CSV file: {}. Please ensure it's a valid CSV.",
                e
            )));
        }
    };
    info!("Successfully parsed {} rows from CSV.", roster.len());

    let processor = data.processor.clone();
    let outcome = web::block(move || processor.process(&roster, &variant)).await;

    match outcome {
        Ok(Ok(result)) => HttpResponse::Ok().json(BatchReport::from(result)),
        Ok(Err(batch_error)) => {
            warn!("Batch rejected: {}", batch_error);
            HttpResponse::UnprocessableEntity()
                .json(ErrorResponse::new(batch_error.kind(), &batch_error.to_string()))
        }
        Err(e) => {
            error!("An unexpected error occurred during batch processing: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&format!(
                "An unexpected error occurred: {}",
                e
            )))
        }
    }
}

#[utoipa::path(
    get,
    tag = "Certificate Service",
    path = "/generated/{filename}",
    params(
        ("filename" = String, Path, description = "Certificate file name, e.g. AS-PythonPr-150123-004217.pdf")
    ),
    responses(
        (status = 200, description = "PDF certificate"),
        (status = 404, description = "Certificate not found", body = ErrorResponse)
    )
)]
pub async fn serve_certificate(
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Data<AppState>,
) -> HttpResponse {
    let filename = path.into_inner();
    info!("Executing serve_certificate handler for filename: {}", &filename);

    let not_found = || {
        HttpResponse::NotFound().json(ErrorResponse::not_found(&format!(
            "Certificate '{}' not found",
            filename
        )))
    };

    let Some(file_path) = storage::get_generated_path(&data.config.generated_dir, &filename) else {
        warn!("Refusing to serve unexpected file name: {}", &filename);
        return not_found();
    };

    match NamedFile::open(&file_path) {
        Ok(file) => file.into_response(&req),
        Err(e) => {
            debug!("Could not open {}: {}", file_path.display(), e);
            not_found()
        }
    }
}

#[utoipa::path(
    get,
    context_path = "/api",
    tag = "Certificate Service",
    path = "/health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
