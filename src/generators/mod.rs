//! Generators module - lays out certificates as Typst documents and compiles
//! them to PDF.
//!
//! - [`certificate`] builds the Typst source for one record
//! - [`engine`] compiles source to PDF in a private temporary directory
//! - [`render_config`] holds the styling document and background lookup

pub mod certificate;
pub mod common;
pub mod engine;
pub mod render_config;
pub mod traits;

pub use certificate::CertificateGenerator;
pub use engine::{PdfCompiler, TypstCli, TypstRenderEngine};
pub use render_config::{RenderConfig, Rgb, Variant};
pub use traits::DocumentRenderer;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while rendering a certificate.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read render configuration {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed render configuration: {0}")]
    ConfigFormat(#[source] serde_json::Error),
    #[error("failed to load certificate template: {0}")]
    TemplateIo(#[source] std::io::Error),
    #[error("failed to create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("failed to write Typst source: {0}")]
    WriteTypst(#[source] std::io::Error),
    #[error("failed to stage background image {path}: {source}")]
    StageAsset {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Typst CLI execution failed: {0}")]
    TypstIo(#[source] std::io::Error),
    #[error("Typst CLI exited with status {code}: {stderr}")]
    TypstExit { code: i32, stderr: String },
    #[error("failed to read generated PDF: {0}")]
    ReadPdf(#[source] std::io::Error),
    #[error("failed to write certificate to {path}: {source}")]
    WriteOutput {
        path: PathBuf,
        source: std::io::Error,
    },
}
