//! Certificate batches: roster parsing, validation, identifiers and the
//! orchestrator, plus the HTTP handlers exposing them.

pub mod batch;
pub mod handlers;
pub mod identifier;
pub mod models;
pub mod multipart_parser;
pub mod record;
pub mod validation;

#[cfg(test)]
mod mod_tests;

pub use batch::{BatchError, BatchProcessor, BatchResult, BatchSummary, RowError};
pub use identifier::{CertificateId, IdentifierDeriver, IdentifierError, SuffixSource};
pub use record::{Record, Roster, REQUIRED_COLUMNS};
pub use validation::{validate_record, ValidationOutcome};
