//! Renderer seam used by the batch orchestrator.

use std::path::Path;

use super::render_config::Variant;
use super::RenderError;
use crate::certificate::identifier::CertificateId;
use crate::certificate::record::Record;

/// Renders one certificate to `output_path`.
///
/// Implementations must be safe to call from several batches at once as long
/// as the output paths differ.
pub trait DocumentRenderer: Send + Sync {
    fn render(
        &self,
        record: &Record,
        identifier: &CertificateId,
        variant: Variant,
        output_path: &Path,
    ) -> Result<(), RenderError>;
}
