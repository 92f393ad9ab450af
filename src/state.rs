use std::sync::Arc;

use crate::certificate::identifier::IdentifierDeriver;
use crate::certificate::BatchProcessor;
use crate::config::AppConfig;
use crate::generators::{CertificateGenerator, DocumentRenderer, RenderError, TypstCli};
use crate::storage;

/// Shared, read-only application state.
pub struct AppState {
    pub config: AppConfig,
    pub processor: Arc<BatchProcessor>,
}

impl AppState {
    /// Wire the production renderer: the bundled template compiled by the
    /// Typst CLI named in the configuration.
    pub fn new(config: AppConfig) -> Result<Self, RenderError> {
        let generator = CertificateGenerator::new(
            config.render_config_path.clone(),
            Arc::new(TypstCli::new(config.typst_bin.clone())),
        )?;
        Ok(Self::with_renderer(config, Arc::new(generator), IdentifierDeriver::default()))
    }

    pub fn with_renderer(
        config: AppConfig,
        renderer: Arc<dyn DocumentRenderer>,
        deriver: IdentifierDeriver,
    ) -> Self {
        let processor = BatchProcessor::new(deriver, renderer, config.generated_dir.clone());
        Self {
            config,
            processor: Arc::new(processor),
        }
    }

    /// Create the upload and output directories.
    pub fn prepare_dirs(&self) -> std::io::Result<()> {
        storage::ensure_dir(&self.config.upload_dir)?;
        storage::ensure_dir(&self.config.generated_dir)
    }
}
