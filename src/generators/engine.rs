//! Typst rendering engine.
//!
//! Handles the low-level details of writing Typst source to a temporary
//! directory, invoking the compiler, and moving the finished PDF into place.
//! Every render gets its own directory, so concurrent renders never share
//! files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use tempfile::{tempdir, NamedTempFile};

use super::RenderError;

const SOURCE_FILE: &str = "certificate.typ";
const OUTPUT_FILE: &str = "certificate.pdf";

/// Turns a Typst source file into a PDF.
pub trait PdfCompiler: Send + Sync {
    /// Compile `workdir/source_file` into `workdir/output_file`.
    fn compile(&self, workdir: &Path, source_file: &str, output_file: &str)
        -> Result<(), RenderError>;
}

/// Shells out to the `typst` command line compiler.
#[derive(Debug, Clone)]
pub struct TypstCli {
    binary: PathBuf,
}

impl TypstCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for TypstCli {
    fn default() -> Self {
        Self::new("typst")
    }
}

impl PdfCompiler for TypstCli {
    fn compile(
        &self,
        workdir: &Path,
        source_file: &str,
        output_file: &str,
    ) -> Result<(), RenderError> {
        let output = Command::new(&self.binary)
            .arg("compile")
            .arg(source_file)
            .arg(output_file)
            .current_dir(workdir)
            .output()
            .map_err(RenderError::TypstIo)?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(RenderError::TypstExit { code, stderr });
        }

        Ok(())
    }
}

/// A file copied next to the source before compiling.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Name the source refers to.
    pub name: String,
    pub source_path: PathBuf,
}

/// Renders Typst source to a PDF file.
#[derive(Clone)]
pub struct TypstRenderEngine {
    compiler: Arc<dyn PdfCompiler>,
}

impl TypstRenderEngine {
    pub fn new(compiler: Arc<dyn PdfCompiler>) -> Self {
        Self { compiler }
    }

    /// Compile `typst_source` and write the PDF to `output_path`.
    ///
    /// The destination only ever holds a complete file: the PDF is written to
    /// a sibling temporary file and renamed over the target.
    pub fn render(
        &self,
        typst_source: &str,
        attachments: &[Attachment],
        output_path: &Path,
    ) -> Result<(), RenderError> {
        let temp_dir = tempdir().map_err(RenderError::TempDir)?;

        fs::write(temp_dir.path().join(SOURCE_FILE), typst_source)
            .map_err(RenderError::WriteTypst)?;

        for attachment in attachments {
            fs::copy(&attachment.source_path, temp_dir.path().join(&attachment.name)).map_err(
                |source| RenderError::StageAsset {
                    path: attachment.source_path.clone(),
                    source,
                },
            )?;
        }

        self.compiler
            .compile(temp_dir.path(), SOURCE_FILE, OUTPUT_FILE)?;

        let pdf = fs::read(temp_dir.path().join(OUTPUT_FILE)).map_err(RenderError::ReadPdf)?;
        write_atomically(output_path, &pdf)
    }
}

fn write_atomically(output_path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    let to_output_error = |source| RenderError::WriteOutput {
        path: output_path.to_path_buf(),
        source,
    };

    let dir = output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut file = NamedTempFile::new_in(dir).map_err(to_output_error)?;
    file.write_all(bytes).map_err(to_output_error)?;
    file.persist(output_path)
        .map_err(|e| to_output_error(e.error))?;

    Ok(())
}
