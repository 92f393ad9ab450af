#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};

use certificate_generator_server::certificate::identifier::CertificateId;
use certificate_generator_server::certificate::record::Record;
use certificate_generator_server::generators::common::get_static_dir;
use certificate_generator_server::generators::{
    DocumentRenderer, PdfCompiler, RenderError, Variant,
};

pub const HEADER: &str = "Person Name,Course Name,Course Description,Course Date";

/// Stands in for the Typst CLI: the "PDF" is a PDF header followed by the
/// Typst source plus a listing of the staged files.
pub struct SourceEchoCompiler;

impl PdfCompiler for SourceEchoCompiler {
    fn compile(&self, workdir: &Path, source_file: &str, output_file: &str) -> Result<(), RenderError> {
        let source = fs::read_to_string(workdir.join(source_file)).map_err(RenderError::ReadPdf)?;
        let mut staged: Vec<String> = fs::read_dir(workdir)
            .map_err(RenderError::ReadPdf)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        staged.sort();

        let body = format!("%PDF-1.7\n% staged: {}\n{}", staged.join(","), source);
        fs::write(workdir.join(output_file), body).map_err(RenderError::ReadPdf)
    }
}

/// Renderer writing a tiny file; fails for people named in `fail_for`.
pub struct RecordingRenderer {
    pub fail_for: Vec<String>,
    pub panic_for: Vec<String>,
    pub calls: AtomicUsize,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self {
            fail_for: Vec::new(),
            panic_for: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_for(names: &[&str]) -> Self {
        Self {
            fail_for: names.iter().map(|n| n.to_string()).collect(),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DocumentRenderer for RecordingRenderer {
    fn render(
        &self,
        record: &Record,
        identifier: &CertificateId,
        variant: Variant,
        output_path: &Path,
    ) -> Result<(), RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_for.contains(&record.person_name) {
            panic!("layout overflow for {}", record.person_name);
        }
        if self.fail_for.contains(&record.person_name) {
            return Err(RenderError::TypstExit {
                code: 1,
                stderr: "error: font not found".to_string(),
            });
        }
        let body = format!("%PDF-1.7\n{}\n{:?}\n", identifier, variant);
        fs::write(output_path, body).map_err(|source| RenderError::WriteOutput {
            path: output_path.to_path_buf(),
            source,
        })
    }
}

pub fn csv(rows: &[&str]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    out
}

pub fn bundled_config() -> PathBuf {
    get_static_dir().join("render_config.json")
}

pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn tool_available(binary: &str, flag: &str) -> bool {
    Command::new(binary)
        .arg(flag)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

pub fn typst_available() -> bool {
    tool_available("typst", "--version")
}

pub fn pdftotext_available() -> bool {
    tool_available("pdftotext", "-v")
}

/// Text layer of a PDF as seen by poppler's `pdftotext`.
pub fn extract_pdf_text(path: &Path) -> String {
    let output = Command::new("pdftotext")
        .arg(path)
        .arg("-")
        .output()
        .unwrap();
    assert!(output.status.success(), "pdftotext failed on {}", path.display());
    String::from_utf8_lossy(&output.stdout).into_owned()
}
