use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

lazy_static! {
    /// Names produced by the batch processor: `{identifier}.pdf`.
    static ref GENERATED_FILE_NAME: Regex =
        Regex::new(r"^[A-Z]+-[A-Za-z0-9]{0,8}-\d{6}-\d{6}\.pdf$")
            .expect("generated file pattern compiles");
}

/// Create `dir` and its parents when missing.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

/// Store an uploaded roster under a collision-free name and return its path.
pub fn save_upload(upload_dir: &Path, original_filename: &str, data: &[u8]) -> io::Result<PathBuf> {
    let sanitized = sanitize_filename::sanitize(original_filename);
    let file_path = upload_dir.join(format!("{}_{}", Uuid::new_v4(), sanitized));
    fs::write(&file_path, data)?;
    Ok(file_path)
}

/// Whether `filename` looks like a certificate this service generated.
pub fn is_generated_file_name(filename: &str) -> bool {
    GENERATED_FILE_NAME.is_match(filename)
}

/// Location of a generated certificate, or `None` for names the service
/// would never produce.
pub fn get_generated_path(generated_dir: &Path, filename: &str) -> Option<PathBuf> {
    if is_generated_file_name(filename) {
        Some(generated_dir.join(filename))
    } else {
        None
    }
}
