//! Common utilities for document generation.

use std::path::Path;

/// Prefix put in front of every course description line.
pub const BULLET_PREFIX: &str = "* ";

/// Escape special characters for Typst strings.
pub fn escape_typst_string(value: &str) -> String {
    value
        .replace('\\', r"\\")
        .replace('"', r#"\""#)
        .replace('\r', "")
        .replace('\n', r"\n")
}

/// Format a list of strings as a Typst array literal.
///
/// Typst needs a trailing comma to read a one-element array.
pub fn typst_string_array(values: &[String]) -> String {
    if values.is_empty() {
        return "()".to_string();
    }

    let items: Vec<String> = values
        .iter()
        .map(|v| format!("\"{}\"", escape_typst_string(v)))
        .collect();
    format!("({},)", items.join(", "))
}

/// One bulleted line per line of the description, blank lines included.
pub fn bullet_lines(description: &str) -> Vec<String> {
    description
        .lines()
        .map(|line| format!("{}{}", BULLET_PREFIX, line.trim_end()))
        .collect()
}

/// Get the static assets directory path.
pub fn get_static_dir() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static"))
}
