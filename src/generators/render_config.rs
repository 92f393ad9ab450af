//! Certificate styling configuration.
//!
//! The configuration is a JSON document (see `static/render_config.json`).
//! Image paths inside it are resolved relative to the file that declares
//! them. It is read again on every render so edits apply to the next
//! certificate without a restart.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::RenderError;

/// Background style selected for a whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Classic,
    Modern,
    Elegant,
    Minimal,
    /// Anything not listed above; uses the default background.
    Default,
}

impl Variant {
    /// Parse a caller-supplied selector, ignoring case and surrounding space.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "classic" => Self::Classic,
            "modern" => Self::Modern,
            "elegant" => Self::Elegant,
            "minimal" => Self::Minimal,
            _ => Self::Default,
        }
    }

    /// Key looked up in [`RenderConfig::backgrounds`].
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Self::Classic => Some("classic"),
            Self::Modern => Some("modern"),
            Self::Elegant => Some("elegant"),
            Self::Minimal => Some("minimal"),
            Self::Default => None,
        }
    }
}

/// RGB colour written as a three element array in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn to_typst(&self) -> String {
        format!("rgb({}, {}, {})", self.0, self.1, self.2)
    }
}

/// Font sizes in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSizes {
    pub header: f32,
    pub course_name: f32,
    pub default: f32,
    pub person_name: f32,
    pub description: f32,
    pub date: f32,
    pub identifier: f32,
    pub footer: f32,
}

/// Distance of each text block from the top edge, in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offsets {
    pub header: f32,
    pub course_name: f32,
    pub award_text: f32,
    pub person_name: f32,
    pub completion_text: f32,
    pub description: f32,
    pub date: f32,
    pub identifier: f32,
    pub footer: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Colors {
    pub background: Rgb,
    pub header: Rgb,
    pub footer: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub font_name: String,
    pub font_sizes: FontSizes,
    pub offsets: Offsets,
    pub colors: Colors,
    pub header_text: String,
    pub footer_text: String,
    #[serde(default)]
    pub default_background: Option<PathBuf>,
    /// Variant key to background image.
    #[serde(default)]
    pub backgrounds: HashMap<String, PathBuf>,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl RenderConfig {
    /// Read and parse the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let raw = fs::read_to_string(path).map_err(|source| RenderError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_json(&raw)?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    /// Parse a configuration document. Relative image paths resolve against
    /// the current directory.
    pub fn from_json(raw: &str) -> Result<Self, RenderError> {
        serde_json::from_str(raw).map_err(RenderError::ConfigFormat)
    }

    /// Background image for `variant`, if one is configured and present.
    ///
    /// The variant's own image wins; otherwise the default image is used.
    /// Missing files are skipped so the page falls back to the flat colour.
    pub fn resolve_background(&self, variant: Variant) -> Option<PathBuf> {
        let variant_image = variant
            .key()
            .and_then(|key| self.backgrounds.get(key))
            .map(|path| self.resolve_path(path))
            .filter(|path| path.is_file());

        variant_image.or_else(|| {
            self.default_background
                .as_ref()
                .map(|path| self.resolve_path(path))
                .filter(|path| path.is_file())
        })
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}
