//! Server configuration read from the environment (and `.env`).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a valid port number, got '{value}'")]
    InvalidPort { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Where uploaded rosters are kept.
    pub upload_dir: PathBuf,
    /// Where certificates are written and served from.
    pub generated_dir: PathBuf,
    pub render_config_path: PathBuf,
    pub typst_bin: PathBuf,
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let port_raw = get("PORT", "8080");
        let port: u16 = port_raw.parse().map_err(|_| ConfigError::InvalidPort {
            key: "PORT",
            value: port_raw.clone(),
        })?;

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS", "")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            bind_addr: get("BIND_ADDR", "0.0.0.0"),
            port,
            upload_dir: PathBuf::from(get("UPLOAD_DIR", "./uploads")),
            generated_dir: PathBuf::from(get("GENERATED_DIR", "./generated_pdfs")),
            render_config_path: PathBuf::from(get(
                "RENDER_CONFIG_PATH",
                concat!(env!("CARGO_MANIFEST_DIR"), "/static/render_config.json"),
            )),
            typst_bin: PathBuf::from(get("TYPST_BIN", "typst")),
            cors_allowed_origins,
        })
    }
}
