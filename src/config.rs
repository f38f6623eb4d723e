use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::constants::PREVIEW_ROWS;
use crate::common::error::{CleanerError, Result};

const DEFAULT_CONFIG_PATH: &str = "datawash.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind: String,
    /// Rows included in upload/clean preview payloads.
    pub preview_rows: usize,
    /// Upper bound on an uploaded payload, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            preview_rows: PREVIEW_ROWS,
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load configuration from the given file, or from `datawash.toml` when
    /// present, falling back to defaults. `DATAWASH_BIND` overrides the bind
    /// address either way.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        if let Ok(bind) = std::env::var("DATAWASH_BIND") {
            config.bind = bind;
        }
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CleanerError::Config(format!("failed to read config file '{}': {e}", path.display()))
        })?;
        toml::from_str(&content)
            .map_err(|e| CleanerError::Config(format!("failed to parse '{}': {e}", path.display())))
    }
}
