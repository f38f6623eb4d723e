use thiserror::Error;
use uuid::Uuid;

use crate::formats::FileFormat;

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("failed to parse {format} payload: {message}")]
    Parse { format: FileFormat, message: String },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid cleaning options: {0}")]
    Validation(String),

    #[error("file not found: {0}")]
    NotFound(Uuid),

    #[error("export failed: {0}")]
    Export(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl CleanerError {
    /// Shorthand for a parse failure in the given format.
    pub fn parse(format: FileFormat, message: impl Into<String>) -> Self {
        CleanerError::Parse {
            format,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CleanerError>;
