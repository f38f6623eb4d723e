mod table;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::formats::FileFormat;

pub use table::{Cell, Column, ColumnType, Record, Table};

/// Metadata for one uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    pub id: Uuid,
    pub filename: String,
    pub file_type: FileFormat,
    pub size: usize,
    pub checksum: String,
    pub uploaded_at: DateTime<Utc>,
}
