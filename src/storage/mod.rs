// Artifact storage: stored originals and their latest cleaned tables.

pub mod memory;
pub mod traits;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{FileInfo, Table};
use crate::pipeline::ConversionWarning;

pub use memory::InMemoryStore;
pub use traits::ArtifactStore;

/// One stored upload. The original table is behind an `Arc` and is never
/// mutated after ingest; cleans read a snapshot and attach their result as
/// the latest cleaned artifact.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub info: FileInfo,
    pub table: Arc<Table>,
    pub cleaned: Option<Arc<CleanedArtifact>>,
}

/// The latest cleaned table for a file id, plus the soft warnings the run
/// produced.
#[derive(Debug)]
pub struct CleanedArtifact {
    pub table: Table,
    pub warnings: Vec<ConversionWarning>,
    pub cleaned_at: DateTime<Utc>,
}
