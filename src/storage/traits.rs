use async_trait::async_trait;
use uuid::Uuid;

use crate::common::error::Result;
use crate::domain::FileInfo;

use super::{CleanedArtifact, StoredFile};

/// Store of uploaded tables keyed by file id.
///
/// Originals are immutable once inserted. Concurrent cleans of the same id
/// may race on which result becomes the latest cleaned artifact, but they
/// cannot corrupt each other because each works on its own snapshot. A clean
/// racing a delete must never leave a cleaned artifact behind for the
/// deleted id; `put_cleaned` fails with `NotFound` once the id is gone.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Insert a freshly ingested file.
    async fn insert(&self, file: StoredFile) -> Result<()>;

    /// Fetch the stored entry, original table included.
    async fn get(&self, id: Uuid) -> Result<StoredFile>;

    /// Metadata for every stored file, newest upload first.
    async fn list(&self) -> Result<Vec<FileInfo>>;

    /// Attach the latest cleaned artifact to an existing id.
    async fn put_cleaned(&self, id: Uuid, artifact: CleanedArtifact) -> Result<()>;

    /// Remove the original and any cleaned artifact.
    async fn delete(&self, id: Uuid) -> Result<()>;
}
