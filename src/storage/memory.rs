use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::common::error::{CleanerError, Result};
use crate::domain::FileInfo;

use super::traits::ArtifactStore;
use super::{CleanedArtifact, StoredFile};

/// In-memory store backing the service. Persistent job history is out of
/// scope, so the process lifetime is the storage lifetime.
#[derive(Default)]
pub struct InMemoryStore {
    files: RwLock<HashMap<Uuid, StoredFile>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArtifactStore for InMemoryStore {
    async fn insert(&self, file: StoredFile) -> Result<()> {
        let id = file.info.id;
        let mut files = self.files.write().await;
        files.insert(id, file);
        debug!("stored file {id}");
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<StoredFile> {
        let files = self.files.read().await;
        files.get(&id).cloned().ok_or(CleanerError::NotFound(id))
    }

    async fn list(&self) -> Result<Vec<FileInfo>> {
        let files = self.files.read().await;
        let mut infos: Vec<FileInfo> = files.values().map(|f| f.info.clone()).collect();
        infos.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(infos)
    }

    async fn put_cleaned(&self, id: Uuid, artifact: CleanedArtifact) -> Result<()> {
        let mut files = self.files.write().await;
        // The id may have been deleted while the clean was running; in that
        // case the result is discarded and the caller sees NotFound.
        let entry = files.get_mut(&id).ok_or(CleanerError::NotFound(id))?;
        entry.cleaned = Some(Arc::new(artifact));
        debug!("stored cleaned artifact for {id}");
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut files = self.files.write().await;
        files.remove(&id).ok_or(CleanerError::NotFound(id))?;
        debug!("deleted file {id}");
        Ok(())
    }
}
