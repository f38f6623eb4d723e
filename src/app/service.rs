use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use crate::common::error::{CleanerError, Result};
use crate::domain::{FileInfo, Table};
use crate::formats::{self, FileFormat};
use crate::inference;
use crate::pipeline::{self, options::CleaningOptions, ConversionWarning};
use crate::stats::{self, Statistics};
use crate::storage::{ArtifactStore, CleanedArtifact, StoredFile};

/// Which stored table a download exports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadSource {
    Original,
    Cleaned,
    /// Cleaned when a clean has run, otherwise the original.
    #[default]
    Latest,
}

impl std::str::FromStr for DownloadSource {
    type Err = CleanerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "original" => Ok(DownloadSource::Original),
            "cleaned" => Ok(DownloadSource::Cleaned),
            "latest" => Ok(DownloadSource::Latest),
            other => Err(CleanerError::Validation(format!(
                "unknown download source '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub file_info: FileInfo,
    pub columns: Vec<String>,
    pub preview_data: Vec<Value>,
    pub statistics: Statistics,
}

#[derive(Debug, Serialize)]
pub struct FileDataResponse {
    pub data: Vec<Value>,
    pub total_rows: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub columns: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CleanResponse {
    pub original_rows: usize,
    pub cleaned_rows: usize,
    pub columns: Vec<String>,
    pub preview_data: Vec<Value>,
    pub statistics: Statistics,
    pub warnings: Vec<ConversionWarning>,
}

/// Exported bytes plus the transport metadata a download needs.
#[derive(Debug)]
pub struct DownloadPayload {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

/// Use-case layer tying the engine to the artifact store. Every operation
/// works on immutable table snapshots; the stored original is never altered
/// after ingest.
pub struct CleaningService {
    store: Arc<dyn ArtifactStore>,
    preview_rows: usize,
}

impl CleaningService {
    pub fn new(store: Arc<dyn ArtifactStore>, preview_rows: usize) -> Self {
        Self { store, preview_rows }
    }

    /// Parse and store an uploaded payload, returning metadata, a preview
    /// and statistics of the original table.
    pub async fn ingest(&self, filename: &str, bytes: &[u8]) -> Result<IngestResponse> {
        let format = FileFormat::from_filename(filename)?;
        info!("📥 ingesting '{}' ({} bytes, {})", filename, bytes.len(), format);

        let table = inference::infer(formats::parse(bytes, format)?);
        let statistics = stats::compute(&table);
        let info = FileInfo {
            id: Uuid::new_v4(),
            filename: filename.to_string(),
            file_type: format,
            size: bytes.len(),
            checksum: hex::encode(Sha256::digest(bytes)),
            uploaded_at: Utc::now(),
        };

        let response = IngestResponse {
            file_info: info.clone(),
            columns: table.column_names(),
            preview_data: table.preview(self.preview_rows),
            statistics,
        };

        self.store
            .insert(StoredFile {
                info,
                table: Arc::new(table),
                cleaned: None,
            })
            .await?;

        info!("✅ ingest complete: {} ({} rows)", response.file_info.id, response.statistics.rows);
        Ok(response)
    }

    pub async fn list_files(&self) -> Result<Vec<FileInfo>> {
        self.store.list().await
    }

    /// Paginated rows of the stored original.
    pub async fn file_data(&self, id: Uuid, page: usize, page_size: usize) -> Result<FileDataResponse> {
        let stored = self.store.get(id).await?;
        let table = &stored.table;
        let total_rows = table.row_count();
        let page_size = page_size.max(1);
        let start = page.saturating_mul(page_size).min(total_rows);
        let end = (start + page_size).min(total_rows);

        let data = (start..end)
            .map(|i| Value::Object(table.row_object(i)))
            .collect();

        Ok(FileDataResponse {
            data,
            total_rows,
            page,
            page_size,
            total_pages: total_rows.div_ceil(page_size),
            columns: table.column_names(),
        })
    }

    /// Run the cleaning pipeline against a snapshot of the stored original
    /// and record the result as the id's latest cleaned artifact. The
    /// original is left untouched, so it stays retrievable afterwards.
    pub async fn clean(&self, id: Uuid, options: CleaningOptions) -> Result<CleanResponse> {
        let stored = self.store.get(id).await?;
        let original = (*stored.table).clone();
        let original_rows = original.row_count();
        info!("🧽 cleaning {} ({} rows)", id, original_rows);

        let mut merge_tables = Vec::with_capacity(options.merge_files.len());
        for merge_id in &options.merge_files {
            let merge_stored = self.store.get(*merge_id).await?;
            merge_tables.push((*merge_stored.table).clone());
        }

        let outcome = pipeline::clean(original, merge_tables, &options)?;
        let statistics = stats::compute(&outcome.table);

        let response = CleanResponse {
            original_rows,
            cleaned_rows: outcome.table.row_count(),
            columns: outcome.table.column_names(),
            preview_data: outcome.table.preview(self.preview_rows),
            statistics,
            warnings: outcome.warnings.clone(),
        };

        // The id may have been deleted while we were computing; the artifact
        // write is what decides whether the result survives.
        self.store
            .put_cleaned(
                id,
                CleanedArtifact {
                    table: outcome.table,
                    warnings: outcome.warnings,
                    cleaned_at: Utc::now(),
                },
            )
            .await?;

        info!(
            "✅ clean complete: {} -> {} rows, {} warning(s)",
            response.original_rows,
            response.cleaned_rows,
            response.warnings.len()
        );
        Ok(response)
    }

    /// Export the original or the latest cleaned table in the requested
    /// format.
    pub async fn download(
        &self,
        id: Uuid,
        format: FileFormat,
        source: DownloadSource,
    ) -> Result<DownloadPayload> {
        let stored = self.store.get(id).await?;

        let (table, cleaned): (&Table, bool) = match source {
            DownloadSource::Original => (&stored.table, false),
            DownloadSource::Cleaned => match &stored.cleaned {
                Some(artifact) => (&artifact.table, true),
                None => return Err(CleanerError::NotFound(id)),
            },
            DownloadSource::Latest => match &stored.cleaned {
                Some(artifact) => (&artifact.table, true),
                None => (&stored.table, false),
            },
        };

        let bytes = formats::export(table, format)?;
        let stem = Path::new(&stored.info.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("export");
        let filename = if cleaned {
            format!("cleaned_{stem}.{}", format.extension())
        } else {
            format!("{stem}.{}", format.extension())
        };

        info!("📤 exporting {} as {} ({} bytes)", id, format, bytes.len());
        Ok(DownloadPayload {
            bytes,
            content_type: format.content_type(),
            filename,
        })
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.store.delete(id).await?;
        info!("🗑️ deleted {}", id);
        Ok(())
    }
}
