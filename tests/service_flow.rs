use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use datawash::app::{CleaningService, DownloadSource};
use datawash::common::error::CleanerError;
use datawash::domain::Table;
use datawash::formats::{self, FileFormat};
use datawash::pipeline::options::{CleaningOptions, MissingPolicy};
use datawash::storage::{ArtifactStore, CleanedArtifact, InMemoryStore};

const CSV: &[u8] = b"name,score\n  alice ,10\nalice,10\nbob,\n";

fn service_with_store() -> (Arc<InMemoryStore>, CleaningService) {
    let store = Arc::new(InMemoryStore::new());
    let service = CleaningService::new(store.clone(), 5);
    (store, service)
}

#[tokio::test]
async fn ingest_returns_metadata_preview_and_statistics() -> Result<()> {
    let (_store, service) = service_with_store();

    let response = service.ingest("people.csv", CSV).await?;

    assert_eq!(response.file_info.filename, "people.csv");
    assert_eq!(response.file_info.file_type, FileFormat::Csv);
    assert_eq!(response.file_info.size, CSV.len());
    assert_eq!(response.columns, vec!["name", "score"]);
    assert_eq!(response.statistics.rows, 3);
    assert_eq!(response.statistics.missing_values["score"], 1);
    assert_eq!(response.preview_data.len(), 3);

    let files = service.list_files().await?;
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].id, response.file_info.id);
    Ok(())
}

#[tokio::test]
async fn clean_stores_the_latest_artifact_and_keeps_the_original() -> Result<()> {
    let (_store, service) = service_with_store();
    let ingested = service.ingest("people.csv", CSV).await?;
    let id = ingested.file_info.id;

    let options = CleaningOptions {
        trim_whitespace: true,
        remove_duplicates: true,
        handle_missing: MissingPolicy::Drop,
        ..Default::default()
    };
    let cleaned = service.clean(id, options).await?;

    assert_eq!(cleaned.original_rows, 3);
    assert_eq!(cleaned.cleaned_rows, 1);

    let download = service.download(id, FileFormat::Csv, DownloadSource::Cleaned).await?;
    assert!(download.filename.starts_with("cleaned_"));
    let cleaned_table: Table = formats::parse(&download.bytes, FileFormat::Csv)?;
    assert_eq!(cleaned_table.row_count(), 1);

    // The stored original is untouched by the clean.
    let original = service.download(id, FileFormat::Csv, DownloadSource::Original).await?;
    let original_table: Table = formats::parse(&original.bytes, FileFormat::Csv)?;
    assert_eq!(original_table.row_count(), 3);
    Ok(())
}

#[tokio::test]
async fn download_latest_prefers_the_cleaned_artifact() -> Result<()> {
    let (_store, service) = service_with_store();
    let id = service.ingest("people.csv", CSV).await?.file_info.id;

    let latest = service.download(id, FileFormat::Csv, DownloadSource::Latest).await?;
    assert!(!latest.filename.starts_with("cleaned_"));

    let options = CleaningOptions {
        remove_duplicates: true,
        trim_whitespace: true,
        ..Default::default()
    };
    service.clean(id, options).await?;

    let latest = service.download(id, FileFormat::Csv, DownloadSource::Latest).await?;
    assert!(latest.filename.starts_with("cleaned_"));
    Ok(())
}

#[tokio::test]
async fn cleaned_download_before_any_clean_is_not_found() -> Result<()> {
    let (_store, service) = service_with_store();
    let id = service.ingest("people.csv", CSV).await?.file_info.id;

    let err = service
        .download(id, FileFormat::Csv, DownloadSource::Cleaned)
        .await
        .unwrap_err();
    assert!(matches!(err, CleanerError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn operations_on_a_deleted_id_are_not_found() -> Result<()> {
    let (_store, service) = service_with_store();
    let id = service.ingest("people.csv", CSV).await?.file_info.id;

    service.delete(id).await?;

    let err = service.clean(id, CleaningOptions::default()).await.unwrap_err();
    assert!(matches!(err, CleanerError::NotFound(_)));
    let err = service.file_data(id, 0, 10).await.unwrap_err();
    assert!(matches!(err, CleanerError::NotFound(_)));
    let err = service.delete(id).await.unwrap_err();
    assert!(matches!(err, CleanerError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn a_clean_racing_a_delete_never_stores_an_artifact() -> Result<()> {
    let (store, service) = service_with_store();
    let id = service.ingest("people.csv", CSV).await?.file_info.id;

    // Simulate a clean that captured its snapshot before the delete landed:
    // the artifact write must fail instead of resurrecting the id.
    let snapshot = store.get(id).await?;
    service.delete(id).await?;

    let artifact = CleanedArtifact {
        table: (*snapshot.table).clone(),
        warnings: Vec::new(),
        cleaned_at: Utc::now(),
    };
    let err = store.put_cleaned(id, artifact).await.unwrap_err();
    assert!(matches!(err, CleanerError::NotFound(_)));

    let files = store.list().await?;
    assert!(files.is_empty());
    Ok(())
}

#[tokio::test]
async fn clean_with_merge_unions_stored_tables() -> Result<()> {
    let (_store, service) = service_with_store();
    let base = service.ingest("left.csv", b"a,b\n1,2\n").await?.file_info.id;
    let other = service.ingest("right.csv", b"b,c\n3,4\n").await?.file_info.id;

    let options = CleaningOptions {
        merge_files: vec![other],
        ..Default::default()
    };
    let cleaned = service.clean(base, options).await?;

    assert_eq!(cleaned.columns, vec!["a", "b", "c"]);
    assert_eq!(cleaned.cleaned_rows, 2);
    Ok(())
}

#[tokio::test]
async fn merging_an_unknown_id_aborts_the_clean() -> Result<()> {
    let (store, service) = service_with_store();
    let base = service.ingest("left.csv", b"a,b\n1,2\n").await?.file_info.id;

    let options = CleaningOptions {
        merge_files: vec![uuid::Uuid::new_v4()],
        ..Default::default()
    };
    let err = service.clean(base, options).await.unwrap_err();
    assert!(matches!(err, CleanerError::NotFound(_)));

    // A failed clean leaves no cleaned artifact behind.
    let stored = store.get(base).await?;
    assert!(stored.cleaned.is_none());
    Ok(())
}

#[tokio::test]
async fn file_data_paginates_the_original_rows() -> Result<()> {
    let (_store, service) = service_with_store();
    let csv = b"n\n1\n2\n3\n4\n5\n";
    let id = service.ingest("numbers.csv", csv).await?.file_info.id;

    let page = service.file_data(id, 1, 2).await?;
    assert_eq!(page.total_rows, 5);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0]["n"], serde_json::json!("3"));

    let past_the_end = service.file_data(id, 9, 2).await?;
    assert!(past_the_end.data.is_empty());
    Ok(())
}

#[tokio::test]
async fn unsupported_upload_extension_is_rejected() -> Result<()> {
    let (_store, service) = service_with_store();
    let err = service.ingest("data.parquet", b"whatever").await.unwrap_err();
    assert!(matches!(err, CleanerError::UnsupportedFormat(_)));
    Ok(())
}
