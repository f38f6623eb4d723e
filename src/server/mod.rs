use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use uuid::Uuid;

use crate::app::{CleaningService, DownloadSource};
use crate::common::constants::DEFAULT_PAGE_SIZE;
use crate::common::error::CleanerError;
use crate::config::Config;
use crate::formats::FileFormat;
use crate::pipeline::options::CleaningOptions;

#[derive(Clone)]
struct AppState {
    service: Arc<CleaningService>,
}

/// Error shape returned to HTTP clients. Hard pipeline errors map onto the
/// status codes callers expect; soft conversion warnings never surface here
/// because they ride along on successful responses.
struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl From<CleanerError> for ApiError {
    fn from(err: CleanerError) -> Self {
        let status = match &err {
            CleanerError::Parse { .. } | CleanerError::UnsupportedFormat(_) => {
                StatusCode::BAD_REQUEST
            }
            CleanerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CleanerError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("internal error: {err}");
        }
        Self {
            status,
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "detail": self.detail }));
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

pub fn router(service: Arc<CleaningService>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/upload", post(upload))
        .route("/api/files", get(list_files))
        .route("/api/file/:id/data", get(file_data))
        .route("/api/file/:id", delete(delete_file))
        .route("/api/clean", post(clean))
        .route("/api/download/:id", get(download))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(AppState { service })
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: &Config, service: Arc<CleaningService>) -> anyhow::Result<()> {
    let app = router(service, config.max_upload_bytes);
    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("🚀 datawash API listening on {}", config.bind);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "datawash",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> ApiResult<Response> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request("upload field is missing a filename"))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("failed to read upload: {e}")))?;

        let response = state.service.ingest(&filename, &bytes).await?;
        return Ok(Json(response).into_response());
    }

    Err(ApiError::bad_request("multipart body has no 'file' field"))
}

async fn list_files(State(state): State<AppState>) -> ApiResult<Response> {
    let files = state.service.list_files().await?;
    Ok(Json(files).into_response())
}

#[derive(Deserialize)]
struct DataQuery {
    #[serde(default)]
    page: usize,
    #[serde(default = "default_page_size")]
    page_size: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

async fn file_data(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<DataQuery>,
) -> ApiResult<Response> {
    let response = state.service.file_data(id, query.page, query.page_size).await?;
    Ok(Json(response).into_response())
}

#[derive(Deserialize)]
struct CleanRequest {
    file_id: Uuid,
    #[serde(default)]
    options: CleaningOptions,
}

async fn clean(State(state): State<AppState>, Json(request): Json<CleanRequest>) -> ApiResult<Response> {
    let response = state.service.clean(request.file_id, request.options).await?;
    Ok(Json(response).into_response())
}

#[derive(Deserialize)]
struct DownloadQuery {
    #[serde(default = "default_format")]
    format: String,
    #[serde(default)]
    source: Option<String>,
}

fn default_format() -> String {
    "csv".to_string()
}

async fn download(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<DownloadQuery>,
) -> ApiResult<Response> {
    let format: FileFormat = query.format.parse().map_err(ApiError::from)?;
    let source = match query.source.as_deref() {
        Some(raw) => raw.parse::<DownloadSource>().map_err(ApiError::from)?,
        None => DownloadSource::default(),
    };
    let payload = state.service.download(id, format, source).await?;

    let headers = [
        (header::CONTENT_TYPE, payload.content_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", payload.filename),
        ),
    ];
    Ok((headers, payload.bytes).into_response())
}

async fn delete_file(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Response> {
    state.service.delete(id).await?;
    Ok(Json(serde_json::json!({ "message": "file deleted" })).into_response())
}
