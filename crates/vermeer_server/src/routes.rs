//! HTTP routes and handlers.
//!
//! The surface mirrors the route schema exactly:
//!
//! - `PUT /` — multipart upload, field `file`; 200 `{"uuid"}` / 400 `{}` / 403 `{}`
//! - `GET /{uuid}/{variant}` — derivative or original bytes; 200 / 404 `{}`
//! - `HEAD /{uuid}/{variant}` — liveness probe, always 200
//!
//! Reads declare no 5xx, so internal failures on the read path resolve to
//! 404 and are logged distinctly instead.

use crate::Uploader;
use axum::{
    Router,
    extract::{Multipart, Path, State, multipart::MultipartRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, put},
};
use serde_json::json;
use std::sync::Arc;
use vermeer_cache::DerivativePipeline;
use vermeer_core::VariantKey;
use vermeer_error::{UploadErrorKind, VermeerError, VermeerErrorKind};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    uploader: Arc<Uploader>,
    pipeline: Arc<DerivativePipeline>,
    upload_token: Option<String>,
}

impl AppState {
    /// Creates new app state.
    pub fn new(
        uploader: Arc<Uploader>,
        pipeline: Arc<DerivativePipeline>,
        upload_token: Option<String>,
    ) -> Self {
        Self {
            uploader,
            pipeline,
            upload_token,
        }
    }
}

/// Creates the service router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", put(upload))
        .route("/:uuid/:variant", get(fetch_variant).head(probe_variant))
        .with_state(state)
}

/// Empty-body JSON response, the schema's shape for all non-200 outcomes.
fn empty_json(status: StatusCode) -> Response {
    (status, Json(json!({}))).into_response()
}

/// Upload an original image.
async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    if let Some(expected) = &state.upload_token {
        let authorized = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected);
        if !authorized {
            tracing::warn!("Rejected upload without valid token");
            return empty_json(StatusCode::FORBIDDEN);
        }
    }

    // Extracted as a Result so a non-multipart body still resolves to the
    // schema's JSON 400 instead of the extractor's default rejection.
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected non-multipart upload");
            return empty_json(StatusCode::BAD_REQUEST);
        }
    };

    let mut payload = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            match field.bytes().await {
                Ok(bytes) => payload = Some((bytes, filename)),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read multipart payload");
                    return empty_json(StatusCode::BAD_REQUEST);
                }
            }
            break;
        }
    }

    let Some((bytes, filename)) = payload else {
        return empty_json(StatusCode::BAD_REQUEST);
    };

    match state.uploader.upload(&bytes, &filename).await {
        Ok(id) => (StatusCode::OK, Json(json!({ "uuid": id.to_string() }))).into_response(),
        Err(e) => {
            if matches!(e.kind(), VermeerErrorKind::Storage(_)) {
                tracing::error!(error = %e, "Upload storage failure");
            } else {
                tracing::warn!(error = %e, "Upload rejected");
            }
            empty_json(upload_error_status(&e))
        }
    }
}

/// Status for a failed upload.
///
/// The schema declares 200/400/403 for `PUT /`, so storage faults surface as
/// 400 as well; the log line above keeps them distinguishable.
fn upload_error_status(err: &VermeerError) -> StatusCode {
    match err.kind() {
        VermeerErrorKind::Upload(u) if matches!(u.kind, UploadErrorKind::Forbidden(_)) => {
            StatusCode::FORBIDDEN
        }
        _ => StatusCode::BAD_REQUEST,
    }
}

/// Serve a derivative or original.
async fn fetch_variant(
    State(state): State<AppState>,
    Path((uuid, variant)): Path<(String, String)>,
) -> Response {
    let key = match VariantKey::parse(&format!("{uuid}/{variant}")) {
        Ok(key) => key,
        Err(e) => {
            tracing::debug!(uuid = %uuid, variant = %variant, error = %e, "Unparseable variant path");
            return empty_json(StatusCode::NOT_FOUND);
        }
    };

    match state.pipeline.get_or_create(&key).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, key.mime_type())], bytes).into_response(),
        Err(e) if e.is_not_found() => {
            tracing::debug!(key = %key, "Variant not found");
            empty_json(StatusCode::NOT_FOUND)
        }
        Err(e) => {
            // Internal failure, but the read routes declare only 200/404
            tracing::error!(key = %key, error = %e, "Read path failure");
            empty_json(StatusCode::NOT_FOUND)
        }
    }
}

/// Liveness probe for the variant route family; always 200.
async fn probe_variant(Path((_uuid, _variant)): Path<(String, String)>) -> StatusCode {
    StatusCode::OK
}
