use crate::error::{DecodeError, StoreError};
use crate::server::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    /// Base64-encoded still image, with or without a `data:…;base64,`
    /// prefix (browsers capturing via canvas send the prefixed form).
    pub image: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub frame_id: String,
}

#[derive(Debug, Serialize)]
pub struct UploadErrorBody {
    pub error: String,
}

pub enum UploadError {
    Decode(DecodeError),
    Store(StoreError),
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            UploadError::Decode(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            UploadError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };
        (status, Json(UploadErrorBody { error: message })).into_response()
    }
}

fn strip_data_uri(payload: &str) -> &str {
    match payload.split_once("base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => payload,
    }
}

/// Frame ingestion endpoint: decode the payload, verify it parses as an
/// image, hand it to the store. The boundary is intentionally thin; no
/// auth or rate limiting, callers are trusted producers.
pub async fn upload(
    State(state): State<AppState>,
    Json(request): Json<UploadRequest>,
) -> Result<Json<UploadResponse>, UploadError> {
    let bytes = STANDARD
        .decode(strip_data_uri(&request.image))
        .map_err(|e| UploadError::Decode(DecodeError::Base64(e)))?;
    image::load_from_memory(&bytes)
        .map_err(|e| UploadError::Decode(DecodeError::Image(e)))?;

    let frame_id = state.store.put(bytes).await.map_err(UploadError::Store)?;
    debug!(
        "Frame {} stored, {} pending",
        frame_id,
        state.store.len().await.unwrap_or_default()
    );
    Ok(Json(UploadResponse {
        message: format!("Image saved successfully as {frame_id}"),
        frame_id: frame_id.to_string(),
    }))
}
