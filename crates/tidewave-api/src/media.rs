use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use tidewave_types::api::UploadResponse;
use tracing::{error, info};

use crate::middleware::Session;
use crate::state::{AppState, with_db};
use crate::storage::is_valid_file_id;

/// Content types accepted for upload. Anything a browser could execute
/// (SVG, HTML) is refused.
const ALLOWED_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "video/mp4",
    "video/webm",
];

/// POST /media: raw image or video bytes, returns `{ file_id, size }`. The id
/// goes into the `media_file` field of a new splash.
pub async fn upload_media(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    bytes: Bytes,
) -> Result<impl IntoResponse, StatusCode> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_ascii_lowercase())
        .filter(|v| ALLOWED_TYPES.contains(&v.as_str()))
        .ok_or(StatusCode::UNSUPPORTED_MEDIA_TYPE)?;

    if bytes.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    if bytes.len() > state.max_upload_bytes {
        return Err(StatusCode::PAYLOAD_TOO_LARGE);
    }

    let file_id = state.storage.save(&bytes).await.map_err(|e| {
        error!("Failed to store upload from {}: {}", session.username, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    let size = bytes.len() as i64;

    let fid = file_id.clone();
    let uploader = session.username.clone();
    with_db(&state, move |db| db.insert_media_file(&fid, &uploader, &content_type, size))
        .await
        .map_err(|e| {
            error!("DB insert_media_file error: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    info!("Media {} ({} bytes) uploaded by {}", file_id, size, session.username);
    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            file_id,
            size: size as u64,
        }),
    ))
}

/// GET /media/{file_id}
///
/// Served with `nosniff` and a sandboxing CSP so a stored file never runs
/// as a document on this origin.
pub async fn download_media(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    if !is_valid_file_id(&file_id) {
        return Err(StatusCode::NOT_FOUND);
    }

    let fid = file_id.clone();
    let row = with_db(&state, move |db| db.get_media_file(&fid))
        .await
        .map_err(|e| {
            error!("DB get_media_file error: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    let bytes = state
        .storage
        .read(&file_id)
        .await
        .map_err(|e| {
            error!("Failed to read media {}: {}", file_id, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or_else(|| {
            error!("Media {} is recorded but missing on disk", file_id);
            StatusCode::NOT_FOUND
        })?;

    Ok((
        [
            (header::CONTENT_TYPE, row.content_type),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
            (header::CONTENT_SECURITY_POLICY, "sandbox".to_string()),
        ],
        bytes,
    ))
}
