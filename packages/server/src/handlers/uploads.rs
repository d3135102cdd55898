use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use common::storage::{MediaFolder, MediaStore};
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// Split a `/uploads/{folder}/{file}` URL into its parts. Anything else
/// (external URLs, nested paths) yields `None`.
pub fn local_media(url: &str) -> Option<(MediaFolder, &str)> {
    let rest = url.strip_prefix("/uploads/")?;
    let (folder, file) = rest.split_once('/')?;
    if file.is_empty() || file.contains('/') {
        return None;
    }
    Some((folder.parse().ok()?, file))
}

/// Delete a previously stored upload. Failures are logged, never returned.
pub async fn remove_local_media(store: &dyn MediaStore, url: Option<&str>) {
    let Some((folder, file)) = url.and_then(local_media) else {
        return;
    };
    match store.delete(folder, file).await {
        Ok(true) => tracing::debug!(%folder, file, "Removed stored media"),
        Ok(false) => {}
        Err(e) => tracing::warn!(%folder, file, "Failed to remove stored media: {}", e),
    }
}

#[utoipa::path(
    get,
    path = "/uploads/{folder}/{file}",
    tag = "Uploads",
    operation_id = "getUpload",
    summary = "Fetch an uploaded image",
    params(
        ("folder" = String, Path, description = "`gallery` or `artists`"),
        ("file" = String, Path, description = "Stored filename"),
    ),
    responses(
        (status = 200, description = "Image bytes"),
        (status = 404, description = "Not found (NOT_FOUND)", body = crate::error::ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn serve_upload(
    State(state): State<AppState>,
    Path((folder, file)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let folder: MediaFolder = folder.parse()?;
    let content = state.media.get(folder, &file).await?;

    let mime = mime_guess::from_path(&file).first_or_octet_stream();

    Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .header("X-Content-Type-Options", "nosniff")
        .body(Body::from(content))
        .map_err(|e| AppError::Internal(e.to_string()))
}
