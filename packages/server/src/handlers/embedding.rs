use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::embed::{
    EmbedValidationResult, Embedding, create_embedding, refresh_embedding,
};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use super::artist::find_artist;
use crate::entity::artist;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::artist::{EmbedCodeRequest, embeddings_of, embeddings_value};
use crate::state::AppState;

async fn find_artist_for_update(
    txn: &DatabaseTransaction,
    id: Uuid,
) -> Result<artist::Model, AppError> {
    use sea_orm::sea_query::LockType;
    artist::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Artist not found".into()))
}

/// Replace the stored embeddings of a locked artist row.
async fn save_embeddings(
    txn: &DatabaseTransaction,
    existing: artist::Model,
    embeddings: &[Embedding],
) -> Result<(), AppError> {
    let mut active: artist::ActiveModel = existing.into();
    active.embeddings = Set(embeddings_value(embeddings)?);
    active.updated_at = Set(chrono::Utc::now());
    active.update(txn).await?;
    Ok(())
}

#[utoipa::path(
    get,
    path = "/{id}/embeddings",
    tag = "Embeddings",
    operation_id = "listEmbeddings",
    summary = "List an artist's embeds",
    params(("id" = Uuid, Path, description = "Artist ID")),
    responses(
        (status = 200, description = "Stored embeds in insertion order", body = Vec<Embedding>),
        (status = 404, description = "Artist not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(artist_id = %id))]
pub async fn list_embeddings(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Embedding>>, AppError> {
    let artist = find_artist(&state.db, id).await?;
    Ok(Json(embeddings_of(&artist)?))
}

#[utoipa::path(
    post,
    path = "/{id}/embeddings",
    tag = "Embeddings",
    operation_id = "addEmbedding",
    summary = "Add an embed to an artist",
    description = "Validates and sanitizes Spotify, YouTube or SoundCloud iframe markup and appends it to the artist. Requires `artist:manage`.",
    params(("id" = Uuid, Path, description = "Artist ID")),
    request_body = EmbedCodeRequest,
    responses(
        (status = 201, description = "Embed stored", body = Embedding),
        (status = 400, description = "Rejected markup (INVALID_EMBED)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Artist not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(artist_id = %id))]
pub async fn add_embedding(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<EmbedCodeRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("artist:manage")?;

    let txn = state.db.begin().await?;
    let existing = find_artist_for_update(&txn, id).await?;

    let embedding = create_embedding(&state.embeds, &payload.embed_code)?;

    let mut embeddings = embeddings_of(&existing)?;
    embeddings.push(embedding.clone());
    save_embeddings(&txn, existing, &embeddings).await?;
    txn.commit().await?;

    tracing::info!(
        embedding_id = %embedding.id,
        platform = %embedding.platform,
        "Embed added"
    );

    Ok((StatusCode::CREATED, Json(embedding)))
}

#[utoipa::path(
    put,
    path = "/{id}/embeddings/{embedding_id}",
    tag = "Embeddings",
    operation_id = "updateEmbedding",
    summary = "Replace an embed's markup",
    description = "Re-validates and re-sanitizes the markup. The embed keeps its id and creation time. Requires `artist:manage`.",
    params(
        ("id" = Uuid, Path, description = "Artist ID"),
        ("embedding_id" = String, Path, description = "Embed ID"),
    ),
    request_body = EmbedCodeRequest,
    responses(
        (status = 200, description = "Embed updated", body = Embedding),
        (status = 400, description = "Rejected markup (INVALID_EMBED)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Artist or embed not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(artist_id = %id, embedding_id = %embedding_id))]
pub async fn update_embedding(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, embedding_id)): Path<(Uuid, String)>,
    AppJson(payload): AppJson<EmbedCodeRequest>,
) -> Result<Json<Embedding>, AppError> {
    auth_user.require_permission("artist:manage")?;

    let txn = state.db.begin().await?;
    let existing = find_artist_for_update(&txn, id).await?;

    let mut embeddings = embeddings_of(&existing)?;
    let slot = embeddings
        .iter_mut()
        .find(|e| e.id == embedding_id)
        .ok_or_else(|| AppError::NotFound("Embedding not found".into()))?;

    let refreshed = refresh_embedding(slot, &state.embeds, &payload.embed_code)?;
    *slot = refreshed.clone();

    save_embeddings(&txn, existing, &embeddings).await?;
    txn.commit().await?;

    Ok(Json(refreshed))
}

#[utoipa::path(
    delete,
    path = "/{id}/embeddings/{embedding_id}",
    tag = "Embeddings",
    operation_id = "deleteEmbedding",
    summary = "Remove an embed",
    description = "Removes the embed and returns the artist's remaining embeds. Requires `artist:manage`.",
    params(
        ("id" = Uuid, Path, description = "Artist ID"),
        ("embedding_id" = String, Path, description = "Embed ID"),
    ),
    responses(
        (status = 200, description = "Remaining embeds", body = Vec<Embedding>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Artist or embed not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(artist_id = %id, embedding_id = %embedding_id))]
pub async fn delete_embedding(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, embedding_id)): Path<(Uuid, String)>,
) -> Result<Json<Vec<Embedding>>, AppError> {
    auth_user.require_permission("artist:manage")?;

    let txn = state.db.begin().await?;
    let existing = find_artist_for_update(&txn, id).await?;

    let mut embeddings = embeddings_of(&existing)?;
    let before = embeddings.len();
    embeddings.retain(|e| e.id != embedding_id);
    if embeddings.len() == before {
        return Err(AppError::NotFound("Embedding not found".into()));
    }

    save_embeddings(&txn, existing, &embeddings).await?;
    txn.commit().await?;

    Ok(Json(embeddings))
}

#[utoipa::path(
    post,
    path = "/validate",
    tag = "Embeddings",
    operation_id = "validateEmbed",
    summary = "Preview embed validation",
    description = "Validates and sanitizes markup without storing anything. Invalid markup yields `isValid: false` with an error message, not a 4xx. Requires `artist:manage`.",
    request_body = EmbedCodeRequest,
    responses(
        (status = 200, description = "Validation outcome", body = EmbedValidationResult),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn validate_embed(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<EmbedCodeRequest>,
) -> Result<Json<EmbedValidationResult>, AppError> {
    auth_user.require_permission("artist:manage")?;
    Ok(Json(state.embeds.check(&payload.embed_code)))
}
