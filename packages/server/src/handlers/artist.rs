use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::slug::slugify;
use common::storage::MediaFolder;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use super::uploads::remove_local_media;
use crate::entity::{artist, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::artist::*;
use crate::models::shared::{Pagination, blank_to_none, escape_like, page_window};
use crate::state::AppState;
use crate::utils::upload::{UploadError, read_image_field};

/// Find an artist by ID or return 404.
pub(crate) async fn find_artist<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<artist::Model, AppError> {
    artist::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Artist not found".into()))
}

/// First free slug among `base`, `base-2`, `base-3`, ...
async fn unique_slug<C: ConnectionTrait>(
    db: &C,
    base: &str,
    exclude: Option<Uuid>,
) -> Result<String, AppError> {
    let base = if base.is_empty() { "artist" } else { base };
    let mut candidate = base.to_string();
    let mut n = 2;
    loop {
        let mut query = artist::Entity::find().filter(artist::Column::Slug.eq(&candidate));
        if let Some(id) = exclude {
            query = query.filter(artist::Column::Id.ne(id));
        }
        if query.count(db).await? == 0 {
            return Ok(candidate);
        }
        candidate = format!("{base}-{n}");
        n += 1;
    }
}

async fn ensure_user_exists<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), AppError> {
    if user::Entity::find_by_id(id).one(db).await?.is_none() {
        return Err(AppError::Validation("bookingUserId does not exist".into()));
    }
    Ok(())
}

fn map_unique_slug(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("An artist with this slug already exists".into())
        }
        _ => AppError::from(e),
    }
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Artists",
    operation_id = "createArtist",
    summary = "Create an artist",
    description = "Creates an artist with no embeds. The slug is derived from the name unless given; a numeric suffix is appended when taken. Requires `artist:manage`.",
    request_body = CreateArtistRequest,
    responses(
        (status = 201, description = "Artist created", body = ArtistResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_artist(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateArtistRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("artist:manage")?;
    validate_create_artist(&payload)?;

    if let Some(booking_user_id) = payload.booking_user_id {
        ensure_user_exists(&state.db, booking_user_id).await?;
    }

    let name = payload.name.trim().to_string();
    let base = slugify(payload.slug.as_deref().unwrap_or(&name));
    let slug = unique_slug(&state.db, &base, None).await?;

    let now = chrono::Utc::now();
    let model = artist::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(name),
        slug: Set(slug),
        bio: Set(blank_to_none(payload.bio)),
        image_url: Set(blank_to_none(payload.image_url)),
        website: Set(blank_to_none(payload.website)),
        social_media: Set(payload.social_media),
        genre: Set(blank_to_none(payload.genre)),
        is_bookable: Set(payload.is_bookable),
        booking_user_id: Set(payload.booking_user_id),
        embeddings: Set(serde_json::json!([])),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(map_unique_slug)?;

    Ok((StatusCode::CREATED, Json(ArtistResponse::try_from(model)?)))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Artists",
    operation_id = "listArtists",
    summary = "List artists",
    description = "Paginated, ordered by name. Public.",
    params(ArtistListQuery),
    responses(
        (status = 200, description = "List of artists", body = ArtistListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_artists(
    State(state): State<AppState>,
    Query(query): Query<ArtistListQuery>,
) -> Result<Json<ArtistListResponse>, AppError> {
    let (page, per_page) = page_window(query.page, query.per_page);
    let mut select = artist::Entity::find();

    if let Some(ref genre) = query.genre {
        let genre = genre.trim().to_lowercase();
        if !genre.is_empty() {
            select = select.filter(Expr::expr(Func::lower(Expr::col(artist::Column::Genre))).eq(genre));
        }
    }
    if let Some(bookable) = query.bookable {
        select = select.filter(artist::Column::IsBookable.eq(bookable));
    }
    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            let pattern = format!("%{}%", term.to_lowercase());
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(artist::Column::Name)))
                            .like(LikeExpr::new(&pattern).escape('\\')),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(artist::Column::Bio)))
                            .like(LikeExpr::new(&pattern).escape('\\')),
                    ),
            );
        }
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let data = select
        .order_by_asc(artist::Column::Name)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(ArtistResponse::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(ArtistListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Artists",
    operation_id = "getArtist",
    summary = "Get an artist by ID",
    params(("id" = Uuid, Path, description = "Artist ID")),
    responses(
        (status = 200, description = "Artist details", body = ArtistResponse),
        (status = 404, description = "Artist not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id = %id))]
pub async fn get_artist(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ArtistResponse>, AppError> {
    let model = find_artist(&state.db, id).await?;
    Ok(Json(model.try_into()?))
}

#[utoipa::path(
    get,
    path = "/slug/{slug}",
    tag = "Artists",
    operation_id = "getArtistBySlug",
    summary = "Get an artist by slug",
    params(("slug" = String, Path, description = "Artist slug")),
    responses(
        (status = 200, description = "Artist details", body = ArtistResponse),
        (status = 404, description = "Artist not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_artist_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ArtistResponse>, AppError> {
    let model = artist::Entity::find()
        .filter(artist::Column::Slug.eq(slug.to_lowercase()))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Artist not found".into()))?;
    Ok(Json(model.try_into()?))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Artists",
    operation_id = "updateArtist",
    summary = "Update an artist",
    description = "Partially updates an artist; only provided fields change. Embeds are managed through the embeddings endpoints. Requires `artist:manage`.",
    params(("id" = Uuid, Path, description = "Artist ID")),
    request_body = UpdateArtistRequest,
    responses(
        (status = 200, description = "Artist updated", body = ArtistResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Artist not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Slug taken (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_artist(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateArtistRequest>,
) -> Result<Json<ArtistResponse>, AppError> {
    auth_user.require_permission("artist:manage")?;
    validate_update_artist(&payload)?;

    if payload == UpdateArtistRequest::default() {
        let existing = find_artist(&state.db, id).await?;
        return Ok(Json(existing.try_into()?));
    }

    let txn = state.db.begin().await?;

    let existing = find_artist(&txn, id).await?;
    let mut active: artist::ActiveModel = existing.into();

    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(ref slug) = payload.slug {
        let slug = slugify(slug);
        if slug.is_empty() {
            return Err(AppError::Validation(
                "Slug must contain at least one letter or digit".into(),
            ));
        }
        active.slug = Set(slug);
    }
    if let Some(bio) = payload.bio {
        active.bio = Set(blank_to_none(bio));
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(blank_to_none(image_url));
    }
    if let Some(website) = payload.website {
        active.website = Set(blank_to_none(website));
    }
    if let Some(social_media) = payload.social_media {
        active.social_media = Set(social_media);
    }
    if let Some(genre) = payload.genre {
        active.genre = Set(blank_to_none(genre));
    }
    if let Some(is_bookable) = payload.is_bookable {
        active.is_bookable = Set(is_bookable);
    }
    if let Some(booking_user_id) = payload.booking_user_id {
        if let Some(uid) = booking_user_id {
            ensure_user_exists(&txn, uid).await?;
        }
        active.booking_user_id = Set(booking_user_id);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await.map_err(map_unique_slug)?;
    txn.commit().await?;

    Ok(Json(model.try_into()?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Artists",
    operation_id = "deleteArtist",
    summary = "Delete an artist",
    description = "Deletes the artist, its embeds and its line-up entries. Requires `artist:manage`.",
    params(("id" = Uuid, Path, description = "Artist ID")),
    responses(
        (status = 204, description = "Artist deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Artist not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_artist(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("artist:manage")?;

    let existing = find_artist(&state.db, id).await?;
    artist::Entity::delete_by_id(id).exec(&state.db).await?;

    remove_local_media(state.media.as_ref(), existing.image_url.as_deref()).await;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/image",
    tag = "Artists",
    operation_id = "uploadArtistImage",
    summary = "Upload an artist image",
    description = "Multipart upload with a single `image` field (jpg, jpeg, png or webp). Replaces the artist's image; a previously uploaded file is removed. Requires `artist:manage`.",
    params(("id" = Uuid, Path, description = "Artist ID")),
    request_body(content_type = "multipart/form-data", description = "Image file in the `image` field"),
    responses(
        (status = 200, description = "Artist with new image", body = ArtistResponse),
        (status = 400, description = "Rejected file (INVALID_UPLOAD)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Artist not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(id = %id))]
pub async fn upload_artist_image(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ArtistResponse>, AppError> {
    auth_user.require_permission("artist:manage")?;
    let existing = find_artist(&state.db, id).await?;

    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidUpload(format!("Multipart error: {e}")))?
    {
        if field.name() == Some("image") {
            if image.is_some() {
                return Err(AppError::InvalidUpload("Only one file may be uploaded".into()));
            }
            image = Some(read_image_field(field, state.config.upload.max_size).await?);
        }
    }
    let image = image.ok_or(UploadError::Missing)?;

    let stored = state
        .media
        .put(MediaFolder::Artists, image.extension, &image.data)
        .await?;
    tracing::info!(file = %stored.filename, size = stored.size, "Stored artist image");

    let old_url = existing.image_url.clone();
    let mut active: artist::ActiveModel = existing.into();
    active.image_url = Set(Some(stored.public_url()));
    active.updated_at = Set(chrono::Utc::now());
    let model = match active.update(&state.db).await {
        Ok(model) => model,
        Err(e) => {
            remove_local_media(state.media.as_ref(), Some(&stored.public_url())).await;
            return Err(e.into());
        }
    };

    remove_local_media(state.media.as_ref(), old_url.as_deref()).await;

    Ok(Json(model.try_into()?))
}
