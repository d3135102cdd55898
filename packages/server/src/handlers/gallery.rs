use axum::Json;
use axum::extract::multipart::Field;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::GalleryCategory;
use common::storage::MediaFolder;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use super::event::find_event;
use super::uploads::remove_local_media;
use crate::entity::gallery_image;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, MaybeAuthUser};
use crate::extractors::json::AppJson;
use crate::models::gallery::*;
use crate::models::shared::{Pagination, blank_to_none, page_window, validate_optional_text};
use crate::state::AppState;
use crate::utils::upload::{UploadError, read_image_field};

async fn find_image<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<gallery_image::Model, AppError> {
    gallery_image::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".into()))
}

fn tags_value(tags: Vec<String>) -> serde_json::Value {
    serde_json::json!(tags)
}

async fn text_field(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::InvalidUpload(format!("Multipart error: {e}")))
}

fn parse_category(raw: &str) -> Result<GalleryCategory, AppError> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_lowercase())).map_err(|_| {
        AppError::Validation("category must be one of: event, venue, artist, other".into())
    })
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "on" => Ok(true),
        "false" | "0" | "off" => Ok(false),
        _ => Err(AppError::Validation(format!("{name} must be true or false"))),
    }
}

/// Metadata fields accepted alongside an uploaded image.
#[derive(Default)]
struct UploadMetadata {
    caption: Option<String>,
    event_id: Option<Uuid>,
    photographer: Option<String>,
    tags: Vec<String>,
    category: GalleryCategory,
    order_index: i32,
    is_published: Option<bool>,
}

impl UploadMetadata {
    async fn apply(&mut self, name: &str, field: Field<'_>) -> Result<(), AppError> {
        let value = text_field(field).await?;
        match name {
            "caption" => self.caption = blank_to_none(Some(value)),
            "photographer" => self.photographer = blank_to_none(Some(value)),
            "eventId" => {
                self.event_id = match value.trim() {
                    "" => None,
                    id => Some(
                        id.parse()
                            .map_err(|_| AppError::Validation("eventId must be a UUID".into()))?,
                    ),
                }
            }
            "tags" => self.tags = parse_tag_field(&value),
            "category" if !value.trim().is_empty() => self.category = parse_category(&value)?,
            "orderIndex" if !value.trim().is_empty() => {
                self.order_index = value
                    .trim()
                    .parse()
                    .map_err(|_| AppError::Validation("orderIndex must be an integer".into()))?
            }
            "isPublished" if !value.trim().is_empty() => {
                self.is_published = Some(parse_flag("isPublished", &value)?)
            }
            _ => {}
        }
        Ok(())
    }
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Gallery",
    operation_id = "createGalleryImage",
    summary = "Register a gallery image",
    description = "Registers an image that is already hosted, by URL. Use `/gallery/upload` to upload a file. Requires `gallery:manage`.",
    request_body = CreateGalleryImageRequest,
    responses(
        (status = 201, description = "Image registered", body = GalleryImageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(filename = %payload.filename))]
pub async fn create_gallery_image(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateGalleryImageRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("gallery:manage")?;
    validate_create_gallery_image(&payload)?;
    let tags = normalize_tags(&payload.tags)?;

    if let Some(event_id) = payload.event_id {
        find_event(&state.db, event_id).await?;
    }

    let now = chrono::Utc::now();
    let model = gallery_image::ActiveModel {
        id: Set(Uuid::now_v7()),
        filename: Set(payload.filename.trim().to_string()),
        url: Set(payload.url.trim().to_string()),
        thumbnail_url: Set(blank_to_none(payload.thumbnail_url)),
        medium_url: Set(blank_to_none(payload.medium_url)),
        large_url: Set(blank_to_none(payload.large_url)),
        caption: Set(blank_to_none(payload.caption)),
        event_id: Set(payload.event_id),
        photographer: Set(blank_to_none(payload.photographer)),
        tags: Set(tags_value(tags)),
        category: Set(payload.category),
        order_index: Set(payload.order_index),
        is_published: Set(payload.is_published),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(GalleryImageResponse::from(model))))
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "Gallery",
    operation_id = "uploadGalleryImage",
    summary = "Upload a gallery image",
    description = "Multipart upload with a single `image` field (jpg, jpeg, png or webp) and optional `caption`, `eventId`, `photographer`, `tags` (comma separated or JSON array), `category`, `orderIndex` and `isPublished` fields. Requires `gallery:manage`.",
    request_body(content_type = "multipart/form-data", description = "Image file plus metadata fields"),
    responses(
        (status = 201, description = "Image stored", body = GalleryImageResponse),
        (status = 400, description = "Rejected file or metadata (INVALID_UPLOAD, VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart))]
pub async fn upload_gallery_image(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("gallery:manage")?;

    let mut image = None;
    let mut meta = UploadMetadata::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidUpload(format!("Multipart error: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == "image" {
            if image.is_some() {
                return Err(AppError::InvalidUpload("Only one file may be uploaded".into()));
            }
            image = Some(read_image_field(field, state.config.upload.max_size).await?);
        } else {
            meta.apply(&name, field).await?;
        }
    }
    let image = image.ok_or(UploadError::Missing)?;

    let tags = normalize_tags(&meta.tags)?;
    if let Some(ref caption) = meta.caption {
        validate_optional_text("Caption", Some(caption), 1000)?;
    }
    if let Some(event_id) = meta.event_id {
        find_event(&state.db, event_id).await?;
    }

    let stored = state
        .media
        .put(MediaFolder::Gallery, image.extension, &image.data)
        .await?;
    tracing::info!(
        file = %stored.filename,
        original = %image.original_name,
        size = stored.size,
        "Stored gallery image"
    );

    let url = stored.public_url();
    let now = chrono::Utc::now();
    let inserted = gallery_image::ActiveModel {
        id: Set(Uuid::now_v7()),
        filename: Set(stored.filename.clone()),
        url: Set(url.clone()),
        thumbnail_url: Set(None),
        medium_url: Set(None),
        large_url: Set(None),
        caption: Set(meta.caption),
        event_id: Set(meta.event_id),
        photographer: Set(meta.photographer),
        tags: Set(tags_value(tags)),
        category: Set(meta.category),
        order_index: Set(meta.order_index),
        is_published: Set(meta.is_published.unwrap_or(true)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await;

    let model = match inserted {
        Ok(model) => model,
        Err(e) => {
            remove_local_media(state.media.as_ref(), Some(&url)).await;
            return Err(e.into());
        }
    };

    Ok((StatusCode::CREATED, Json(GalleryImageResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Gallery",
    operation_id = "listGalleryImages",
    summary = "List gallery images",
    description = "Paginated, ordered by `orderIndex` then newest first. Unpublished images are only listed for callers with `gallery:manage`.",
    params(GalleryListQuery),
    responses(
        (status = 200, description = "List of images", body = GalleryListResponse),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer, query))]
pub async fn list_gallery_images(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<GalleryListQuery>,
) -> Result<Json<GalleryListResponse>, AppError> {
    let (page, per_page) = page_window(query.page, query.per_page);
    let mut select = gallery_image::Entity::find();

    if viewer.has_permission("gallery:manage") {
        if let Some(published) = query.published {
            select = select.filter(gallery_image::Column::IsPublished.eq(published));
        }
    } else {
        select = select.filter(gallery_image::Column::IsPublished.eq(true));
    }
    if let Some(category) = query.category {
        select = select.filter(gallery_image::Column::Category.eq(category));
    }
    if let Some(event_id) = query.event_id {
        select = select.filter(gallery_image::Column::EventId.eq(event_id));
    }
    if let Some(ref tag) = query.tag {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() {
            select = select.filter(Expr::cust_with_values(
                r#""gallery_image"."tags" @> $1"#,
                [serde_json::json!([tag])],
            ));
        }
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let data = select
        .order_by_asc(gallery_image::Column::OrderIndex)
        .order_by_desc(gallery_image::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(GalleryImageResponse::from)
        .collect();

    Ok(Json(GalleryListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Gallery",
    operation_id = "getGalleryImage",
    summary = "Get a gallery image by ID",
    description = "Unpublished images return 404 unless the caller has `gallery:manage`.",
    params(("id" = Uuid, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Image", body = GalleryImageResponse),
        (status = 404, description = "Image not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer), fields(id = %id))]
pub async fn get_gallery_image(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GalleryImageResponse>, AppError> {
    let model = find_image(&state.db, id).await?;
    if !model.is_published && !viewer.has_permission("gallery:manage") {
        return Err(AppError::NotFound("Image not found".into()));
    }
    Ok(Json(model.into()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Gallery",
    operation_id = "updateGalleryImage",
    summary = "Update gallery image metadata",
    description = "Partially updates metadata; the stored file is unchanged. Requires `gallery:manage`.",
    params(("id" = Uuid, Path, description = "Image ID")),
    request_body = UpdateGalleryImageRequest,
    responses(
        (status = 200, description = "Image updated", body = GalleryImageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Image or event not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_gallery_image(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateGalleryImageRequest>,
) -> Result<Json<GalleryImageResponse>, AppError> {
    auth_user.require_permission("gallery:manage")?;
    validate_update_gallery_image(&payload)?;

    let existing = find_image(&state.db, id).await?;
    if payload == UpdateGalleryImageRequest::default() {
        return Ok(Json(existing.into()));
    }

    if let Some(Some(event_id)) = payload.event_id {
        find_event(&state.db, event_id).await?;
    }

    let mut active: gallery_image::ActiveModel = existing.into();
    if let Some(url) = payload.thumbnail_url {
        active.thumbnail_url = Set(blank_to_none(url));
    }
    if let Some(url) = payload.medium_url {
        active.medium_url = Set(blank_to_none(url));
    }
    if let Some(url) = payload.large_url {
        active.large_url = Set(blank_to_none(url));
    }
    if let Some(caption) = payload.caption {
        active.caption = Set(blank_to_none(caption));
    }
    if let Some(event_id) = payload.event_id {
        active.event_id = Set(event_id);
    }
    if let Some(photographer) = payload.photographer {
        active.photographer = Set(blank_to_none(photographer));
    }
    if let Some(ref tags) = payload.tags {
        active.tags = Set(tags_value(normalize_tags(tags)?));
    }
    if let Some(category) = payload.category {
        active.category = Set(category);
    }
    if let Some(order_index) = payload.order_index {
        active.order_index = Set(order_index);
    }
    if let Some(is_published) = payload.is_published {
        active.is_published = Set(is_published);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&state.db).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Gallery",
    operation_id = "deleteGalleryImage",
    summary = "Delete a gallery image",
    description = "Deletes the record and, for uploaded images, the stored file. Requires `gallery:manage`.",
    params(("id" = Uuid, Path, description = "Image ID")),
    responses(
        (status = 204, description = "Image deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Image not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_gallery_image(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("gallery:manage")?;

    let existing = find_image(&state.db, id).await?;
    gallery_image::Entity::delete_by_id(id).exec(&state.db).await?;
    remove_local_media(state.media.as_ref(), Some(&existing.url)).await;

    Ok(StatusCode::NO_CONTENT)
}
