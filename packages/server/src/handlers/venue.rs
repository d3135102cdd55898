use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::embed::sanitize_embed_code;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{event, venue};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::shared::{Pagination, blank_to_none, escape_like, page_window};
use crate::models::venue::*;
use crate::state::AppState;

/// Find a venue by ID or return 404.
pub(crate) async fn find_venue<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<venue::Model, AppError> {
    venue::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Venue not found".into()))
}

/// Sanitize optional map markup. Blank input clears the field.
fn sanitize_map(html: Option<String>) -> Result<Option<String>, AppError> {
    blank_to_none(html)
        .map(|html| sanitize_embed_code(&html))
        .transpose()
        .map_err(AppError::from)
}

fn clean_images(images: Vec<String>) -> serde_json::Value {
    let images: Vec<String> = images
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    serde_json::json!(images)
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Venues",
    operation_id = "createVenue",
    summary = "Create a venue",
    description = "Map markup in `mapEmbedHtml` must be a single iframe and is sanitized before storage. Requires `venue:manage`.",
    request_body = CreateVenueRequest,
    responses(
        (status = 201, description = "Venue created", body = VenueResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR, INVALID_EMBED)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_venue(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateVenueRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("venue:manage")?;
    validate_create_venue(&payload)?;

    let map_embed_html = sanitize_map(payload.map_embed_html)?;
    let now = chrono::Utc::now();

    let model = venue::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(payload.name.trim().to_string()),
        description: Set(blank_to_none(payload.description)),
        address: Set(payload.address.trim().to_string()),
        city: Set(blank_to_none(payload.city)),
        image_url: Set(blank_to_none(payload.image_url)),
        images: Set(clean_images(payload.images)),
        map_embed_html: Set(map_embed_html),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(VenueResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Venues",
    operation_id = "listVenues",
    summary = "List venues",
    description = "Paginated, ordered by name. Public.",
    params(VenueListQuery),
    responses(
        (status = 200, description = "List of venues", body = VenueListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_venues(
    State(state): State<AppState>,
    Query(query): Query<VenueListQuery>,
) -> Result<Json<VenueListResponse>, AppError> {
    let (page, per_page) = page_window(query.page, query.per_page);
    let mut select = venue::Entity::find();

    if let Some(ref city) = query.city {
        let city = city.trim().to_lowercase();
        if !city.is_empty() {
            select = select.filter(Expr::expr(Func::lower(Expr::col(venue::Column::City))).eq(city));
        }
    }
    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            let pattern = format!("%{}%", term.to_lowercase());
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(venue::Column::Name)))
                            .like(LikeExpr::new(&pattern).escape('\\')),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(venue::Column::Address)))
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
        .order_by_asc(venue::Column::Name)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(VenueResponse::from)
        .collect();

    Ok(Json(VenueListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Venues",
    operation_id = "getVenue",
    summary = "Get a venue by ID",
    params(("id" = Uuid, Path, description = "Venue ID")),
    responses(
        (status = 200, description = "Venue details", body = VenueResponse),
        (status = 404, description = "Venue not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id = %id))]
pub async fn get_venue(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VenueResponse>, AppError> {
    let model = find_venue(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Venues",
    operation_id = "updateVenue",
    summary = "Update a venue",
    description = "Partially updates a venue; only provided fields change. Requires `venue:manage`.",
    params(("id" = Uuid, Path, description = "Venue ID")),
    request_body = UpdateVenueRequest,
    responses(
        (status = 200, description = "Venue updated", body = VenueResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR, INVALID_EMBED)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Venue not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_venue(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateVenueRequest>,
) -> Result<Json<VenueResponse>, AppError> {
    auth_user.require_permission("venue:manage")?;
    validate_update_venue(&payload)?;

    if payload == UpdateVenueRequest::default() {
        let existing = find_venue(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;

    let existing = find_venue(&txn, id).await?;
    let mut active: venue::ActiveModel = existing.into();

    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(blank_to_none(description));
    }
    if let Some(ref address) = payload.address {
        active.address = Set(address.trim().to_string());
    }
    if let Some(city) = payload.city {
        active.city = Set(blank_to_none(city));
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(blank_to_none(image_url));
    }
    if let Some(images) = payload.images {
        active.images = Set(clean_images(images));
    }
    if let Some(map) = payload.map_embed_html {
        active.map_embed_html = Set(sanitize_map(map)?);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Venues",
    operation_id = "deleteVenue",
    summary = "Delete a venue",
    description = "Requires `venue:manage`. Returns 409 while events still reference the venue.",
    params(("id" = Uuid, Path, description = "Venue ID")),
    responses(
        (status = 204, description = "Venue deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Venue not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Venue has events (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_venue(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("venue:manage")?;

    let txn = state.db.begin().await?;
    find_venue(&txn, id).await?;

    let event_count = event::Entity::find()
        .filter(event::Column::VenueId.eq(id))
        .count(&txn)
        .await?;
    if event_count > 0 {
        return Err(AppError::Conflict(
            "Cannot delete venue with scheduled events".into(),
        ));
    }

    venue::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
