use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use super::artist::find_artist;
use super::event::find_event;
use crate::entity::event_artist;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::event_artist::*;
use crate::models::shared::{Pagination, blank_to_none, page_window};
use crate::state::AppState;

async fn find_entry<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<event_artist::Model, AppError> {
    event_artist::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Line-up entry not found".into()))
}

fn map_unique_pair(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Artist is already on this event's line-up".into())
        }
        _ => AppError::from(e),
    }
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Line-up",
    operation_id = "createEventArtist",
    summary = "Add an artist to an event line-up",
    description = "Each artist appears at most once per event. Requires `event:manage`.",
    request_body = CreateEventArtistRequest,
    responses(
        (status = 201, description = "Line-up entry created", body = EventArtistResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Event or artist not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Artist already on the line-up (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(event_id = %payload.event_id, artist_id = %payload.artist_id))]
pub async fn create_event_artist(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateEventArtistRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("event:manage")?;
    validate_create_event_artist(&payload)?;

    find_event(&state.db, payload.event_id).await?;
    find_artist(&state.db, payload.artist_id).await?;

    let existing = event_artist::Entity::find()
        .filter(event_artist::Column::EventId.eq(payload.event_id))
        .filter(event_artist::Column::ArtistId.eq(payload.artist_id))
        .count(&state.db)
        .await?;
    if existing > 0 {
        return Err(AppError::Conflict(
            "Artist is already on this event's line-up".into(),
        ));
    }

    let now = chrono::Utc::now();
    let model = event_artist::ActiveModel {
        id: Set(Uuid::now_v7()),
        event_id: Set(payload.event_id),
        artist_id: Set(payload.artist_id),
        performance_order: Set(payload.performance_order),
        performance_time: Set(blank_to_none(payload.performance_time)),
        set_duration: Set(payload.set_duration),
        fee: Set(payload.fee),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(map_unique_pair)?;

    Ok((StatusCode::CREATED, Json(EventArtistResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Line-up",
    operation_id = "listEventArtists",
    summary = "List line-up entries",
    description = "Paginated, ordered by event then performance order. Public.",
    params(EventArtistListQuery),
    responses(
        (status = 200, description = "List of line-up entries", body = EventArtistListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_event_artists(
    State(state): State<AppState>,
    Query(query): Query<EventArtistListQuery>,
) -> Result<Json<EventArtistListResponse>, AppError> {
    let (page, per_page) = page_window(query.page, query.per_page);
    let mut select = event_artist::Entity::find();

    if let Some(event_id) = query.event_id {
        select = select.filter(event_artist::Column::EventId.eq(event_id));
    }
    if let Some(artist_id) = query.artist_id {
        select = select.filter(event_artist::Column::ArtistId.eq(artist_id));
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let data = select
        .order_by_asc(event_artist::Column::EventId)
        .order_by_asc(event_artist::Column::PerformanceOrder)
        .order_by_asc(event_artist::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(EventArtistResponse::from)
        .collect();

    Ok(Json(EventArtistListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Line-up",
    operation_id = "getEventArtist",
    summary = "Get a line-up entry by ID",
    params(("id" = Uuid, Path, description = "Line-up entry ID")),
    responses(
        (status = 200, description = "Line-up entry", body = EventArtistResponse),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id = %id))]
pub async fn get_event_artist(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EventArtistResponse>, AppError> {
    Ok(Json(find_entry(&state.db, id).await?.into()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Line-up",
    operation_id = "updateEventArtist",
    summary = "Update a line-up entry",
    description = "Changes slot details only; the event and artist are fixed. Requires `event:manage`.",
    params(("id" = Uuid, Path, description = "Line-up entry ID")),
    request_body = UpdateEventArtistRequest,
    responses(
        (status = 200, description = "Line-up entry updated", body = EventArtistResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_event_artist(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateEventArtistRequest>,
) -> Result<Json<EventArtistResponse>, AppError> {
    auth_user.require_permission("event:manage")?;
    validate_update_event_artist(&payload)?;

    let existing = find_entry(&state.db, id).await?;
    if payload == UpdateEventArtistRequest::default() {
        return Ok(Json(existing.into()));
    }

    let mut active: event_artist::ActiveModel = existing.into();
    if let Some(order) = payload.performance_order {
        active.performance_order = Set(order);
    }
    if let Some(time) = payload.performance_time {
        active.performance_time = Set(blank_to_none(time));
    }
    if let Some(duration) = payload.set_duration {
        active.set_duration = Set(duration);
    }
    if let Some(fee) = payload.fee {
        active.fee = Set(fee);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&state.db).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Line-up",
    operation_id = "deleteEventArtist",
    summary = "Delete a line-up entry",
    description = "Requires `event:manage`.",
    params(("id" = Uuid, Path, description = "Line-up entry ID")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_event_artist(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("event:manage")?;

    let result = event_artist::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Line-up entry not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/event/{event_id}/artist/{artist_id}",
    tag = "Line-up",
    operation_id = "removeArtistFromEvent",
    summary = "Remove an artist from an event",
    description = "Deletes the line-up entry for the pair. Requires `event:manage`.",
    params(
        ("event_id" = Uuid, Path, description = "Event ID"),
        ("artist_id" = Uuid, Path, description = "Artist ID"),
    ),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Artist is not on the line-up (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(event_id = %event_id, artist_id = %artist_id))]
pub async fn remove_artist_from_event(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((event_id, artist_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("event:manage")?;

    let result = event_artist::Entity::delete_many()
        .filter(event_artist::Column::EventId.eq(event_id))
        .filter(event_artist::Column::ArtistId.eq(artist_id))
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound(
            "Artist is not on this event's line-up".into(),
        ));
    }
    Ok(StatusCode::NO_CONTENT)
}
