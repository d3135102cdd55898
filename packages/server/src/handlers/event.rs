use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::EventStatus;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr, LockType, NullOrdering, Query as SqlQuery};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{artist, event, event_artist, venue};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, MaybeAuthUser};
use crate::extractors::json::AppJson;
use crate::models::event::*;
use crate::models::shared::{Pagination, blank_to_none, escape_like, page_window};
use crate::state::AppState;

/// Find an event by ID or return 404.
pub(crate) async fn find_event<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<event::Model, AppError> {
    event::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))
}

/// Inactive and draft events are hidden from callers without `event:manage`.
fn publicly_visible(model: &event::Model) -> bool {
    model.is_active && model.status != EventStatus::Draft
}

async fn ensure_venue_exists<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), AppError> {
    if venue::Entity::find_by_id(id).one(db).await?.is_none() {
        return Err(AppError::Validation("venueId does not exist".into()));
    }
    Ok(())
}

/// Line-up entries for an event, ordered by performance order (unset last).
async fn load_lineup<C: ConnectionTrait>(
    db: &C,
    event_id: Uuid,
) -> Result<Vec<LineupEntry>, AppError> {
    let entries = event_artist::Entity::find()
        .filter(event_artist::Column::EventId.eq(event_id))
        .order_by_with_nulls(
            event_artist::Column::PerformanceOrder,
            Order::Asc,
            NullOrdering::Last,
        )
        .order_by_asc(event_artist::Column::CreatedAt)
        .all(db)
        .await?;

    if entries.is_empty() {
        return Ok(Vec::new());
    }

    let artist_ids: Vec<Uuid> = entries.iter().map(|e| e.artist_id).collect();
    let mut artists: HashMap<Uuid, artist::Model> = artist::Entity::find()
        .filter(artist::Column::Id.is_in(artist_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();

    Ok(entries
        .into_iter()
        .filter_map(|entry| {
            let artist = artists.remove(&entry.artist_id)?;
            Some(LineupEntry {
                id: entry.id,
                performance_order: entry.performance_order,
                performance_time: entry.performance_time,
                set_duration: entry.set_duration,
                artist: artist.into(),
            })
        })
        .collect())
}

async fn load_detail<C: ConnectionTrait>(
    db: &C,
    model: event::Model,
) -> Result<EventDetailResponse, AppError> {
    let venue = match model.venue_id {
        Some(venue_id) => venue::Entity::find_by_id(venue_id).one(db).await?,
        None => None,
    };
    let lineup = load_lineup(db, model.id).await?;

    Ok(EventDetailResponse {
        event: model.into(),
        venue: venue.map(Into::into),
        lineup,
    })
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Events",
    operation_id = "createEvent",
    summary = "Create an event",
    description = "Requires `event:manage`.",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventDetailResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_event(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("event:manage")?;
    validate_create_event(&payload)?;

    if let Some(venue_id) = payload.venue_id {
        ensure_venue_exists(&state.db, venue_id).await?;
    }

    let now = chrono::Utc::now();
    let model = event::ActiveModel {
        id: Set(Uuid::now_v7()),
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description.trim().to_string()),
        date: Set(payload.date),
        start_time: Set(payload.start_time),
        end_time: Set(blank_to_none(payload.end_time)),
        ticket_price: Set(payload.ticket_price),
        total_tickets: Set(payload.total_tickets),
        sold_tickets: Set(0),
        image_url: Set(blank_to_none(payload.image_url)),
        is_active: Set(payload.is_active),
        status: Set(payload.status),
        capacity: Set(payload.capacity),
        current_attendees: Set(0),
        billetto_url: Set(blank_to_none(payload.billetto_url)),
        venue_id: Set(payload.venue_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(event_id = %model.id, "Event created");

    let detail = load_detail(&state.db, model).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Events",
    operation_id = "listEvents",
    summary = "List events",
    description = "Paginated, ordered by date then start time. Inactive and draft events are only listed for callers with `event:manage`.",
    params(EventListQuery),
    responses(
        (status = 200, description = "List of events", body = EventListResponse),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer, query))]
pub async fn list_events(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<EventListQuery>,
) -> Result<Json<EventListResponse>, AppError> {
    let (page, per_page) = page_window(query.page, query.per_page);
    let mut select = event::Entity::find();

    if !viewer.has_permission("event:manage") {
        select = select
            .filter(event::Column::IsActive.eq(true))
            .filter(event::Column::Status.ne(EventStatus::Draft));
    }
    if let Some(venue_id) = query.venue_id {
        select = select.filter(event::Column::VenueId.eq(venue_id));
    }
    if let Some(artist_id) = query.artist_id {
        select = select.filter(
            event::Column::Id.in_subquery(
                SqlQuery::select()
                    .column(event_artist::Column::EventId)
                    .from(event_artist::Entity)
                    .and_where(event_artist::Column::ArtistId.eq(artist_id))
                    .to_owned(),
            ),
        );
    }
    if let Some(from) = query.from {
        select = select.filter(event::Column::Date.gte(from));
    }
    if let Some(to) = query.to {
        select = select.filter(event::Column::Date.lte(to));
    }
    if query.upcoming == Some(true) {
        let today = chrono::Utc::now().date_naive();
        select = select.filter(event::Column::Date.gte(today));
    }
    if let Some(status) = query.status {
        select = select.filter(event::Column::Status.eq(status));
    }
    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            let pattern = format!("%{}%", term.to_lowercase());
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(event::Column::Title)))
                    .like(LikeExpr::new(pattern).escape('\\')),
            );
        }
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let data = select
        .order_by_asc(event::Column::Date)
        .order_by_asc(event::Column::StartTime)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(EventResponse::from)
        .collect();

    Ok(Json(EventListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Events",
    operation_id = "getEvent",
    summary = "Get an event by ID",
    description = "Returns the event with its venue and line-up. Hidden events return 404 unless the caller has `event:manage`.",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event details", body = EventDetailResponse),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer), fields(id = %id))]
pub async fn get_event(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EventDetailResponse>, AppError> {
    let model = find_event(&state.db, id).await?;
    if !publicly_visible(&model) && !viewer.has_permission("event:manage") {
        return Err(AppError::NotFound("Event not found".into()));
    }

    Ok(Json(load_detail(&state.db, model).await?))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Events",
    operation_id = "updateEvent",
    summary = "Update an event",
    description = "Partially updates an event; only provided fields change. `soldTickets` may never exceed `totalTickets`. Requires `event:manage`.",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Event updated", body = EventDetailResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_event(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateEventRequest>,
) -> Result<Json<EventDetailResponse>, AppError> {
    auth_user.require_permission("event:manage")?;

    if payload == UpdateEventRequest::default() {
        let existing = find_event(&state.db, id).await?;
        return Ok(Json(load_detail(&state.db, existing).await?));
    }

    let txn = state.db.begin().await?;

    let existing = event::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))?;
    validate_update_event(&payload, &existing)?;

    if let Some(Some(venue_id)) = payload.venue_id {
        ensure_venue_exists(&txn, venue_id).await?;
    }

    let mut active: event::ActiveModel = existing.into();

    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(ref description) = payload.description {
        active.description = Set(description.trim().to_string());
    }
    if let Some(date) = payload.date {
        active.date = Set(date);
    }
    if let Some(start_time) = payload.start_time {
        active.start_time = Set(start_time);
    }
    if let Some(end_time) = payload.end_time {
        active.end_time = Set(blank_to_none(end_time));
    }
    if let Some(price) = payload.ticket_price {
        active.ticket_price = Set(price);
    }
    if let Some(total) = payload.total_tickets {
        active.total_tickets = Set(total);
    }
    if let Some(sold) = payload.sold_tickets {
        active.sold_tickets = Set(sold);
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(blank_to_none(image_url));
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    if let Some(capacity) = payload.capacity {
        active.capacity = Set(capacity);
    }
    if let Some(attendees) = payload.current_attendees {
        active.current_attendees = Set(attendees);
    }
    if let Some(billetto_url) = payload.billetto_url {
        active.billetto_url = Set(blank_to_none(billetto_url));
    }
    if let Some(venue_id) = payload.venue_id {
        active.venue_id = Set(venue_id);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    let detail = load_detail(&txn, model).await?;
    txn.commit().await?;

    Ok(Json(detail))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Events",
    operation_id = "deleteEvent",
    summary = "Delete an event",
    description = "Deletes the event together with its line-up entries and tickets. Gallery images keep their files and lose the event link. Requires `event:manage`.",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_event(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("event:manage")?;

    let result = event::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Event not found".into()));
    }

    tracing::info!(event_id = %id, "Event deleted");
    Ok(StatusCode::NO_CONTENT)
}
