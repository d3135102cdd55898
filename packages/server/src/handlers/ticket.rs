use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use sea_orm::sea_query::LockType;
use tracing::instrument;
use uuid::Uuid;

use super::event::find_event;
use super::user::find_user;
use crate::entity::ticket;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::shared::{Pagination, page_window};
use crate::models::ticket::*;
use crate::state::AppState;

/// Attempts at drawing an unused ticket number before giving up.
const TICKET_NUMBER_ATTEMPTS: usize = 5;

async fn find_ticket<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<ticket::Model, AppError> {
    ticket::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".into()))
}

async fn unused_ticket_number<C: ConnectionTrait>(db: &C) -> Result<String, AppError> {
    for _ in 0..TICKET_NUMBER_ATTEMPTS {
        let candidate = generate_ticket_number();
        let taken = ticket::Entity::find()
            .filter(ticket::Column::TicketNumber.eq(&candidate))
            .count(db)
            .await?;
        if taken == 0 {
            return Ok(candidate);
        }
    }
    Err(AppError::Internal(
        "could not allocate a unique ticket number".into(),
    ))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Tickets",
    operation_id = "createTicket",
    summary = "Issue a ticket",
    description = "The ticket number is generated by the server. Price defaults to the event's ticket price. Requires `ticket:manage`.",
    request_body = CreateTicketRequest,
    responses(
        (status = 201, description = "Ticket created", body = TicketResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Event or user not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(event_id = %payload.event_id))]
pub async fn create_ticket(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateTicketRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("ticket:manage")?;
    validate_create_ticket(&payload)?;

    let event = find_event(&state.db, payload.event_id).await?;
    if let Some(user_id) = payload.user_id {
        find_user(&state.db, user_id).await?;
    }

    let ticket_number = unused_ticket_number(&state.db).await?;
    let now = chrono::Utc::now();
    let model = ticket::ActiveModel {
        id: Set(Uuid::now_v7()),
        event_id: Set(event.id),
        user_id: Set(payload.user_id),
        ticket_number: Set(ticket_number),
        price: Set(payload.price.unwrap_or(event.ticket_price)),
        is_used: Set(false),
        used_at: Set(None),
        is_active: Set(true),
        quantity: Set(payload.quantity),
        sold: Set(0),
        sale_start_date: Set(payload.sale_start_date),
        sale_end_date: Set(payload.sale_end_date),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(ticket_number = %model.ticket_number, "Ticket issued");
    Ok((StatusCode::CREATED, Json(TicketResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Tickets",
    operation_id = "listTickets",
    summary = "List tickets",
    description = "Paginated, newest first. Requires `ticket:manage`.",
    params(TicketListQuery),
    responses(
        (status = 200, description = "List of tickets", body = TicketListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_tickets(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<TicketListQuery>,
) -> Result<Json<TicketListResponse>, AppError> {
    auth_user.require_permission("ticket:manage")?;

    let (page, per_page) = page_window(query.page, query.per_page);
    let mut select = ticket::Entity::find();

    if let Some(event_id) = query.event_id {
        select = select.filter(ticket::Column::EventId.eq(event_id));
    }
    if let Some(user_id) = query.user_id {
        select = select.filter(ticket::Column::UserId.eq(user_id));
    }
    if query.unused == Some(true) {
        select = select.filter(ticket::Column::IsUsed.eq(false));
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let data = select
        .order_by_desc(ticket::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(TicketResponse::from)
        .collect();

    Ok(Json(TicketListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Tickets",
    operation_id = "getTicket",
    summary = "Get a ticket by ID",
    description = "Requires `ticket:manage`.",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket", body = TicketResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Ticket not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn get_ticket(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TicketResponse>, AppError> {
    auth_user.require_permission("ticket:manage")?;
    Ok(Json(find_ticket(&state.db, id).await?.into()))
}

#[utoipa::path(
    get,
    path = "/number/{ticket_number}",
    tag = "Tickets",
    operation_id = "getTicketByNumber",
    summary = "Look up a ticket by its number",
    description = "Requires `ticket:manage`.",
    params(("ticket_number" = String, Path, description = "Ticket number, e.g. `TKT-1718000000000-K7Q2XZ`")),
    responses(
        (status = 200, description = "Ticket", body = TicketResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Ticket not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(ticket_number = %ticket_number))]
pub async fn get_ticket_by_number(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(ticket_number): Path<String>,
) -> Result<Json<TicketResponse>, AppError> {
    auth_user.require_permission("ticket:manage")?;

    let model = ticket::Entity::find()
        .filter(ticket::Column::TicketNumber.eq(ticket_number.trim().to_uppercase()))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".into()))?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Tickets",
    operation_id = "updateTicket",
    summary = "Update a ticket",
    description = "Partially updates a ticket. `sold` may not exceed `quantity`. Requires `ticket:manage`.",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    request_body = UpdateTicketRequest,
    responses(
        (status = 200, description = "Ticket updated", body = TicketResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Ticket not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_ticket(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateTicketRequest>,
) -> Result<Json<TicketResponse>, AppError> {
    auth_user.require_permission("ticket:manage")?;

    if payload == UpdateTicketRequest::default() {
        return Ok(Json(find_ticket(&state.db, id).await?.into()));
    }

    let txn = state.db.begin().await?;

    let existing = ticket::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".into()))?;
    validate_update_ticket(&payload, &existing)?;

    if let Some(Some(user_id)) = payload.user_id {
        find_user(&txn, user_id).await?;
    }

    let mut active: ticket::ActiveModel = existing.into();
    if let Some(user_id) = payload.user_id {
        active.user_id = Set(user_id);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(quantity) = payload.quantity {
        active.quantity = Set(quantity);
    }
    if let Some(sold) = payload.sold {
        active.sold = Set(sold);
    }
    if let Some(start) = payload.sale_start_date {
        active.sale_start_date = Set(start);
    }
    if let Some(end) = payload.sale_end_date {
        active.sale_end_date = Set(end);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/redeem",
    tag = "Tickets",
    operation_id = "redeemTicket",
    summary = "Redeem a ticket at the door",
    description = "Marks an active, unused ticket as used. Requires `ticket:manage`.",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket redeemed", body = TicketResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Ticket not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Ticket already used or inactive (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn redeem_ticket(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TicketResponse>, AppError> {
    auth_user.require_permission("ticket:manage")?;

    let txn = state.db.begin().await?;

    let existing = ticket::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".into()))?;

    if existing.is_used {
        return Err(AppError::Conflict("Ticket has already been used".into()));
    }
    if !existing.is_active {
        return Err(AppError::Conflict("Ticket is not active".into()));
    }

    let now = chrono::Utc::now();
    let mut active: ticket::ActiveModel = existing.into();
    active.is_used = Set(true);
    active.used_at = Set(Some(now));
    active.updated_at = Set(now);

    let model = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(ticket_number = %model.ticket_number, "Ticket redeemed");
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Tickets",
    operation_id = "deleteTicket",
    summary = "Delete a ticket",
    description = "Requires `ticket:manage`.",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    responses(
        (status = 204, description = "Ticket deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Ticket not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_ticket(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("ticket:manage")?;

    let result = ticket::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Ticket not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
