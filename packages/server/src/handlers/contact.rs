use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::MessageStatus;
use common::contact::ContactSubmission;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::contact_message;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::client_ip::ClientIp;
use crate::extractors::json::AppJson;
use crate::models::contact::*;
use crate::models::shared::{Pagination, blank_to_none, page_window, validate_optional_text};
use crate::state::AppState;
use crate::utils::abuse_guard::{check_duplicate, check_volume, flag_spam, lock_email};

async fn find_message<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<contact_message::Model, AppError> {
    contact_message::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Message not found".into()))
}

/// Apply a status-changing admin action and save the row.
async fn transition<F>(
    state: &AppState,
    id: Uuid,
    apply: F,
) -> Result<contact_message::Model, AppError>
where
    F: FnOnce(&contact_message::Model, &mut contact_message::ActiveModel),
{
    let existing = find_message(&state.db, id).await?;
    let mut active: contact_message::ActiveModel = existing.clone().into();
    apply(&existing, &mut active);
    active.updated_at = Set(chrono::Utc::now());
    Ok(active.update(&state.db).await?)
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Contact",
    operation_id = "submitContact",
    summary = "Submit the public contact form",
    description = "Checks run in order: per-IP rate limit, field validation, duplicate suppression, per-email volume cap. \
        Spam heuristics are logged but never block. 429 responses carry a `Retry-After` header.",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Message stored", body = ContactAccepted),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 429, description = "Rejected (RATE_LIMITED, DUPLICATE_SUBMISSION)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(ip = %ip))]
pub async fn submit_contact(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    AppJson(payload): AppJson<ContactRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(retry_after) = state.contact_limiter.check(&ip) {
        tracing::warn!(retry_after, "Contact form rate limit exceeded");
        return Err(AppError::RateLimited {
            message: "Too many submissions from this address. Please try again later.".into(),
            retry_after,
        });
    }

    let submission = ContactSubmission::normalize(
        &payload.name,
        &payload.email,
        &payload.message,
        payload.subject.as_deref(),
    )?;
    validate_contact_extras(&payload)?;

    let limits = &state.config.contact;
    let txn = state.db.begin().await?;
    lock_email(&txn, &submission.email).await?;

    check_duplicate(&txn, &submission, limits.window_minutes).await?;
    check_volume(
        &txn,
        &submission.email,
        limits.window_minutes,
        limits.max_per_window,
    )
    .await?;
    flag_spam(&submission);

    let now = chrono::Utc::now();
    let model = contact_message::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(submission.name),
        email: Set(submission.email),
        message: Set(submission.message),
        subject: Set(submission.subject),
        phone: Set(blank_to_none(payload.phone)),
        message_type: Set(payload.message_type),
        status: Set(MessageStatus::Pending),
        is_read: Set(false),
        event_date: Set(payload.event_date),
        artist_type: Set(blank_to_none(payload.artist_type)),
        event_details: Set(blank_to_none(payload.event_details)),
        budget: Set(blank_to_none(payload.budget)),
        admin_notes: Set(None),
        replied_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(message_id = %model.id, kind = %model.message_type, "Contact message stored");
    Ok((
        StatusCode::CREATED,
        Json(ContactAccepted {
            id: model.id,
            message: "Message sent successfully".into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Contact",
    operation_id = "listContactMessages",
    summary = "List contact messages",
    description = "Paginated, newest first. Requires `contact:manage`.",
    params(ContactListQuery),
    responses(
        (status = 200, description = "List of messages", body = ContactListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_messages(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ContactListQuery>,
) -> Result<Json<ContactListResponse>, AppError> {
    auth_user.require_permission("contact:manage")?;

    let (page, per_page) = page_window(query.page, query.per_page);
    let mut select = contact_message::Entity::find();

    if let Some(status) = query.status {
        select = select.filter(contact_message::Column::Status.eq(status));
    }
    if let Some(message_type) = query.message_type {
        select = select.filter(contact_message::Column::MessageType.eq(message_type));
    }
    if let Some(is_read) = query.is_read {
        select = select.filter(contact_message::Column::IsRead.eq(is_read));
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let data = select
        .order_by_desc(contact_message::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(ContactMessageResponse::from)
        .collect();

    Ok(Json(ContactListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Contact",
    operation_id = "getContactMessage",
    summary = "Get a contact message",
    description = "Requires `contact:manage`. Reading does not mark the message read; use `/read`.",
    params(("id" = Uuid, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Message", body = ContactMessageResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Message not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn get_message(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContactMessageResponse>, AppError> {
    auth_user.require_permission("contact:manage")?;
    Ok(Json(find_message(&state.db, id).await?.into()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Contact",
    operation_id = "updateContactMessage",
    summary = "Update a contact message",
    description = "Partially updates triage fields. Requires `contact:manage`.",
    params(("id" = Uuid, Path, description = "Message ID")),
    request_body = UpdateContactRequest,
    responses(
        (status = 200, description = "Message updated", body = ContactMessageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Message not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_message(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateContactRequest>,
) -> Result<Json<ContactMessageResponse>, AppError> {
    auth_user.require_permission("contact:manage")?;
    validate_update_contact(&payload)?;

    if payload == UpdateContactRequest::default() {
        return Ok(Json(find_message(&state.db, id).await?.into()));
    }

    let model = transition(&state, id, |_, active| {
        if let Some(status) = payload.status {
            active.status = Set(status);
        }
        if let Some(is_read) = payload.is_read {
            active.is_read = Set(is_read);
        }
        if let Some(message_type) = payload.message_type {
            active.message_type = Set(message_type);
        }
        if let Some(notes) = payload.admin_notes {
            active.admin_notes = Set(blank_to_none(notes));
        }
    })
    .await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/read",
    tag = "Contact",
    operation_id = "markContactMessageRead",
    summary = "Mark a contact message read",
    description = "Sets `isRead`; a pending message moves to `read`. Requires `contact:manage`.",
    params(("id" = Uuid, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Message updated", body = ContactMessageResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Message not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn mark_read(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContactMessageResponse>, AppError> {
    auth_user.require_permission("contact:manage")?;

    let model = transition(&state, id, |existing, active| {
        active.is_read = Set(true);
        active.status = Set(existing.status.after_read());
    })
    .await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/reply",
    tag = "Contact",
    operation_id = "markContactMessageReplied",
    summary = "Record a reply to a contact message",
    description = "Marks the message replied and stamps `repliedAt`. The reply itself is sent outside this service. Requires `contact:manage`.",
    params(("id" = Uuid, Path, description = "Message ID")),
    request_body = ReplyRequest,
    responses(
        (status = 200, description = "Message updated", body = ContactMessageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Message not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn mark_replied(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<ReplyRequest>,
) -> Result<Json<ContactMessageResponse>, AppError> {
    auth_user.require_permission("contact:manage")?;
    validate_optional_text("Admin notes", payload.admin_notes.as_deref(), 10_000)?;

    let model = transition(&state, id, |_, active| {
        active.status = Set(MessageStatus::Replied);
        active.is_read = Set(true);
        active.replied_at = Set(Some(chrono::Utc::now()));
        if let Some(notes) = blank_to_none(payload.admin_notes) {
            active.admin_notes = Set(Some(notes));
        }
    })
    .await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/archive",
    tag = "Contact",
    operation_id = "archiveContactMessage",
    summary = "Archive a contact message",
    description = "Requires `contact:manage`.",
    params(("id" = Uuid, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Message archived", body = ContactMessageResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Message not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn archive_message(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContactMessageResponse>, AppError> {
    auth_user.require_permission("contact:manage")?;

    let model = transition(&state, id, |_, active| {
        active.status = Set(MessageStatus::Archived);
    })
    .await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Contact",
    operation_id = "deleteContactMessage",
    summary = "Delete a contact message",
    description = "Requires `contact:manage`.",
    params(("id" = Uuid, Path, description = "Message ID")),
    responses(
        (status = 204, description = "Message deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Message not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_message(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("contact:manage")?;

    let result = contact_message::Entity::delete_by_id(id)
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Message not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
