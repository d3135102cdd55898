use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{role, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::shared::{Pagination, blank_to_none, escape_like, page_window};
use crate::models::user::*;
use crate::state::AppState;
use crate::utils::hash;

/// Find a user by ID or return 404.
pub(crate) async fn find_user<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

async fn ensure_role_exists<C: ConnectionTrait>(db: &C, name: &str) -> Result<(), AppError> {
    if role::Entity::find_by_id(name.to_string()).one(db).await?.is_none() {
        return Err(AppError::Validation(format!("Unknown role '{name}'")));
    }
    Ok(())
}

fn map_unique_email(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::EmailTaken,
        _ => AppError::from(e),
    }
}

fn hash_password(password: &str) -> Result<String, AppError> {
    hash::hash_password(password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Users",
    operation_id = "createUser",
    summary = "Create a user account",
    description = "Creates an account with the given role (default `member`). Requires `user:manage`.",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Email already registered (EMAIL_TAKEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(email = %payload.email))]
pub async fn create_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("user:manage")?;
    let email = validate_create_user(&payload)?;

    let role_name = payload
        .role
        .as_deref()
        .map(str::trim)
        .unwrap_or(role::DEFAULT_ROLE)
        .to_string();
    ensure_role_exists(&state.db, &role_name).await?;

    let password = hash_password(&payload.password)?;
    let now = chrono::Utc::now();

    let model = user::ActiveModel {
        id: Set(Uuid::now_v7()),
        first_name: Set(payload.first_name.trim().to_string()),
        last_name: Set(payload.last_name.trim().to_string()),
        email: Set(email),
        password: Set(password),
        phone_number: Set(blank_to_none(payload.phone_number)),
        address: Set(blank_to_none(payload.address)),
        image_url: Set(blank_to_none(payload.image_url)),
        role: Set(role_name),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(map_unique_email)?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Users",
    operation_id = "listUsers",
    summary = "List user accounts",
    description = "Paginated list, newest first. Requires `user:manage`.",
    params(UserListQuery),
    responses(
        (status = 200, description = "List of users", body = UserListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<UserListResponse>, AppError> {
    auth_user.require_permission("user:manage")?;

    let (page, per_page) = page_window(query.page, query.per_page);
    let mut select = user::Entity::find();

    if let Some(ref role) = query.role {
        select = select.filter(user::Column::Role.eq(role.trim()));
    }
    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            let pattern = format!("%{}%", term.to_lowercase());
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(user::Column::FirstName)))
                            .like(LikeExpr::new(&pattern).escape('\\')),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(user::Column::LastName)))
                            .like(LikeExpr::new(&pattern).escape('\\')),
                    )
                    .add(
                        Expr::col(user::Column::Email).like(LikeExpr::new(&pattern).escape('\\')),
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
        .order_by_desc(user::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(UserListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    operation_id = "getUser",
    summary = "Get a user by ID",
    description = "Users may read their own account; other accounts require `user:manage`.",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn get_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    if auth_user.user_id != id {
        auth_user.require_permission("user:manage")?;
    }
    let model = find_user(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Users",
    operation_id = "updateUser",
    summary = "Update a user",
    description = "Partially updates an account; only provided fields change. Users may edit their own profile; changing another account or any role requires `user:manage`.",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Email already registered (EMAIL_TAKEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    if auth_user.user_id != id || payload.role.is_some() {
        auth_user.require_permission("user:manage")?;
    }
    let email = validate_update_user(&payload)?;

    if payload == UpdateUserRequest::default() {
        let existing = find_user(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;

    let existing = find_user(&txn, id).await?;
    let mut active: user::ActiveModel = existing.into();

    if let Some(ref name) = payload.first_name {
        active.first_name = Set(name.trim().to_string());
    }
    if let Some(ref name) = payload.last_name {
        active.last_name = Set(name.trim().to_string());
    }
    if let Some(email) = email {
        active.email = Set(email);
    }
    if let Some(ref password) = payload.password {
        active.password = Set(hash_password(password)?);
    }
    if let Some(phone) = payload.phone_number {
        active.phone_number = Set(blank_to_none(phone));
    }
    if let Some(address) = payload.address {
        active.address = Set(blank_to_none(address));
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(blank_to_none(image_url));
    }
    if let Some(ref role_name) = payload.role {
        let role_name = role_name.trim();
        ensure_role_exists(&txn, role_name).await?;
        active.role = Set(role_name.to_string());
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await.map_err(map_unique_email)?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Users",
    operation_id = "deleteUser",
    summary = "Delete a user",
    description = "Deletes an account. Tickets held by the user are kept and unassigned. Requires `user:manage`; an account cannot delete itself.",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Cannot delete own account (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("user:manage")?;
    if auth_user.user_id == id {
        return Err(AppError::Conflict("Cannot delete your own account".into()));
    }

    let result = user::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("User not found".into()));
    }

    Ok(StatusCode::NO_CONTENT)
}
