use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated user extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication.
/// Permission checks happen via `require_permission()` in the handler body.
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
    pub permissions: Vec<String>,
}

impl AuthUser {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// Returns `Ok(())` if the user has the given permission, `Err(PermissionDenied)` otherwise.
    pub fn require_permission(&self, permission: &str) -> Result<(), AppError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(header) = parts.headers.get("Authorization") else {
        return Ok(None);
    };
    let value = header.to_str().map_err(|_| AppError::TokenInvalid)?;
    value
        .strip_prefix("Bearer ")
        .map(Some)
        .ok_or(AppError::TokenInvalid)
}

fn decode(token: &str, state: &AppState) -> Result<AuthUser, AppError> {
    let claims =
        jwt::verify(token, &state.config.auth.jwt_secret).map_err(|_| AppError::TokenInvalid)?;

    Ok(AuthUser {
        user_id: claims.uid,
        email: claims.sub,
        role: claims.role,
        permissions: claims.permissions,
    })
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        let token = bearer_token(parts)?.ok_or(AppError::TokenMissing)?;
        decode(token, &app)
    }
}

/// Like [`AuthUser`], but anonymous requests pass through as `None`.
///
/// A header that is present but invalid is still rejected.
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.0.as_ref().is_some_and(|u| u.has_permission(permission))
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        match bearer_token(parts)? {
            Some(token) => Ok(MaybeAuthUser(Some(decode(token, &app)?))),
            None => Ok(MaybeAuthUser(None)),
        }
    }
}
