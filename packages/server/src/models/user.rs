use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::{
    Pagination, double_option, normalize_email, validate_optional_text, validate_text,
};
use crate::error::AppError;

pub const PASSWORD_MIN: usize = 8;
pub const PASSWORD_MAX: usize = 128;

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[schema(example = "Mette")]
    pub first_name: String,
    #[schema(example = "Hansen")]
    pub last_name: String,
    #[schema(example = "mette@stagehand.dk")]
    pub email: String,
    /// Plain-text password (8-128 characters). Stored as an Argon2 hash.
    pub password: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub image_url: Option<String>,
    /// Role name. Defaults to `member`.
    #[schema(example = "editor")]
    pub role: Option<String>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub phone_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub image_url: Option<Option<String>>,
    pub role: Option<String>,
}

/// A user account. The password hash is never included.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub image_url: Option<String>,
    #[schema(example = "member")]
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::user::Model> for UserResponse {
    fn from(m: crate::entity::user::Model) -> Self {
        Self {
            id: m.id,
            first_name: m.first_name,
            last_name: m.last_name,
            email: m.email,
            phone_number: m.phone_number,
            address: m.address,
            image_url: m.image_url,
            role: m.role,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserListResponse {
    pub data: Vec<UserResponse>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Case-insensitive match on name or email.
    pub search: Option<String>,
    pub role: Option<String>,
}

fn validate_password(password: &str) -> Result<(), AppError> {
    let len = password.chars().count();
    if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&len) {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}

/// Returns the normalized email.
pub fn validate_create_user(req: &CreateUserRequest) -> Result<String, AppError> {
    validate_text("First name", &req.first_name, 100)?;
    validate_text("Last name", &req.last_name, 100)?;
    let email = normalize_email(&req.email)?;
    validate_password(&req.password)?;
    validate_optional_text("Phone number", req.phone_number.as_deref(), 50)?;
    validate_optional_text("Address", req.address.as_deref(), 500)?;
    Ok(email)
}

/// Returns the normalized email when one was supplied.
pub fn validate_update_user(req: &UpdateUserRequest) -> Result<Option<String>, AppError> {
    if let Some(ref name) = req.first_name {
        validate_text("First name", name, 100)?;
    }
    if let Some(ref name) = req.last_name {
        validate_text("Last name", name, 100)?;
    }
    if let Some(ref password) = req.password {
        validate_password(password)?;
    }
    if let Some(Some(ref phone)) = req.phone_number {
        validate_optional_text("Phone number", Some(phone), 50)?;
    }
    if let Some(Some(ref address)) = req.address {
        validate_optional_text("Address", Some(address), 500)?;
    }
    req.email.as_deref().map(normalize_email).transpose()
}
