use chrono::{DateTime, NaiveDate, Utc};
use common::{MessageStatus, MessageType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::{Pagination, double_option, validate_optional_text};
use crate::entity::contact_message;
use crate::error::AppError;

/// Public contact-form body. Extra fields apply to booking inquiries.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    #[serde(default)]
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[serde(default)]
    #[schema(example = "We would love to book you for our summer party.")]
    pub message: String,
    pub subject: Option<String>,
    pub phone: Option<String>,
    #[serde(default, rename = "type")]
    pub message_type: MessageType,
    pub event_date: Option<NaiveDate>,
    pub artist_type: Option<String>,
    pub event_details: Option<String>,
    pub budget: Option<String>,
}

pub fn validate_contact_extras(req: &ContactRequest) -> Result<(), AppError> {
    validate_optional_text("Phone", req.phone.as_deref(), 50)?;
    validate_optional_text("Artist type", req.artist_type.as_deref(), 100)?;
    validate_optional_text("Event details", req.event_details.as_deref(), 5000)?;
    validate_optional_text("Budget", req.budget.as_deref(), 100)?;
    Ok(())
}

/// Returned to the public submitter.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactAccepted {
    pub id: Uuid,
    #[schema(example = "Message sent successfully")]
    pub message: String,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactRequest {
    pub status: Option<MessageStatus>,
    pub is_read: Option<bool>,
    #[serde(rename = "type")]
    pub message_type: Option<MessageType>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub admin_notes: Option<Option<String>>,
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub admin_notes: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessageResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub subject: Option<String>,
    pub phone: Option<String>,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub status: MessageStatus,
    pub is_read: bool,
    pub event_date: Option<NaiveDate>,
    pub artist_type: Option<String>,
    pub event_details: Option<String>,
    pub budget: Option<String>,
    pub admin_notes: Option<String>,
    pub replied_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<contact_message::Model> for ContactMessageResponse {
    fn from(m: contact_message::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            message: m.message,
            subject: m.subject,
            phone: m.phone,
            message_type: m.message_type,
            status: m.status,
            is_read: m.is_read,
            event_date: m.event_date,
            artist_type: m.artist_type,
            event_details: m.event_details,
            budget: m.budget,
            admin_notes: m.admin_notes,
            replied_at: m.replied_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ContactListResponse {
    pub data: Vec<ContactMessageResponse>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ContactListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub status: Option<MessageStatus>,
    #[serde(rename = "type")]
    pub message_type: Option<MessageType>,
    pub is_read: Option<bool>,
}

pub fn validate_update_contact(req: &UpdateContactRequest) -> Result<(), AppError> {
    if let Some(Some(ref notes)) = req.admin_notes {
        validate_optional_text("Admin notes", Some(notes), 10_000)?;
    }
    Ok(())
}
