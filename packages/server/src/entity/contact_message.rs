use common::{MessageStatus, MessageType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contact_message")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,
    /// Trimmed and lowercased.
    pub email: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub subject: Option<String>,
    pub phone: Option<String>,
    #[sea_orm(column_name = "type")]
    pub message_type: MessageType,
    pub status: MessageStatus,
    pub is_read: bool,

    // Booking inquiry details.
    pub event_date: Option<Date>,
    pub artist_type: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub event_details: Option<String>,
    pub budget: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub admin_notes: Option<String>,
    pub replied_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
