#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a contact message is about.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "general"))]
    General,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "booking"))]
    Booking,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "support"))]
    Support,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "feedback"))]
    Feedback,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Booking => "booking",
            Self::Support => "support",
            Self::Feedback => "feedback",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a contact message is in the admin inbox workflow.
///
/// `Pending` → `Read` → `Replied`; any state may move to `Archived`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    #[default]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "pending"))]
    Pending,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "read"))]
    Read,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "replied"))]
    Replied,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "archived"))]
    Archived,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Read => "read",
            Self::Replied => "replied",
            Self::Archived => "archived",
        }
    }

    /// Status after an admin opens the message. Only pending messages advance.
    pub fn after_read(self) -> Self {
        match self {
            Self::Pending => Self::Read,
            other => other,
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
