use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "artist")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub website: Option<String>,
    /// Free-form map of network name to profile URL.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub social_media: Option<serde_json::Value>,
    pub genre: Option<String>,
    pub is_bookable: bool,

    /// Account that handles booking requests for this artist.
    pub booking_user_id: Option<Uuid>,
    #[sea_orm(belongs_to, from = "booking_user_id", to = "id")]
    pub booking_user: Option<super::user::Entity>,

    /// Array of `common::embed::Embedding`. Always sanitized before storage.
    #[sea_orm(column_type = "JsonBinary")]
    pub embeddings: serde_json::Value,

    #[sea_orm(has_many)]
    pub lineup: HasMany<super::event_artist::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
