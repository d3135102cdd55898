use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "venue")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub address: String,
    pub city: Option<String>,
    pub image_url: Option<String>,
    /// Array of image URLs.
    #[sea_orm(column_type = "JsonBinary")]
    pub images: serde_json::Value,
    /// Sanitized map iframe.
    #[sea_orm(column_type = "Text", nullable)]
    pub map_embed_html: Option<String>,

    #[sea_orm(has_many)]
    pub events: HasMany<super::event::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
