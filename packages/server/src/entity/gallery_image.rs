use common::GalleryCategory;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gallery_image")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub filename: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub medium_url: Option<String>,
    pub large_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub caption: Option<String>,

    pub event_id: Option<Uuid>,
    #[sea_orm(belongs_to, from = "event_id", to = "id", on_delete = "SetNull")]
    pub event: Option<super::event::Entity>,

    pub photographer: Option<String>,
    /// Array of strings.
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: serde_json::Value,
    pub category: GalleryCategory,
    pub order_index: i32,
    pub is_published: bool,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
