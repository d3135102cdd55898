use common::EventStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub date: Date,
    /// `HH:MM`, local to the venue.
    pub start_time: String,
    pub end_time: Option<String>,
    /// Minor currency units.
    pub ticket_price: i64,
    pub total_tickets: i32,
    pub sold_tickets: i32,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub status: EventStatus,
    pub capacity: Option<i32>,
    pub current_attendees: i32,
    pub billetto_url: Option<String>,

    pub venue_id: Option<Uuid>,
    #[sea_orm(belongs_to, from = "venue_id", to = "id")]
    pub venue: Option<super::venue::Entity>,

    #[sea_orm(has_many)]
    pub lineup: HasMany<super::event_artist::Entity>,

    #[sea_orm(has_many)]
    pub tickets: HasMany<super::ticket::Entity>,

    #[sea_orm(has_many)]
    pub gallery_images: HasMany<super::gallery_image::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
