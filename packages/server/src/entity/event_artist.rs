use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One artist's slot in an event line-up. `(event_id, artist_id)` is unique.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event_artist")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub event_id: Uuid,
    #[sea_orm(belongs_to, from = "event_id", to = "id", on_delete = "Cascade")]
    pub event: HasOne<super::event::Entity>,

    pub artist_id: Uuid,
    #[sea_orm(belongs_to, from = "artist_id", to = "id", on_delete = "Cascade")]
    pub artist: HasOne<super::artist::Entity>,

    pub performance_order: Option<i32>,
    /// `HH:MM`.
    pub performance_time: Option<String>,
    /// Minutes.
    pub set_duration: Option<i32>,
    /// Minor currency units.
    pub fee: Option<i64>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
