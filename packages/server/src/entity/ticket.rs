use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ticket")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub event_id: Uuid,
    #[sea_orm(belongs_to, from = "event_id", to = "id", on_delete = "Cascade")]
    pub event: HasOne<super::event::Entity>,

    pub user_id: Option<Uuid>,
    #[sea_orm(belongs_to, from = "user_id", to = "id", on_delete = "SetNull")]
    pub user: Option<super::user::Entity>,

    #[sea_orm(unique)]
    pub ticket_number: String,
    /// Minor currency units.
    pub price: i64,
    pub is_used: bool,
    pub used_at: Option<DateTimeUtc>,
    pub is_active: bool,
    /// Allocation size for batch tickets; `None` for single admission.
    pub quantity: Option<i32>,
    pub sold: i32,
    pub sale_start_date: Option<DateTimeUtc>,
    pub sale_end_date: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
