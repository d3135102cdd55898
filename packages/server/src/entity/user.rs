use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub first_name: String,
    pub last_name: String,
    /// Stored lowercased.
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2 PHC string.
    pub password: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub image_url: Option<String>,

    pub role: String,
    #[sea_orm(belongs_to, from = "role", to = "name")]
    pub role_ref: HasOne<super::role::Entity>,

    #[sea_orm(has_many)]
    pub tickets: HasMany<super::ticket::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
