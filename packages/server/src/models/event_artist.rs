use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::event::validate_clock;
use super::shared::{Pagination, double_option, validate_non_negative};
use crate::entity::event_artist;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventArtistRequest {
    pub event_id: Uuid,
    pub artist_id: Uuid,
    pub performance_order: Option<i32>,
    #[schema(example = "21:00")]
    pub performance_time: Option<String>,
    /// Minutes.
    pub set_duration: Option<i32>,
    /// Minor currency units.
    pub fee: Option<i64>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventArtistRequest {
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub performance_order: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub performance_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub set_duration: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub fee: Option<Option<i64>>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventArtistResponse {
    pub id: Uuid,
    pub event_id: Uuid,
    pub artist_id: Uuid,
    pub performance_order: Option<i32>,
    pub performance_time: Option<String>,
    pub set_duration: Option<i32>,
    pub fee: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<event_artist::Model> for EventArtistResponse {
    fn from(m: event_artist::Model) -> Self {
        Self {
            id: m.id,
            event_id: m.event_id,
            artist_id: m.artist_id,
            performance_order: m.performance_order,
            performance_time: m.performance_time,
            set_duration: m.set_duration,
            fee: m.fee,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct EventArtistListResponse {
    pub data: Vec<EventArtistResponse>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EventArtistListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub event_id: Option<Uuid>,
    pub artist_id: Option<Uuid>,
}

fn validate_slot(
    order: Option<i32>,
    duration: Option<i32>,
    fee: Option<i64>,
) -> Result<(), AppError> {
    if let Some(order) = order {
        validate_non_negative("performanceOrder", order.into())?;
    }
    if let Some(duration) = duration
        && duration <= 0
    {
        return Err(AppError::Validation("setDuration must be > 0".into()));
    }
    if let Some(fee) = fee {
        validate_non_negative("fee", fee)?;
    }
    Ok(())
}

pub fn validate_create_event_artist(req: &CreateEventArtistRequest) -> Result<(), AppError> {
    if let Some(ref time) = req.performance_time {
        validate_clock("performanceTime", time)?;
    }
    validate_slot(req.performance_order, req.set_duration, req.fee)
}

pub fn validate_update_event_artist(req: &UpdateEventArtistRequest) -> Result<(), AppError> {
    if let Some(Some(ref time)) = req.performance_time {
        validate_clock("performanceTime", time)?;
    }
    validate_slot(
        req.performance_order.flatten(),
        req.set_duration.flatten(),
        req.fee.flatten(),
    )
}
