use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use common::EventStatus;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::{
    Pagination, double_option, validate_non_negative, validate_text, validate_url,
};
use super::venue::VenueResponse;
use crate::entity::event;
use crate::error::AppError;

static CLOCK_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid regex"));

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[schema(example = "Sommerjazz i Haven")]
    pub title: String,
    pub description: String,
    #[schema(example = "2026-07-04")]
    pub date: NaiveDate,
    /// `HH:MM`, 24-hour clock.
    #[schema(example = "19:30")]
    pub start_time: String,
    pub end_time: Option<String>,
    /// Minor currency units.
    #[serde(default)]
    #[schema(example = 15000)]
    pub ticket_price: i64,
    #[serde(default)]
    pub total_tickets: i32,
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub status: EventStatus,
    pub capacity: Option<i32>,
    pub billetto_url: Option<String>,
    pub venue_id: Option<Uuid>,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub end_time: Option<Option<String>>,
    pub ticket_price: Option<i64>,
    pub total_tickets: Option<i32>,
    pub sold_tickets: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub image_url: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub status: Option<EventStatus>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub capacity: Option<Option<i32>>,
    pub current_attendees: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub billetto_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub venue_id: Option<Option<Uuid>>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: Option<String>,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<event::Model> for EventResponse {
    fn from(m: event::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            date: m.date,
            start_time: m.start_time,
            end_time: m.end_time,
            ticket_price: m.ticket_price,
            total_tickets: m.total_tickets,
            sold_tickets: m.sold_tickets,
            image_url: m.image_url,
            is_active: m.is_active,
            status: m.status,
            capacity: m.capacity,
            current_attendees: m.current_attendees,
            billetto_url: m.billetto_url,
            venue_id: m.venue_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Artist fields shown in an event's line-up.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineupArtist {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub image_url: Option<String>,
    pub genre: Option<String>,
}

impl From<crate::entity::artist::Model> for LineupArtist {
    fn from(m: crate::entity::artist::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            slug: m.slug,
            image_url: m.image_url,
            genre: m.genre,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineupEntry {
    /// Line-up entry id.
    pub id: Uuid,
    pub performance_order: Option<i32>,
    pub performance_time: Option<String>,
    pub set_duration: Option<i32>,
    pub artist: LineupArtist,
}

/// An event with its venue and line-up, ordered by performance order.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventDetailResponse {
    #[serde(flatten)]
    pub event: EventResponse,
    pub venue: Option<VenueResponse>,
    pub lineup: Vec<LineupEntry>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct EventListResponse {
    pub data: Vec<EventResponse>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EventListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub venue_id: Option<Uuid>,
    /// Events featuring this artist.
    pub artist_id: Option<Uuid>,
    /// Inclusive lower bound on `date`.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on `date`.
    pub to: Option<NaiveDate>,
    /// Only events dated today or later.
    pub upcoming: Option<bool>,
    pub status: Option<EventStatus>,
    /// Case-insensitive match on title.
    pub search: Option<String>,
}

pub(crate) fn validate_clock(field: &str, value: &str) -> Result<(), AppError> {
    if !CLOCK_TIME.is_match(value) {
        return Err(AppError::Validation(format!("{field} must be HH:MM")));
    }
    Ok(())
}

fn validate_counts(total: i32, sold: i32) -> Result<(), AppError> {
    if total < 0 {
        return Err(AppError::Validation("totalTickets must be >= 0".into()));
    }
    if sold < 0 || sold > total {
        return Err(AppError::Validation(
            "soldTickets must be between 0 and totalTickets".into(),
        ));
    }
    Ok(())
}

pub fn validate_create_event(req: &CreateEventRequest) -> Result<(), AppError> {
    validate_text("Title", &req.title, 200)?;
    validate_text("Description", &req.description, 20_000)?;
    validate_clock("startTime", &req.start_time)?;
    if let Some(ref end) = req.end_time {
        validate_clock("endTime", end)?;
    }
    validate_non_negative("ticketPrice", req.ticket_price)?;
    validate_counts(req.total_tickets, 0)?;
    if let Some(capacity) = req.capacity {
        validate_non_negative("capacity", capacity.into())?;
    }
    if let Some(ref url) = req.billetto_url {
        validate_url("billettoUrl", url)?;
    }
    Ok(())
}

/// Checks against the stored row so ticket counts stay consistent.
pub fn validate_update_event(
    req: &UpdateEventRequest,
    existing: &event::Model,
) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_text("Title", title, 200)?;
    }
    if let Some(ref description) = req.description {
        validate_text("Description", description, 20_000)?;
    }
    if let Some(ref start) = req.start_time {
        validate_clock("startTime", start)?;
    }
    if let Some(Some(ref end)) = req.end_time {
        validate_clock("endTime", end)?;
    }
    if let Some(price) = req.ticket_price {
        validate_non_negative("ticketPrice", price)?;
    }
    validate_counts(
        req.total_tickets.unwrap_or(existing.total_tickets),
        req.sold_tickets.unwrap_or(existing.sold_tickets),
    )?;
    if let Some(Some(capacity)) = req.capacity {
        validate_non_negative("capacity", capacity.into())?;
    }
    if let Some(attendees) = req.current_attendees {
        validate_non_negative("currentAttendees", attendees.into())?;
    }
    if let Some(Some(ref url)) = req.billetto_url {
        validate_url("billettoUrl", url)?;
    }
    Ok(())
}
