use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::{Pagination, double_option, validate_non_negative};
use crate::entity::ticket;
use crate::error::AppError;

const TICKET_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// `TKT-<unix millis>-<6 chars>`. Ambiguous characters (0/O, 1/I) are excluded.
pub fn generate_ticket_number() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..6)
        .map(|_| TICKET_ALPHABET[rng.random_range(0..TICKET_ALPHABET.len())] as char)
        .collect();
    format!("TKT-{}-{}", Utc::now().timestamp_millis(), suffix)
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    pub event_id: Uuid,
    pub user_id: Option<Uuid>,
    /// Minor currency units. Defaults to the event's ticket price.
    pub price: Option<i64>,
    pub quantity: Option<i32>,
    pub sale_start_date: Option<DateTime<Utc>>,
    pub sale_end_date: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketRequest {
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub user_id: Option<Option<Uuid>>,
    pub price: Option<i64>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub quantity: Option<Option<i32>>,
    pub sold: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub sale_start_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub sale_end_date: Option<Option<DateTime<Utc>>>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Option<Uuid>,
    #[schema(example = "TKT-1718000000000-K7Q2XZ")]
    pub ticket_number: String,
    pub price: i64,
    pub is_used: bool,
    pub used_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub quantity: Option<i32>,
    pub sold: i32,
    pub sale_start_date: Option<DateTime<Utc>>,
    pub sale_end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ticket::Model> for TicketResponse {
    fn from(m: ticket::Model) -> Self {
        Self {
            id: m.id,
            event_id: m.event_id,
            user_id: m.user_id,
            ticket_number: m.ticket_number,
            price: m.price,
            is_used: m.is_used,
            used_at: m.used_at,
            is_active: m.is_active,
            quantity: m.quantity,
            sold: m.sold,
            sale_start_date: m.sale_start_date,
            sale_end_date: m.sale_end_date,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TicketListResponse {
    pub data: Vec<TicketResponse>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TicketListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub event_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    /// Only tickets not yet redeemed.
    pub unused: Option<bool>,
}

fn validate_sale_window(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<(), AppError> {
    if let (Some(start), Some(end)) = (start, end)
        && end <= start
    {
        return Err(AppError::Validation(
            "saleEndDate must be after saleStartDate".into(),
        ));
    }
    Ok(())
}

pub fn validate_create_ticket(req: &CreateTicketRequest) -> Result<(), AppError> {
    if let Some(price) = req.price {
        validate_non_negative("price", price)?;
    }
    if let Some(quantity) = req.quantity {
        validate_non_negative("quantity", quantity.into())?;
    }
    validate_sale_window(req.sale_start_date, req.sale_end_date)
}

pub fn validate_update_ticket(
    req: &UpdateTicketRequest,
    existing: &ticket::Model,
) -> Result<(), AppError> {
    if let Some(price) = req.price {
        validate_non_negative("price", price)?;
    }
    if let Some(Some(quantity)) = req.quantity {
        validate_non_negative("quantity", quantity.into())?;
    }
    if let Some(sold) = req.sold {
        validate_non_negative("sold", sold.into())?;
    }
    let quantity = req.quantity.unwrap_or(existing.quantity);
    let sold = req.sold.unwrap_or(existing.sold);
    if let Some(quantity) = quantity
        && sold > quantity
    {
        return Err(AppError::Validation("sold must not exceed quantity".into()));
    }
    validate_sale_window(
        req.sale_start_date.unwrap_or(existing.sale_start_date),
        req.sale_end_date.unwrap_or(existing.sale_end_date),
    )
}
