use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::{Pagination, double_option, validate_optional_text, validate_text};
use crate::entity::venue;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVenueRequest {
    #[schema(example = "Pumpehuset")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "Studiestræde 52, 1554 København")]
    pub address: String,
    #[schema(example = "København")]
    pub city: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    /// Map iframe markup. Sanitized before storage.
    pub map_embed_html: Option<String>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVenueRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub address: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub image_url: Option<Option<String>>,
    pub images: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub map_embed_html: Option<Option<String>>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VenueResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub city: Option<String>,
    pub image_url: Option<String>,
    pub images: Vec<String>,
    pub map_embed_html: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}


impl From<venue::Model> for VenueResponse {
    fn from(m: venue::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            address: m.address,
            city: m.city,
            image_url: m.image_url,
            images: serde_json::from_value(m.images).unwrap_or_default(),
            map_embed_html: m.map_embed_html,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct VenueListResponse {
    pub data: Vec<VenueResponse>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VenueListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Case-insensitive city match.
    pub city: Option<String>,
    /// Case-insensitive match on name or address.
    pub search: Option<String>,
}

pub fn validate_create_venue(req: &CreateVenueRequest) -> Result<(), AppError> {
    validate_text("Name", &req.name, 200)?;
    validate_text("Address", &req.address, 500)?;
    validate_optional_text("City", req.city.as_deref(), 100)?;
    validate_optional_text("Description", req.description.as_deref(), 10_000)?;
    Ok(())
}

pub fn validate_update_venue(req: &UpdateVenueRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_text("Name", name, 200)?;
    }
    if let Some(ref address) = req.address {
        validate_text("Address", address, 500)?;
    }
    if let Some(Some(ref city)) = req.city {
        validate_optional_text("City", Some(city), 100)?;
    }
    if let Some(Some(ref description)) = req.description {
        validate_optional_text("Description", Some(description), 10_000)?;
    }
    Ok(())
}
