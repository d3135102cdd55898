use chrono::{DateTime, Utc};
use common::embed::Embedding;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::{Pagination, double_option, validate_optional_text, validate_text, validate_url};
use crate::entity::artist;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateArtistRequest {
    #[schema(example = "Nordlys Kvartet")]
    pub name: String,
    /// Derived from `name` when omitted.
    pub slug: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub website: Option<String>,
    /// Map of network name to profile URL.
    #[schema(value_type = Option<Object>, example = json!({"instagram": "https://instagram.com/nordlys"}))]
    pub social_media: Option<serde_json::Value>,
    #[schema(example = "jazz")]
    pub genre: Option<String>,
    #[serde(default)]
    pub is_bookable: bool,
    pub booking_user_id: Option<Uuid>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArtistRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub website: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Object>)]
    pub social_media: Option<Option<serde_json::Value>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub genre: Option<Option<String>>,
    pub is_bookable: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub booking_user_id: Option<Option<Uuid>>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtistResponse {
    pub id: Uuid,
    pub name: String,
    #[schema(example = "nordlys-kvartet")]
    pub slug: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub website: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub social_media: Option<serde_json::Value>,
    pub genre: Option<String>,
    pub is_bookable: bool,
    pub booking_user_id: Option<Uuid>,
    pub embeddings: Vec<Embedding>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<artist::Model> for ArtistResponse {
    type Error = AppError;

    fn try_from(m: artist::Model) -> Result<Self, AppError> {
        let embeddings = embeddings_of(&m)?;
        Ok(Self {
            id: m.id,
            name: m.name,
            slug: m.slug,
            bio: m.bio,
            image_url: m.image_url,
            website: m.website,
            social_media: m.social_media,
            genre: m.genre,
            is_bookable: m.is_bookable,
            booking_user_id: m.booking_user_id,
            embeddings,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

/// Decode the embeddings column of an artist row.
pub fn embeddings_of(m: &artist::Model) -> Result<Vec<Embedding>, AppError> {
    if m.embeddings.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(m.embeddings.clone()).map_err(|e| {
        AppError::Internal(format!("Corrupt embeddings on artist {}: {e}", m.id))
    })
}

/// Encode embeddings for storage.
pub fn embeddings_value(embeddings: &[Embedding]) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(embeddings)
        .map_err(|e| AppError::Internal(format!("Failed to encode embeddings: {e}")))
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ArtistListResponse {
    pub data: Vec<ArtistResponse>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ArtistListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Exact genre match (case-insensitive).
    pub genre: Option<String>,
    /// Case-insensitive match on name or bio.
    pub search: Option<String>,
    /// Only bookable (`true`) or non-bookable (`false`) artists.
    pub bookable: Option<bool>,
}

/// Request body carrying third-party embed markup.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmbedCodeRequest {
    #[schema(example = "<iframe src=\"https://open.spotify.com/embed/track/abc123\"></iframe>")]
    #[serde(default)]
    pub embed_code: String,
}

fn validate_social_media(value: &serde_json::Value) -> Result<(), AppError> {
    let Some(map) = value.as_object() else {
        return Err(AppError::Validation(
            "socialMedia must be an object of network name to URL".into(),
        ));
    };
    for (network, url) in map {
        let url = url.as_str().ok_or_else(|| {
            AppError::Validation(format!("socialMedia.{network} must be a string"))
        })?;
        validate_url(&format!("socialMedia.{network}"), url)?;
    }
    Ok(())
}

pub fn validate_create_artist(req: &CreateArtistRequest) -> Result<(), AppError> {
    validate_text("Name", &req.name, 200)?;
    if let Some(ref slug) = req.slug {
        validate_text("Slug", slug, 200)?;
    }
    validate_optional_text("Bio", req.bio.as_deref(), 10_000)?;
    validate_optional_text("Genre", req.genre.as_deref(), 100)?;
    if let Some(ref website) = req.website {
        validate_url("website", website)?;
    }
    if let Some(ref social) = req.social_media {
        validate_social_media(social)?;
    }
    Ok(())
}

pub fn validate_update_artist(req: &UpdateArtistRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_text("Name", name, 200)?;
    }
    if let Some(ref slug) = req.slug {
        validate_text("Slug", slug, 200)?;
    }
    if let Some(Some(ref bio)) = req.bio {
        validate_optional_text("Bio", Some(bio), 10_000)?;
    }
    if let Some(Some(ref genre)) = req.genre {
        validate_optional_text("Genre", Some(genre), 100)?;
    }
    if let Some(Some(ref website)) = req.website {
        validate_url("website", website)?;
    }
    if let Some(Some(ref social)) = req.social_media {
        validate_social_media(social)?;
    }
    Ok(())
}
