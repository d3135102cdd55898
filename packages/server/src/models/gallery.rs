use chrono::{DateTime, Utc};
use common::GalleryCategory;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::{Pagination, double_option, validate_optional_text, validate_text};
use crate::entity::gallery_image;
use crate::error::AppError;

pub const MAX_TAGS: usize = 20;

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGalleryImageRequest {
    #[schema(example = "image-1718000000000-123456789.jpg")]
    pub filename: String,
    #[schema(example = "/uploads/gallery/image-1718000000000-123456789.jpg")]
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub medium_url: Option<String>,
    pub large_url: Option<String>,
    pub caption: Option<String>,
    pub event_id: Option<Uuid>,
    pub photographer: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: GalleryCategory,
    #[serde(default)]
    pub order_index: i32,
    #[serde(default = "default_published")]
    pub is_published: bool,
}

fn default_published() -> bool {
    true
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGalleryImageRequest {
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub thumbnail_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub medium_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub large_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub caption: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub event_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub photographer: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub category: Option<GalleryCategory>,
    pub order_index: Option<i32>,
    pub is_published: Option<bool>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImageResponse {
    pub id: Uuid,
    pub filename: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub medium_url: Option<String>,
    pub large_url: Option<String>,
    pub caption: Option<String>,
    pub event_id: Option<Uuid>,
    pub photographer: Option<String>,
    pub tags: Vec<String>,
    pub category: GalleryCategory,
    pub order_index: i32,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<gallery_image::Model> for GalleryImageResponse {
    fn from(m: gallery_image::Model) -> Self {
        Self {
            id: m.id,
            filename: m.filename,
            url: m.url,
            thumbnail_url: m.thumbnail_url,
            medium_url: m.medium_url,
            large_url: m.large_url,
            caption: m.caption,
            event_id: m.event_id,
            photographer: m.photographer,
            tags: serde_json::from_value(m.tags).unwrap_or_default(),
            category: m.category,
            order_index: m.order_index,
            is_published: m.is_published,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct GalleryListResponse {
    pub data: Vec<GalleryImageResponse>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct GalleryListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub category: Option<GalleryCategory>,
    pub event_id: Option<Uuid>,
    /// Images carrying this tag.
    pub tag: Option<String>,
    /// Filter on publication state. Only honoured for `gallery:manage`.
    pub published: Option<bool>,
}

/// Normalize a tag list: trimmed, lowercased, blanks and duplicates dropped.
pub fn normalize_tags(tags: &[String]) -> Result<Vec<String>, AppError> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() || out.contains(&tag) {
            continue;
        }
        validate_text("Tag", &tag, 50)?;
        out.push(tag);
    }
    if out.len() > MAX_TAGS {
        return Err(AppError::Validation(format!(
            "At most {MAX_TAGS} tags are allowed"
        )));
    }
    Ok(out)
}

/// Split a comma-separated multipart tag field. A JSON array is also accepted.
pub fn parse_tag_field(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.starts_with('[')
        && let Ok(tags) = serde_json::from_str::<Vec<String>>(raw)
    {
        return tags;
    }
    raw.split(',').map(str::to_string).collect()
}

pub fn validate_create_gallery_image(req: &CreateGalleryImageRequest) -> Result<(), AppError> {
    validate_text("Filename", &req.filename, 255)?;
    validate_text("URL", &req.url, 1000)?;
    validate_optional_text("Caption", req.caption.as_deref(), 1000)?;
    validate_optional_text("Photographer", req.photographer.as_deref(), 200)?;
    Ok(())
}

pub fn validate_update_gallery_image(req: &UpdateGalleryImageRequest) -> Result<(), AppError> {
    if let Some(Some(ref caption)) = req.caption {
        validate_optional_text("Caption", Some(caption), 1000)?;
    }
    if let Some(Some(ref photographer)) = req.photographer {
        validate_optional_text("Photographer", Some(photographer), 200)?;
    }
    Ok(())
}
