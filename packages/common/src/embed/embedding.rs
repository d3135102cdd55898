use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::EmbedError;
use super::platform::EmbedPlatform;
use super::sanitize::sanitize_embed_code;
use super::validator::EmbedValidator;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A sanitized third-party embed stored on an artist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Embedding {
    /// Opaque token, unique within the owning artist.
    #[schema(example = "embed_1718000000000_k3j9x0q2a")]
    pub id: String,
    pub platform: EmbedPlatform,
    /// Sanitized iframe markup.
    pub embed_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// `embed_<unix millis>_<9 base36 chars>`.
pub fn generate_embedding_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..9)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("embed_{}_{}", Utc::now().timestamp_millis(), suffix)
}

/// Validate and sanitize markup into a new embedding.
pub fn create_embedding(validator: &EmbedValidator, input: &str) -> Result<Embedding, EmbedError> {
    let embed = validator.validate(input)?;
    let embed_code = sanitize_embed_code(&embed.code)?;

    Ok(Embedding {
        id: generate_embedding_id(),
        platform: embed.platform,
        embed_code,
        title: embed.metadata.title,
        description: embed.metadata.description,
        thumbnail_url: embed.metadata.thumbnail_url,
        created_at: Utc::now(),
        updated_at: None,
    })
}

/// Re-validate replacement markup for an existing embedding. The id and
/// creation time carry over; everything derived from the markup is replaced.
pub fn refresh_embedding(
    existing: &Embedding,
    validator: &EmbedValidator,
    input: &str,
) -> Result<Embedding, EmbedError> {
    let fresh = create_embedding(validator, input)?;
    Ok(Embedding {
        id: existing.id.clone(),
        created_at: existing.created_at,
        updated_at: Some(Utc::now()),
        ..fresh
    })
}
