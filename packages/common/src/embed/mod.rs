//! Validation and sanitization of third-party iframe embeds.
//!
//! Markup is classified by an ordered list of [`PlatformDetector`]s, then
//! stripped of executable content by [`sanitize_embed_code`] before it is
//! stored on an artist.

mod detector;
mod embedding;
mod error;
mod platform;
mod sanitize;
mod validator;

pub use detector::{PlatformDetector, SoundCloudDetector, SpotifyDetector, YouTubeDetector};
pub use embedding::{Embedding, create_embedding, generate_embedding_id, refresh_embedding};
pub use error::EmbedError;
pub use platform::EmbedPlatform;
pub use sanitize::sanitize_embed_code;
pub use validator::{EmbedMetadata, EmbedValidationResult, EmbedValidator, ValidatedEmbed};
