use serde::{Deserialize, Serialize};

use super::detector::{
    PlatformDetector, SoundCloudDetector, SpotifyDetector, YouTubeDetector, extract_src,
};
use super::error::EmbedError;
use super::platform::EmbedPlatform;
use super::sanitize::sanitize_embed_code;

/// Display metadata derived from embed markup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmbedMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Markup accepted by [`EmbedValidator::validate`]. `code` is the trimmed
/// input, not yet sanitized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedEmbed {
    pub platform: EmbedPlatform,
    pub code: String,
    pub src: String,
    pub metadata: EmbedMetadata,
}

/// Serializable outcome of validating and sanitizing a piece of markup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmbedValidationResult {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<EmbedPlatform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanitized_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EmbedValidationResult {
    pub fn invalid(err: &EmbedError) -> Self {
        Self {
            is_valid: false,
            platform: None,
            sanitized_code: None,
            title: None,
            description: None,
            thumbnail_url: None,
            error: Some(err.to_string()),
        }
    }
}

/// Ordered set of platform detectors.
pub struct EmbedValidator {
    detectors: Vec<Box<dyn PlatformDetector>>,
}

impl Default for EmbedValidator {
    /// Spotify, then YouTube, then SoundCloud.
    fn default() -> Self {
        Self::empty()
            .with_detector(SpotifyDetector)
            .with_detector(YouTubeDetector)
            .with_detector(SoundCloudDetector)
    }
}

impl EmbedValidator {
    /// A validator that rejects everything until detectors are registered.
    pub fn empty() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    /// Append a detector. It is consulted after all earlier ones.
    pub fn with_detector(mut self, detector: impl PlatformDetector + 'static) -> Self {
        self.detectors.push(Box::new(detector));
        self
    }

    /// Classify markup and extract metadata. The first detector that matches
    /// decides the outcome; there is no fallback to later detectors.
    pub fn validate(&self, input: &str) -> Result<ValidatedEmbed, EmbedError> {
        let code = input.trim();
        if code.is_empty() {
            return Err(EmbedError::Missing);
        }

        let detector = self
            .detectors
            .iter()
            .find(|d| d.matches(code))
            .ok_or(EmbedError::UnsupportedPlatform)?;
        let platform = detector.platform();

        let src = extract_src(code).ok_or(EmbedError::MissingSrc(platform))?;
        if !detector.accepts_src(src) {
            return Err(EmbedError::InvalidSrc(platform));
        }

        Ok(ValidatedEmbed {
            platform,
            code: code.to_string(),
            src: src.to_string(),
            metadata: detector.metadata(code, src),
        })
    }

    /// Validate, then sanitize, returning the combined result.
    pub fn check(&self, input: &str) -> EmbedValidationResult {
        let outcome = self.validate(input).and_then(|embed| {
            let sanitized = sanitize_embed_code(&embed.code)?;
            Ok((embed, sanitized))
        });

        match outcome {
            Ok((embed, sanitized)) => EmbedValidationResult {
                is_valid: true,
                platform: Some(embed.platform),
                sanitized_code: Some(sanitized),
                title: embed.metadata.title,
                description: embed.metadata.description,
                thumbnail_url: embed.metadata.thumbnail_url,
                error: None,
            },
            Err(err) => EmbedValidationResult::invalid(&err),
        }
    }
}
