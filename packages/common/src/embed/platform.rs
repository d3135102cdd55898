use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Third-party platform an embed was recognised as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EmbedPlatform {
    Spotify,
    #[serde(rename = "youtube")]
    YouTube,
    #[serde(rename = "soundcloud")]
    SoundCloud,
}

impl EmbedPlatform {
    pub const ALL: &'static [EmbedPlatform] = &[Self::Spotify, Self::YouTube, Self::SoundCloud];

    /// Wire representation (`spotify`, `youtube`, `soundcloud`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spotify => "spotify",
            Self::YouTube => "youtube",
            Self::SoundCloud => "soundcloud",
        }
    }

    /// Brand name used in user-facing messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Spotify => "Spotify",
            Self::YouTube => "YouTube",
            Self::SoundCloud => "SoundCloud",
        }
    }
}

impl fmt::Display for EmbedPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePlatformError(String);

impl fmt::Display for ParsePlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid platform '{}'. Valid values: spotify, youtube, soundcloud",
            self.0
        )
    }
}

impl std::error::Error for ParsePlatformError {}

impl FromStr for EmbedPlatform {
    type Err = ParsePlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ParsePlatformError(s.to_string()))
    }
}
