use super::platform::EmbedPlatform;

/// Reasons an embed is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmbedError {
    /// Input was empty or not a string.
    #[error("Embed code is required")]
    Missing,
    /// No registered detector recognised the markup.
    #[error("Unsupported platform. Only Spotify, YouTube, and SoundCloud are supported.")]
    UnsupportedPlatform,
    /// The markup has no `src` attribute.
    #[error("Invalid {} embed code - missing src attribute", .0.display_name())]
    MissingSrc(EmbedPlatform),
    /// The `src` attribute does not point at the detected platform.
    #[error("Invalid {} embed URL", .0.display_name())]
    InvalidSrc(EmbedPlatform),
    /// Nothing iframe-shaped survived sanitization.
    #[error("Only iframe embeds are allowed")]
    NotIframe,
    /// Sanitized markup holds more than one `<iframe`.
    #[error("Only a single iframe embed is allowed")]
    MultipleIframes,
}
