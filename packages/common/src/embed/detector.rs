use std::sync::LazyLock;

use regex::Regex;

use super::platform::EmbedPlatform;
use super::validator::EmbedMetadata;

/// Recognises one platform's embed markup and derives display metadata from it.
///
/// Detectors are consulted in registration order by
/// [`EmbedValidator`](super::EmbedValidator); the first one whose
/// [`matches`](Self::matches) returns true owns the input.
pub trait PlatformDetector: Send + Sync {
    fn platform(&self) -> EmbedPlatform;

    /// Cheap substring test against the whole markup.
    fn matches(&self, code: &str) -> bool;

    /// Stricter test against the extracted `src` URL.
    fn accepts_src(&self, src: &str) -> bool;

    /// Best-effort metadata. Falls back to generic values rather than failing.
    fn metadata(&self, code: &str, src: &str) -> EmbedMetadata;
}

static SRC_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|[\s"'/])src\s*=\s*(?:"([^"]+)"|'([^']+)')"#).expect("valid regex")
});

static TITLE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|[\s"'/])title\s*=\s*(?:"([^"]+)"|'([^']+)')"#).expect("valid regex")
});

static SPOTIFY_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/embed/(track|album|playlist)/([^?/]+)").expect("valid regex")
});

static YOUTUBE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:embed/|youtu\.be/)([^?&/]+)").expect("valid regex"));

static SOUNDCLOUD_TRACK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"soundcloud\.com/([^/]+)/([^/?#]+)").expect("valid regex")
});

/// First `src="…"` or `src='…'` attribute value in the markup.
pub(crate) fn extract_src(code: &str) -> Option<&str> {
    first_attr(&SRC_ATTR, code)
}

fn first_attr<'a>(re: &Regex, code: &'a str) -> Option<&'a str> {
    let caps = re.captures(code)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub struct SpotifyDetector;

impl PlatformDetector for SpotifyDetector {
    fn platform(&self) -> EmbedPlatform {
        EmbedPlatform::Spotify
    }

    fn matches(&self, code: &str) -> bool {
        code.contains("open.spotify.com/embed")
    }

    fn accepts_src(&self, src: &str) -> bool {
        src.contains("open.spotify.com/embed")
    }

    // Spotify exposes no stable thumbnail path derivable from the embed id,
    // so no thumbnail is reported.
    fn metadata(&self, _code: &str, src: &str) -> EmbedMetadata {
        let kind = SPOTIFY_PATH
            .captures(src)
            .and_then(|c| c.get(1))
            .map_or("track", |m| m.as_str());

        EmbedMetadata {
            title: Some(format!("Spotify {}", capitalize(kind))),
            description: Some(format!("Spotify {kind} embed")),
            thumbnail_url: None,
        }
    }
}

pub struct YouTubeDetector;

impl PlatformDetector for YouTubeDetector {
    fn platform(&self) -> EmbedPlatform {
        EmbedPlatform::YouTube
    }

    fn matches(&self, code: &str) -> bool {
        code.contains("youtube.com/embed") || code.contains("youtu.be")
    }

    fn accepts_src(&self, src: &str) -> bool {
        src.contains("youtube.com/embed") || src.contains("youtu.be")
    }

    fn metadata(&self, code: &str, src: &str) -> EmbedMetadata {
        let title = first_attr(&TITLE_ATTR, code)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("YouTube Video");

        let thumbnail_url = YOUTUBE_ID
            .captures(src)
            .and_then(|c| c.get(1))
            .map(|id| format!("https://img.youtube.com/vi/{}/maxresdefault.jpg", id.as_str()));

        EmbedMetadata {
            title: Some(title.to_string()),
            description: Some("YouTube video embed".into()),
            thumbnail_url,
        }
    }
}

pub struct SoundCloudDetector;

impl SoundCloudDetector {
    /// Decoded value of the player's `url` query parameter.
    fn track_url(src: &str) -> Option<String> {
        let parsed = url::Url::parse(&src.replace("&amp;", "&")).ok()?;
        parsed
            .query_pairs()
            .find(|(k, _)| k == "url")
            .map(|(_, v)| v.into_owned())
    }
}

impl PlatformDetector for SoundCloudDetector {
    fn platform(&self) -> EmbedPlatform {
        EmbedPlatform::SoundCloud
    }

    fn matches(&self, code: &str) -> bool {
        code.contains("soundcloud.com/player")
    }

    fn accepts_src(&self, src: &str) -> bool {
        src.contains("soundcloud.com/player")
    }

    fn metadata(&self, _code: &str, src: &str) -> EmbedMetadata {
        let title = Self::track_url(src)
            .and_then(|url| {
                SOUNDCLOUD_TRACK
                    .captures(&url)
                    .and_then(|c| c.get(2))
                    .map(|slug| format!("SoundCloud: {}", slug.as_str().replace('-', " ")))
            })
            .unwrap_or_else(|| "SoundCloud Track".into());

        EmbedMetadata {
            title: Some(title),
            description: Some("SoundCloud audio embed".into()),
            thumbnail_url: None,
        }
    }
}
