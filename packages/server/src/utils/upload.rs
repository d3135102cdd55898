use axum::extract::multipart::Field;

use super::filename::{FilenameError, extension_of};
use crate::error::AppError;

/// Accepted image extensions.
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];
/// Accepted declared content types.
pub const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No file uploaded")]
    Missing,
    #[error("{}", .0.message())]
    Filename(FilenameError),
    #[error("Only image files are allowed (jpg, jpeg, png, webp)")]
    Extension,
    #[error("Only image files are allowed (image/jpeg, image/png, image/webp)")]
    MimeType,
    #[error("File content does not match its image type")]
    Content,
    #[error("File too large. Maximum size is {}MB.", .limit / (1024 * 1024))]
    TooLarge { limit: u64 },
    #[error("Upload read error: {0}")]
    Read(String),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        AppError::InvalidUpload(err.to_string())
    }
}

/// An image accepted from a multipart field, fully buffered.
#[derive(Debug)]
pub struct ImageUpload {
    pub original_name: String,
    /// Normalized extension used for the stored name.
    pub extension: &'static str,
    pub data: Vec<u8>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ImageKind {
    Jpeg,
    Png,
    Webp,
}

impl ImageKind {
    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(Self::Png)
        } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            Some(Self::Webp)
        } else {
            None
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

/// Check name, declared type and leading bytes of an image upload.
/// Returns the extension to store the file under.
pub fn validate_image(
    filename: &str,
    content_type: Option<&str>,
    data: &[u8],
) -> Result<&'static str, UploadError> {
    let ext = extension_of(filename).map_err(UploadError::Filename)?;
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(UploadError::Extension);
    }
    let by_name = ImageKind::from_extension(&ext).ok_or(UploadError::Extension)?;

    if let Some(mime) = content_type {
        let mime = mime.to_ascii_lowercase();
        if !ALLOWED_MIME_TYPES.contains(&mime.as_str()) {
            return Err(UploadError::MimeType);
        }
        if ImageKind::from_mime(&mime) != Some(by_name) {
            return Err(UploadError::MimeType);
        }
    }

    if ImageKind::sniff(data) != Some(by_name) {
        return Err(UploadError::Content);
    }

    Ok(by_name.extension())
}

/// Buffer a multipart file field, enforcing `max_size` while reading, then
/// validate it as an image.
pub async fn read_image_field(
    mut field: Field<'_>,
    max_size: u64,
) -> Result<ImageUpload, UploadError> {
    let original_name = field
        .file_name()
        .map(str::to_string)
        .ok_or(UploadError::Missing)?;
    let content_type = field.content_type().map(str::to_string);

    let mut data = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| UploadError::Read(e.to_string()))?
    {
        if (data.len() + chunk.len()) as u64 > max_size {
            return Err(UploadError::TooLarge { limit: max_size });
        }
        data.extend_from_slice(&chunk);
    }

    if data.is_empty() {
        return Err(UploadError::Missing);
    }

    let extension = validate_image(&original_name, content_type.as_deref(), &data)?;
    Ok(ImageUpload {
        original_name,
        extension,
        data,
    })
}
