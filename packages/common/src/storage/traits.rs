use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use super::error::StorageError;

/// Top-level upload folder. Each folder has a fixed filename prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaFolder {
    Gallery,
    Artists,
}

impl MediaFolder {
    pub const ALL: &'static [MediaFolder] = &[Self::Gallery, Self::Artists];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gallery => "gallery",
            Self::Artists => "artists",
        }
    }

    /// Prefix of generated filenames in this folder.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            Self::Gallery => "image",
            Self::Artists => "artist",
        }
    }
}

impl fmt::Display for MediaFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaFolder {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| StorageError::InvalidName(s.to_string()))
    }
}

/// A file written by a [`MediaStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredMedia {
    pub folder: MediaFolder,
    pub filename: String,
    pub size: u64,
}

impl StoredMedia {
    /// Path under which the server exposes the file.
    pub fn public_url(&self) -> String {
        format!("/uploads/{}/{}", self.folder, self.filename)
    }
}

/// Storage for uploaded images.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store bytes under a freshly generated name ending in `.{extension}`.
    async fn put(
        &self,
        folder: MediaFolder,
        extension: &str,
        data: &[u8],
    ) -> Result<StoredMedia, StorageError>;

    /// Read a stored file.
    async fn get(&self, folder: MediaFolder, filename: &str) -> Result<Vec<u8>, StorageError>;

    /// Check whether a file exists.
    async fn exists(&self, folder: MediaFolder, filename: &str) -> Result<bool, StorageError>;

    /// Delete a file.
    ///
    /// Returns `true` if the file was deleted, `false` if it did not exist.
    async fn delete(&self, folder: MediaFolder, filename: &str) -> Result<bool, StorageError>;
}
