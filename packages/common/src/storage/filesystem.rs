use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use tokio::fs;

use super::error::StorageError;
use super::traits::{MediaFolder, MediaStore, StoredMedia};

/// Filesystem-backed media store.
///
/// Files live at `{base_path}/{folder}/{prefix}-{unix millis}-{random}.{ext}`.
pub struct FilesystemMediaStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemMediaStore {
    /// Create a new filesystem media store.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        for folder in MediaFolder::ALL {
            fs::create_dir_all(base_path.join(folder.as_str())).await?;
        }
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    fn file_path(&self, folder: MediaFolder, filename: &str) -> Result<PathBuf, StorageError> {
        if !is_flat_name(filename) {
            return Err(StorageError::InvalidName(filename.to_string()));
        }
        Ok(self.base_path.join(folder.as_str()).join(filename))
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }

    fn generate_filename(folder: MediaFolder, extension: &str) -> String {
        let suffix: u32 = rand::rng().random_range(0..1_000_000_000);
        format!(
            "{}-{}-{}.{}",
            folder.file_prefix(),
            Utc::now().timestamp_millis(),
            suffix,
            extension
        )
    }
}

fn is_flat_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
        && !name.chars().any(|c| c.is_ascii_control())
}

#[async_trait]
impl MediaStore for FilesystemMediaStore {
    async fn put(
        &self,
        folder: MediaFolder,
        extension: &str,
        data: &[u8],
    ) -> Result<StoredMedia, StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }
        if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(StorageError::InvalidName(extension.to_string()));
        }

        let filename = Self::generate_filename(folder, extension);
        let target = self.file_path(folder, &filename)?;

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, &target).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(StoredMedia {
            folder,
            filename,
            size: data.len() as u64,
        })
    }

    async fn get(&self, folder: MediaFolder, filename: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.file_path(folder, filename)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, folder: MediaFolder, filename: &str) -> Result<bool, StorageError> {
        let path = self.file_path(folder, filename)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn delete(&self, folder: MediaFolder, filename: &str) -> Result<bool, StorageError> {
        let path = self.file_path(folder, filename)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
