use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use crate::application::ports::file_storage::{FileStorage, FileStorageError, StoredFile};

/// Keeps uploads under one directory as `<uuid>.<ext>`.
pub struct LocalFileStorage {
    base_path: PathBuf,
}

impl LocalFileStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub async fn ensure_directory_exists(&self) -> Result<(), FileStorageError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| FileStorageError::IoError(e.to_string()))
    }

    fn file_path_for(&self, file_id: Uuid, file_name: &str) -> PathBuf {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|e| e.to_ascii_lowercase());

        match extension {
            Some(ext) => self.base_path.join(format!("{}.{}", file_id, ext)),
            None => self.base_path.join(file_id.to_string()),
        }
    }

    /// Rejects paths outside the storage directory.
    fn owned_path(&self, path: &str) -> Result<PathBuf, FileStorageError> {
        let candidate = PathBuf::from(path);
        let inside = candidate.parent() == Some(self.base_path.as_path())
            && candidate.file_name().is_some();

        if inside {
            Ok(candidate)
        } else {
            Err(FileStorageError::InvalidPath(path.to_string()))
        }
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn store_file(&self, data: &[u8], file_name: &str) -> Result<StoredFile, FileStorageError> {
        self.ensure_directory_exists().await?;

        let file_id = Uuid::new_v4();
        let file_path = self.file_path_for(file_id, file_name);

        fs::write(&file_path, data)
            .await
            .map_err(|e| FileStorageError::IoError(e.to_string()))?;

        Ok(StoredFile {
            path: file_path.to_string_lossy().to_string(),
        })
    }

    async fn delete_file(&self, path: &str) -> Result<bool, FileStorageError> {
        let path = self.owned_path(path)?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(FileStorageError::IoError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path().join("uploads"));

        let stored = storage.store_file(b"hello", "Price List.PDF").await.unwrap();

        assert!(stored.path.ends_with(".pdf"));
        assert_eq!(fs::read(&stored.path).await.unwrap(), b"hello");

        assert!(storage.delete_file(&stored.path).await.unwrap());
        assert!(!fs::try_exists(&stored.path).await.unwrap());
        assert!(!storage.delete_file(&stored.path).await.unwrap());
    }

    #[tokio::test]
    async fn test_odd_names_get_no_extension() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path().to_path_buf());

        let stored = storage.store_file(b"x", "notes.t x/t").await.unwrap();
        let name = Path::new(&stored.path).file_name().unwrap().to_str().unwrap();
        assert!(Uuid::parse_str(name).is_ok());
    }

    #[tokio::test]
    async fn test_rejects_foreign_paths() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path().to_path_buf());

        assert!(matches!(
            storage.delete_file("/etc/passwd").await,
            Err(FileStorageError::InvalidPath(_))
        ));
    }
}
