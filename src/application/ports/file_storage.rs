use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum FileStorageError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub path: String,
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn store_file(&self, data: &[u8], file_name: &str) -> Result<StoredFile, FileStorageError>;

    /// Returns `false` when there was nothing to delete.
    async fn delete_file(&self, path: &str) -> Result<bool, FileStorageError>;
}
