use async_trait::async_trait;
use std::path::Path;

#[derive(Debug, Clone, thiserror::Error)]
pub enum DocumentExtractionError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Corrupted file: {0}")]
    CorruptedFile(String),
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),
    #[error("IO error: {0}")]
    IoError(String),
}

#[derive(Debug, Clone)]
pub struct ExtractedContent {
    pub text: String,
    pub page_count: Option<i32>,
}

#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// `mime_type` is the declared type of the upload.
    async fn extract_text(
        &self,
        file_path: &Path,
        mime_type: &str,
    ) -> Result<ExtractedContent, DocumentExtractionError>;

    fn supported_formats(&self) -> Vec<String>;

    fn can_extract(&self, mime_type: &str) -> bool {
        self.supported_formats().iter().any(|f| f == mime_type)
    }
}
