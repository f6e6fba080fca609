use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::ports::{FileStorage, JobQueue, OrganizationDirectory, job_queue::IngestionJob};
use crate::domain::entities::Document;
use crate::domain::repositories::{DocumentRepository, document_repository::DocumentRepositoryError};
use crate::domain::value_objects::ContentHash;

#[derive(Debug, thiserror::Error)]
pub enum UploadDocumentError {
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Repository error: {0}")]
    RepositoryError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Duplicate document: {0}")]
    DuplicateDocument(Uuid),
    #[error("Organization not found: {0}")]
    OrganizationNotFound(Uuid),
    #[error("Queue error: {0}")]
    QueueError(String),
}

impl From<DocumentRepositoryError> for UploadDocumentError {
    fn from(error: DocumentRepositoryError) -> Self {
        UploadDocumentError::RepositoryError(error.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct UploadDocumentRequest {
    pub organization_id: Uuid,
    pub file_name: String,
    pub file_data: Vec<u8>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UploadDocumentResponse {
    pub document: Document,
}

pub struct UploadDocumentUseCase {
    document_repository: Arc<dyn DocumentRepository>,
    file_storage: Arc<dyn FileStorage>,
    job_queue: Arc<dyn JobQueue>,
    directory: Arc<dyn OrganizationDirectory>,
}

impl UploadDocumentUseCase {
    pub fn new(
        document_repository: Arc<dyn DocumentRepository>,
        file_storage: Arc<dyn FileStorage>,
        job_queue: Arc<dyn JobQueue>,
        directory: Arc<dyn OrganizationDirectory>,
    ) -> Self {
        Self {
            document_repository,
            file_storage,
            job_queue,
            directory,
        }
    }

    pub async fn execute(
        &self,
        request: UploadDocumentRequest,
    ) -> Result<UploadDocumentResponse, UploadDocumentError> {
        if request.file_name.trim().is_empty() {
            return Err(UploadDocumentError::ValidationError(
                "File name cannot be empty".to_string(),
            ));
        }

        if request.file_data.is_empty() {
            return Err(UploadDocumentError::ValidationError(
                "File data cannot be empty".to_string(),
            ));
        }

        self.directory
            .get_organization(request.organization_id)
            .await
            .map_err(|_| UploadDocumentError::OrganizationNotFound(request.organization_id))?;

        let content_hash = ContentHash::of(&request.file_data);
        if let Some(existing) = self
            .document_repository
            .find_by_hash(request.organization_id, content_hash.as_str())
            .await?
        {
            return Err(UploadDocumentError::DuplicateDocument(existing.id()));
        }

        let stored = self
            .file_storage
            .store_file(&request.file_data, &request.file_name)
            .await
            .map_err(|e| UploadDocumentError::StorageError(e.to_string()))?;

        let mime_type = request
            .content_type
            .filter(|c| !c.is_empty() && c != "application/octet-stream")
            .or_else(|| mime_from_extension(&request.file_name).map(str::to_string));

        let document = Document::new(
            request.organization_id,
            stored.path.clone(),
            request.file_name,
            mime_type,
            request.file_data.len() as i64,
            content_hash,
        );
        if let Err(e) = self.document_repository.save(&document).await {
            // No row will ever point at the stored bytes
            if let Err(cleanup) = self.file_storage.delete_file(&stored.path).await {
                warn!(path = %stored.path, error = %cleanup, "Failed to remove orphaned upload");
            }
            return Err(e.into());
        }

        self.job_queue
            .enqueue(IngestionJob {
                document_id: document.id(),
                organization_id: document.organization_id(),
            })
            .await
            .map_err(|e| UploadDocumentError::QueueError(e.to_string()))?;

        info!(
            document_id = %document.id(),
            organization_id = %document.organization_id(),
            "Document uploaded and queued"
        );

        Ok(UploadDocumentResponse { document })
    }
}

/// MIME type implied by a file name, for uploads without a usable one.
pub fn mime_from_extension(file_name: &str) -> Option<&'static str> {
    let extension = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match extension.as_str() {
        "pdf" => Some("application/pdf"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        "txt" | "md" => Some("text/plain"),
        "csv" => Some("text/csv"),
        "html" | "htm" => Some("text/html"),
        _ => None,
    }
}
