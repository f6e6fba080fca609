use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::Document;
use crate::domain::repositories::{DocumentRepository, document_repository::DocumentRepositoryError};

#[derive(Debug, thiserror::Error)]
pub enum GetDocumentError {
    #[error("Document not found: {0}")]
    DocumentNotFound(Uuid),
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

impl From<DocumentRepositoryError> for GetDocumentError {
    fn from(error: DocumentRepositoryError) -> Self {
        match error {
            DocumentRepositoryError::NotFound(id) => GetDocumentError::DocumentNotFound(id),
            _ => GetDocumentError::RepositoryError(error.to_string()),
        }
    }
}

pub struct GetDocumentUseCase {
    document_repository: Arc<dyn DocumentRepository>,
}

impl GetDocumentUseCase {
    pub fn new(document_repository: Arc<dyn DocumentRepository>) -> Self {
        Self { document_repository }
    }

    pub async fn execute(&self, document_id: Uuid) -> Result<Document, GetDocumentError> {
        self.document_repository
            .find_by_id(document_id)
            .await?
            .ok_or(GetDocumentError::DocumentNotFound(document_id))
    }
}
