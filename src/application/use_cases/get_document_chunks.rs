use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::DocumentChunk;
use crate::domain::repositories::{
    ChunkRepository, DocumentRepository, chunk_repository::ChunkRepositoryError,
    document_repository::DocumentRepositoryError,
};

#[derive(Debug, thiserror::Error)]
pub enum GetDocumentChunksError {
    #[error("Document not found: {0}")]
    DocumentNotFound(Uuid),
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

impl From<DocumentRepositoryError> for GetDocumentChunksError {
    fn from(error: DocumentRepositoryError) -> Self {
        match error {
            DocumentRepositoryError::NotFound(id) => GetDocumentChunksError::DocumentNotFound(id),
            _ => GetDocumentChunksError::RepositoryError(error.to_string()),
        }
    }
}

impl From<ChunkRepositoryError> for GetDocumentChunksError {
    fn from(error: ChunkRepositoryError) -> Self {
        GetDocumentChunksError::RepositoryError(error.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct GetDocumentChunksRequest {
    pub document_id: Uuid,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct GetDocumentChunksResponse {
    pub document_id: Uuid,
    pub chunks: Vec<DocumentChunk>,
    pub total_chunks: i64,
    pub skip: i64,
    pub limit: i64,
}

pub struct GetDocumentChunksUseCase {
    document_repository: Arc<dyn DocumentRepository>,
    chunk_repository: Arc<dyn ChunkRepository>,
}

impl GetDocumentChunksUseCase {
    pub fn new(
        document_repository: Arc<dyn DocumentRepository>,
        chunk_repository: Arc<dyn ChunkRepository>,
    ) -> Self {
        Self {
            document_repository,
            chunk_repository,
        }
    }

    pub async fn execute(
        &self,
        request: GetDocumentChunksRequest,
    ) -> Result<GetDocumentChunksResponse, GetDocumentChunksError> {
        self.document_repository
            .find_by_id(request.document_id)
            .await?
            .ok_or(GetDocumentChunksError::DocumentNotFound(request.document_id))?;

        let skip = request.skip.unwrap_or(0).max(0);
        let limit = request.limit.unwrap_or(50).clamp(1, 100);

        let chunks = self
            .chunk_repository
            .find_by_document_paginated(request.document_id, skip, limit)
            .await?;
        let total_chunks = self
            .chunk_repository
            .count_by_document(request.document_id)
            .await?;

        Ok(GetDocumentChunksResponse {
            document_id: request.document_id,
            chunks,
            total_chunks,
            skip,
            limit,
        })
    }
}
