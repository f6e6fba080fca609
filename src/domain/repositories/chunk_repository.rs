use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::DocumentChunk;

#[derive(Debug, thiserror::Error)]
pub enum ChunkRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[async_trait]
pub trait ChunkRepository: Send + Sync {
    /// Swaps every chunk of a document for `chunks` in one transaction, so
    /// readers see either the old set or the new one.
    async fn replace_for_document(
        &self,
        document_id: Uuid,
        chunks: &[DocumentChunk],
    ) -> Result<usize, ChunkRepositoryError>;

    /// All chunks of an organization, in insertion order.
    async fn find_by_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<DocumentChunk>, ChunkRepositoryError>;

    async fn find_by_document_paginated(
        &self,
        document_id: Uuid,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<DocumentChunk>, ChunkRepositoryError>;

    async fn count_by_document(&self, document_id: Uuid) -> Result<i64, ChunkRepositoryError>;
}
