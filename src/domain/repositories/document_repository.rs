use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::Document;

#[derive(Debug, thiserror::Error)]
pub enum DocumentRepositoryError {
    #[error("Document not found: {0}")]
    NotFound(Uuid),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn save(&self, document: &Document) -> Result<(), DocumentRepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>, DocumentRepositoryError>;
    async fn find_by_hash(
        &self,
        organization_id: Uuid,
        hash: &str,
    ) -> Result<Option<Document>, DocumentRepositoryError>;
    async fn find_by_organization(
        &self,
        organization_id: Uuid,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Document>, DocumentRepositoryError>;
    async fn count_by_organization(&self, organization_id: Uuid) -> Result<i64, DocumentRepositoryError>;
    async fn update(&self, document: &Document) -> Result<(), DocumentRepositoryError>;
    /// Atomically moves the document into `processing` unless another run
    /// holds it and has touched it since `stale_before`. `None` means the
    /// claim was refused or the document does not exist.
    async fn claim_for_processing(
        &self,
        id: Uuid,
        stale_before: DateTime<Utc>,
    ) -> Result<Option<Document>, DocumentRepositoryError>;
}
