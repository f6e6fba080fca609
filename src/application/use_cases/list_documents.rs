use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::Document;
use crate::domain::repositories::{DocumentRepository, document_repository::DocumentRepositoryError};

#[derive(Debug, thiserror::Error)]
pub enum ListDocumentsError {
    #[error("Repository error: {0}")]
    RepositoryError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<DocumentRepositoryError> for ListDocumentsError {
    fn from(error: DocumentRepositoryError) -> Self {
        ListDocumentsError::RepositoryError(error.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ListDocumentsRequest {
    pub organization_id: Uuid,
    pub skip: i64,
    pub limit: i64,
}

#[derive(Debug, Clone)]
pub struct ListDocumentsResponse {
    pub documents: Vec<Document>,
    pub total_count: i64,
    pub skip: i64,
    pub limit: i64,
}

pub struct ListDocumentsUseCase {
    document_repository: Arc<dyn DocumentRepository>,
}

impl ListDocumentsUseCase {
    pub fn new(document_repository: Arc<dyn DocumentRepository>) -> Self {
        Self { document_repository }
    }

    pub async fn execute(
        &self,
        request: ListDocumentsRequest,
    ) -> Result<ListDocumentsResponse, ListDocumentsError> {
        if request.skip < 0 {
            return Err(ListDocumentsError::ValidationError(
                "Skip cannot be negative".to_string(),
            ));
        }

        if request.limit <= 0 || request.limit > 1000 {
            return Err(ListDocumentsError::ValidationError(
                "Limit must be between 1 and 1000".to_string(),
            ));
        }

        let documents = self
            .document_repository
            .find_by_organization(request.organization_id, request.skip, request.limit)
            .await?;
        let total_count = self
            .document_repository
            .count_by_organization(request.organization_id)
            .await?;

        Ok(ListDocumentsResponse {
            documents,
            total_count,
            skip: request.skip,
            limit: request.limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ContentHash;
    use crate::testing::InMemoryDocumentRepository;

    fn seed(repository: &InMemoryDocumentRepository, organization_id: Uuid, name: &str) {
        repository.insert(Document::new(
            organization_id,
            format!("/uploads/{}", name),
            name.to_string(),
            Some("text/plain".to_string()),
            10,
            ContentHash::of(name.as_bytes()),
        ));
    }

    #[tokio::test]
    async fn test_lists_only_the_organization_documents() {
        let repository = Arc::new(InMemoryDocumentRepository::default());
        let organization_id = Uuid::new_v4();
        seed(&repository, organization_id, "faq.txt");
        seed(&repository, organization_id, "prices.txt");
        seed(&repository, Uuid::new_v4(), "other.txt");
        let use_case = ListDocumentsUseCase::new(repository);

        let response = use_case
            .execute(ListDocumentsRequest {
                organization_id,
                skip: 1,
                limit: 20,
            })
            .await
            .unwrap();

        assert_eq!(response.total_count, 2);
        assert_eq!(response.documents.len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_bad_pagination() {
        let use_case = ListDocumentsUseCase::new(Arc::new(InMemoryDocumentRepository::default()));
        let organization_id = Uuid::new_v4();

        for (skip, limit) in [(-1, 20), (0, 0), (0, 1001)] {
            assert!(matches!(
                use_case
                    .execute(ListDocumentsRequest {
                        organization_id,
                        skip,
                        limit,
                    })
                    .await,
                Err(ListDocumentsError::ValidationError(_))
            ));
        }
    }
}
