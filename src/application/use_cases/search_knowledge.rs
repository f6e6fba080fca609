use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::application::services::RetrievalService;
use crate::application::services::retrieval_service::RetrievedChunk;

#[derive(Debug, thiserror::Error)]
pub enum SearchKnowledgeError {
    #[error("Search error: {0}")]
    SearchError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct SearchKnowledgeRequest {
    pub organization_id: Uuid,
    pub query: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct SearchKnowledgeResponse {
    pub query: String,
    pub results: Vec<RetrievedChunk>,
    pub search_time_ms: u64,
}

pub struct SearchKnowledgeUseCase {
    retrieval: Arc<RetrievalService>,
    default_limit: usize,
}

impl SearchKnowledgeUseCase {
    pub fn new(retrieval: Arc<RetrievalService>, default_limit: usize) -> Self {
        Self {
            retrieval,
            default_limit,
        }
    }

    pub async fn execute(
        &self,
        request: SearchKnowledgeRequest,
    ) -> Result<SearchKnowledgeResponse, SearchKnowledgeError> {
        let start_time = Instant::now();

        if request.query.trim().is_empty() {
            return Err(SearchKnowledgeError::ValidationError(
                "Query cannot be empty".to_string(),
            ));
        }

        let limit = request.limit.unwrap_or(self.default_limit);
        if limit == 0 || limit > 100 {
            return Err(SearchKnowledgeError::ValidationError(
                "Limit must be between 1 and 100".to_string(),
            ));
        }

        let results = self
            .retrieval
            .search(&request.query, request.organization_id, limit)
            .await
            .map_err(|e| SearchKnowledgeError::SearchError(e.to_string()))?;

        Ok(SearchKnowledgeResponse {
            query: request.query,
            results,
            search_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryChunkRepository, StubEmbeddingProvider};

    fn use_case() -> SearchKnowledgeUseCase {
        let retrieval = RetrievalService::new(
            Arc::new(StubEmbeddingProvider::default()),
            Arc::new(InMemoryChunkRepository::default()),
        );
        SearchKnowledgeUseCase::new(Arc::new(retrieval), 3)
    }

    fn request(query: &str, limit: Option<usize>) -> SearchKnowledgeRequest {
        SearchKnowledgeRequest {
            organization_id: Uuid::new_v4(),
            query: query.to_string(),
            limit,
        }
    }

    #[tokio::test]
    async fn test_validation() {
        let use_case = use_case();

        assert!(matches!(
            use_case.execute(request("   ", None)).await,
            Err(SearchKnowledgeError::ValidationError(_))
        ));
        assert!(matches!(
            use_case.execute(request("delivery", Some(0))).await,
            Err(SearchKnowledgeError::ValidationError(_))
        ));
        assert!(matches!(
            use_case.execute(request("delivery", Some(101))).await,
            Err(SearchKnowledgeError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_organization_returns_no_results() {
        let response = use_case().execute(request("delivery", None)).await.unwrap();
        assert!(response.results.is_empty());
    }
}
