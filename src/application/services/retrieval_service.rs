use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::application::ports::EmbeddingProvider;
use crate::domain::entities::DocumentChunk;
use crate::domain::repositories::ChunkRepository;
use crate::domain::value_objects::similarity::cosine_similarity;

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("Embedding error: {0}")]
    EmbeddingError(String),
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    pub chunk_id: Uuid,
    pub document_id: Uuid,
    pub chunk_text: String,
    pub similarity: f32,
}

pub struct RetrievalService {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    chunk_repository: Arc<dyn ChunkRepository>,
}

impl RetrievalService {
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        chunk_repository: Arc<dyn ChunkRepository>,
    ) -> Self {
        Self {
            embedding_provider,
            chunk_repository,
        }
    }

    /// Top `k` chunks of the organization by cosine similarity to the query.
    /// An organization without chunks yields an empty list.
    pub async fn search(
        &self,
        query: &str,
        organization_id: Uuid,
        k: usize,
    ) -> Result<Vec<RetrievedChunk>, RetrievalError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let chunks = self
            .chunk_repository
            .find_by_organization(organization_id)
            .await
            .map_err(|e| RetrievalError::RepositoryError(e.to_string()))?;

        if chunks.is_empty() {
            debug!(organization_id = %organization_id, "No chunks to search");
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embedding_provider
            .embed_query(query)
            .await
            .map_err(|e| RetrievalError::EmbeddingError(e.to_string()))?;

        Ok(rank_chunks(query_embedding.as_slice(), &chunks, k))
    }
}

/// Brute-force ranking. `chunks` must be in insertion order; the stable sort
/// keeps that order among equal scores.
pub fn rank_chunks(query: &[f32], chunks: &[DocumentChunk], k: usize) -> Vec<RetrievedChunk> {
    let mut scored: Vec<RetrievedChunk> = chunks
        .iter()
        .map(|chunk| {
            let similarity = cosine_similarity(query, chunk.embedding().as_slice());
            RetrievedChunk {
                chunk_id: chunk.id(),
                document_id: chunk.document_id(),
                chunk_text: chunk.chunk_text().to_string(),
                similarity: if similarity.is_nan() { 0.0 } else { similarity },
            }
        })
        .collect();

    scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    scored.truncate(k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryChunkRepository, StubEmbeddingProvider};
    use pgvector::Vector;
    use proptest::prelude::*;

    fn chunk(text: &str, embedding: Vec<f32>) -> DocumentChunk {
        DocumentChunk::new(Uuid::new_v4(), Uuid::new_v4(), 0, text.to_string(), Vector::from(embedding))
    }

    #[test]
    fn test_rank_orders_by_similarity() {
        let chunks = vec![
            chunk("far", vec![0.0, 1.0]),
            chunk("exact", vec![1.0, 0.0]),
            chunk("close", vec![0.9, 0.1]),
        ];

        let ranked = rank_chunks(&[1.0, 0.0], &chunks, 2);
        let texts: Vec<&str> = ranked.iter().map(|r| r.chunk_text.as_str()).collect();
        assert_eq!(texts, vec!["exact", "close"]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let chunks = vec![
            chunk("first", vec![1.0, 1.0]),
            chunk("second", vec![1.0, 1.0]),
            chunk("zero", vec![0.0, 0.0]),
        ];

        let ranked = rank_chunks(&[1.0, 1.0], &chunks, 3);
        assert_eq!(ranked[0].chunk_text, "first");
        assert_eq!(ranked[1].chunk_text, "second");
        assert_eq!(ranked[2].similarity, 0.0);
    }

    #[tokio::test]
    async fn test_empty_organization_returns_nothing() {
        let service = RetrievalService::new(
            Arc::new(StubEmbeddingProvider::default()),
            Arc::new(InMemoryChunkRepository::default()),
        );

        let results = service.search("refund", Uuid::new_v4(), 3).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_is_scoped_to_organization() {
        let repository = Arc::new(InMemoryChunkRepository::default());
        let organization_id = Uuid::new_v4();
        let document_id = Uuid::new_v4();
        repository.insert(DocumentChunk::new(
            document_id,
            organization_id,
            0,
            "ours".to_string(),
            Vector::from(vec![1.0, 0.0, 0.0]),
        ));
        repository.insert(DocumentChunk::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            0,
            "theirs".to_string(),
            Vector::from(vec![1.0, 0.0, 0.0]),
        ));

        let service = RetrievalService::new(
            Arc::new(StubEmbeddingProvider::fixed(vec![1.0, 0.0, 0.0])),
            repository,
        );

        let results = service.search("anything", organization_id, 3).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document_id, document_id);
        assert!((results[0].similarity - 1.0).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn ranking_is_bounded_and_sorted(
            vectors in prop::collection::vec(prop::collection::vec(-1.0f32..1.0, 3), 0..20),
            query in prop::collection::vec(-1.0f32..1.0, 3),
            k in 0usize..6,
        ) {
            let chunks: Vec<DocumentChunk> = vectors
                .into_iter()
                .enumerate()
                .map(|(i, v)| chunk(&i.to_string(), v))
                .collect();

            let ranked = rank_chunks(&query, &chunks, k);

            prop_assert!(ranked.len() <= k);
            prop_assert_eq!(ranked.len(), k.min(chunks.len()));
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].similarity >= pair[1].similarity);
                if pair[0].similarity == pair[1].similarity {
                    let a: usize = pair[0].chunk_text.parse().unwrap();
                    let b: usize = pair[1].chunk_text.parse().unwrap();
                    prop_assert!(a < b);
                }
            }
        }
    }
}
