use async_trait::async_trait;
use pgvector::Vector;

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("Embedding service unreachable: {0}")]
    Unavailable(String),
    #[error("Embedding service rejected the request: {0}")]
    Rejected(String),
    #[error("Nothing to embed")]
    EmptyInput,
    #[error("Expected {expected} vectors, got {got}")]
    CountMismatch { expected: usize, got: usize },
}

/// Chunks and live queries must be embedded by the same provider, otherwise
/// their vectors are not comparable.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed_query(&self, text: &str) -> Result<Vector, EmbeddingError>;

    /// One vector per passage, in input order.
    async fn embed_passages(&self, passages: &[String]) -> Result<Vec<Vector>, EmbeddingError>;
}
