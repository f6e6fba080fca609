use chrono::{DateTime, Utc};
use pgvector::Vector;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A window of a document's text plus its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    id: Uuid,
    document_id: Uuid,
    organization_id: Uuid,
    chunk_index: i32,
    chunk_text: String,
    word_count: i32,
    embedding: Vector,
    created_at: DateTime<Utc>,
}

impl DocumentChunk {
    pub fn new(
        document_id: Uuid,
        organization_id: Uuid,
        chunk_index: i32,
        chunk_text: String,
        embedding: Vector,
    ) -> Self {
        let word_count = chunk_text.split_whitespace().count() as i32;
        Self {
            id: Uuid::new_v4(),
            document_id,
            organization_id,
            chunk_index,
            chunk_text,
            word_count,
            embedding,
            created_at: Utc::now(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: Uuid,
        document_id: Uuid,
        organization_id: Uuid,
        chunk_index: i32,
        chunk_text: String,
        word_count: i32,
        embedding: Vector,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            document_id,
            organization_id,
            chunk_index,
            chunk_text,
            word_count,
            embedding,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn document_id(&self) -> Uuid {
        self.document_id
    }

    pub fn organization_id(&self) -> Uuid {
        self.organization_id
    }

    pub fn chunk_index(&self) -> i32 {
        self.chunk_index
    }

    pub fn chunk_text(&self) -> &str {
        &self.chunk_text
    }

    pub fn word_count(&self) -> i32 {
        self.word_count
    }

    pub fn embedding(&self) -> &Vector {
        &self.embedding
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn dimension(&self) -> usize {
        self.embedding.as_slice().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_creation() {
        let document_id = Uuid::new_v4();
        let chunk = DocumentChunk::new(
            document_id,
            Uuid::new_v4(),
            0,
            "Refunds are processed within seven days".to_string(),
            Vector::from(vec![0.1, 0.2, 0.3]),
        );

        assert_eq!(chunk.document_id(), document_id);
        assert_eq!(chunk.word_count(), 6);
        assert_eq!(chunk.dimension(), 3);
    }
}
