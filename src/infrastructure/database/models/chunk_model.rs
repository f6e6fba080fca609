use chrono::{DateTime, Utc};
use diesel::prelude::*;
use pgvector::Vector;
use uuid::Uuid;

use crate::domain::entities::DocumentChunk as DomainChunk;
use crate::infrastructure::database::schema::document_chunks;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(belongs_to(super::DocumentModel, foreign_key = document_id))]
#[diesel(table_name = document_chunks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DocumentChunkModel {
    pub id: Uuid,
    pub seq: i64,
    pub document_id: Uuid,
    pub organization_id: Uuid,
    pub chunk_index: i32,
    pub chunk_text: String,
    pub word_count: i32,
    pub embedding: Vector,
    pub created_at: DateTime<Utc>,
}

/// `seq` is left to the database so it follows insertion order.
#[derive(Debug, Insertable)]
#[diesel(table_name = document_chunks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewDocumentChunkModel {
    pub id: Uuid,
    pub document_id: Uuid,
    pub organization_id: Uuid,
    pub chunk_index: i32,
    pub chunk_text: String,
    pub word_count: i32,
    pub embedding: Vector,
    pub created_at: DateTime<Utc>,
}

impl From<&DomainChunk> for NewDocumentChunkModel {
    fn from(chunk: &DomainChunk) -> Self {
        Self {
            id: chunk.id(),
            document_id: chunk.document_id(),
            organization_id: chunk.organization_id(),
            chunk_index: chunk.chunk_index(),
            chunk_text: chunk.chunk_text().to_string(),
            word_count: chunk.word_count(),
            embedding: chunk.embedding().clone(),
            created_at: chunk.created_at(),
        }
    }
}

impl From<DocumentChunkModel> for DomainChunk {
    fn from(model: DocumentChunkModel) -> Self {
        DomainChunk::restore(
            model.id,
            model.document_id,
            model.organization_id,
            model.chunk_index,
            model.chunk_text,
            model.word_count,
            model.embedding,
            model.created_at,
        )
    }
}
