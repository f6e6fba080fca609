use async_trait::async_trait;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::DocumentChunk;
use crate::domain::repositories::{ChunkRepository, chunk_repository::ChunkRepositoryError};
use crate::infrastructure::database::models::{DocumentChunkModel, NewDocumentChunkModel};
use crate::infrastructure::database::schema::document_chunks::dsl::*;
use crate::infrastructure::database::{DatabaseError, DbPool, with_connection};

impl From<DatabaseError> for ChunkRepositoryError {
    fn from(error: DatabaseError) -> Self {
        ChunkRepositoryError::DatabaseError(error.to_string())
    }
}

impl From<diesel::result::Error> for ChunkRepositoryError {
    fn from(error: diesel::result::Error) -> Self {
        ChunkRepositoryError::DatabaseError(error.to_string())
    }
}

pub struct PostgresChunkRepository {
    pool: DbPool,
}

impl PostgresChunkRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChunkRepository for PostgresChunkRepository {
    async fn replace_for_document(
        &self,
        doc_id: Uuid,
        chunks: &[DocumentChunk],
    ) -> Result<usize, ChunkRepositoryError> {
        let new_chunks: Vec<NewDocumentChunkModel> =
            chunks.iter().map(NewDocumentChunkModel::from).collect();

        with_connection(&self.pool, move |conn| {
            conn.transaction::<_, ChunkRepositoryError, _>(|conn| {
                let removed = diesel::delete(document_chunks.filter(document_id.eq(doc_id))).execute(conn)?;
                // Rows are inserted in chunk order so `seq` follows it
                let inserted = if new_chunks.is_empty() {
                    0
                } else {
                    diesel::insert_into(document_chunks)
                        .values(&new_chunks)
                        .execute(conn)?
                };

                tracing::debug!(document_id = %doc_id, removed, inserted, "Replaced document chunks");
                Ok(inserted)
            })
        })
        .await
    }

    async fn find_by_organization(&self, org_id: Uuid) -> Result<Vec<DocumentChunk>, ChunkRepositoryError> {
        with_connection(&self.pool, move |conn| {
            let models = document_chunks
                .filter(organization_id.eq(org_id))
                .order(seq.asc())
                .select(DocumentChunkModel::as_select())
                .load(conn)?;

            Ok(models.into_iter().map(DocumentChunk::from).collect())
        })
        .await
    }

    async fn find_by_document_paginated(
        &self,
        doc_id: Uuid,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<DocumentChunk>, ChunkRepositoryError> {
        with_connection(&self.pool, move |conn| {
            let models = document_chunks
                .filter(document_id.eq(doc_id))
                .order(chunk_index.asc())
                .offset(skip)
                .limit(limit)
                .select(DocumentChunkModel::as_select())
                .load(conn)?;

            Ok(models.into_iter().map(DocumentChunk::from).collect())
        })
        .await
    }

    async fn count_by_document(&self, doc_id: Uuid) -> Result<i64, ChunkRepositoryError> {
        with_connection(&self.pool, move |conn| {
            Ok(document_chunks
                .filter(document_id.eq(doc_id))
                .count()
                .get_result(conn)?)
        })
        .await
    }
}
