use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::Document;
use crate::domain::repositories::{DocumentRepository, document_repository::DocumentRepositoryError};
use crate::domain::value_objects::DocumentStatus;
use crate::infrastructure::database::models::{DocumentModel, NewDocumentModel};
use crate::infrastructure::database::schema::documents::dsl::*;
use crate::infrastructure::database::{DatabaseError, DbPool, with_connection};

impl From<DatabaseError> for DocumentRepositoryError {
    fn from(error: DatabaseError) -> Self {
        DocumentRepositoryError::DatabaseError(error.to_string())
    }
}

fn to_domain(model: DocumentModel) -> Result<Document, DocumentRepositoryError> {
    Document::try_from(model).map_err(DocumentRepositoryError::ValidationError)
}

pub struct PostgresDocumentRepository {
    pool: DbPool,
}

impl PostgresDocumentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for PostgresDocumentRepository {
    async fn save(&self, document: &Document) -> Result<(), DocumentRepositoryError> {
        let new_document = NewDocumentModel::from(document);

        with_connection(&self.pool, move |conn| {
            diesel::insert_into(documents)
                .values(&new_document)
                .execute(conn)
                .map_err(|e| DocumentRepositoryError::DatabaseError(e.to_string()))?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, document_id: Uuid) -> Result<Option<Document>, DocumentRepositoryError> {
        with_connection(&self.pool, move |conn| {
            let result = documents
                .find(document_id)
                .select(DocumentModel::as_select())
                .first(conn)
                .optional()
                .map_err(|e| DocumentRepositoryError::DatabaseError(e.to_string()))?;

            result.map(to_domain).transpose()
        })
        .await
    }

    async fn find_by_hash(
        &self,
        org_id: Uuid,
        hash: &str,
    ) -> Result<Option<Document>, DocumentRepositoryError> {
        let hash = hash.to_string();

        with_connection(&self.pool, move |conn| {
            let result = documents
                .filter(organization_id.eq(org_id))
                .filter(content_hash.eq(hash))
                .select(DocumentModel::as_select())
                .first(conn)
                .optional()
                .map_err(|e| DocumentRepositoryError::DatabaseError(e.to_string()))?;

            result.map(to_domain).transpose()
        })
        .await
    }

    async fn find_by_organization(
        &self,
        org_id: Uuid,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Document>, DocumentRepositoryError> {
        with_connection(&self.pool, move |conn| {
            let models = documents
                .filter(organization_id.eq(org_id))
                .order(created_at.desc())
                .offset(skip)
                .limit(limit)
                .select(DocumentModel::as_select())
                .load(conn)
                .map_err(|e| DocumentRepositoryError::DatabaseError(e.to_string()))?;

            models.into_iter().map(to_domain).collect()
        })
        .await
    }

    async fn count_by_organization(&self, org_id: Uuid) -> Result<i64, DocumentRepositoryError> {
        with_connection(&self.pool, move |conn| {
            documents
                .filter(organization_id.eq(org_id))
                .count()
                .get_result(conn)
                .map_err(|e| DocumentRepositoryError::DatabaseError(e.to_string()))
        })
        .await
    }

    async fn update(&self, document: &Document) -> Result<(), DocumentRepositoryError> {
        let document_id = document.id();
        let changes = NewDocumentModel::from(document);

        with_connection(&self.pool, move |conn| {
            let updated = diesel::update(documents.find(document_id))
                .set(&changes)
                .execute(conn)
                .map_err(|e| DocumentRepositoryError::DatabaseError(e.to_string()))?;

            if updated == 0 {
                return Err(DocumentRepositoryError::NotFound(document_id));
            }
            Ok(())
        })
        .await
    }

    async fn claim_for_processing(
        &self,
        document_id: Uuid,
        stale_before: DateTime<Utc>,
    ) -> Result<Option<Document>, DocumentRepositoryError> {
        let processing = DocumentStatus::Processing.as_str();

        with_connection(&self.pool, move |conn| {
            let claimed = diesel::update(
                documents
                    .find(document_id)
                    .filter(status.ne(processing).or(updated_at.lt(stale_before))),
            )
            .set((
                status.eq(processing),
                error_message.eq(None::<String>),
                updated_at.eq(Utc::now()),
            ))
            .returning(DocumentModel::as_returning())
            .get_result(conn)
            .optional()
            .map_err(|e| DocumentRepositoryError::DatabaseError(e.to_string()))?;

            claimed.map(to_domain).transpose()
        })
        .await
    }
}
