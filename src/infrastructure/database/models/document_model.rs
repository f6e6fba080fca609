use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::Document as DomainDocument;
use crate::domain::value_objects::{ContentHash, DocumentStatus};
use crate::infrastructure::database::schema::documents;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Identifiable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DocumentModel {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub file_path: String,
    pub file_name: String,
    pub mime_type: Option<String>,
    pub file_size: i64,
    pub content_hash: String,
    pub extracted_text: Option<String>,
    pub word_count: i32,
    pub page_count: i32,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct NewDocumentModel {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub file_path: String,
    pub file_name: String,
    pub mime_type: Option<String>,
    pub file_size: i64,
    pub content_hash: String,
    pub extracted_text: Option<String>,
    pub word_count: i32,
    pub page_count: i32,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&DomainDocument> for NewDocumentModel {
    fn from(document: &DomainDocument) -> Self {
        Self {
            id: document.id(),
            organization_id: document.organization_id(),
            file_path: document.file_path().to_string(),
            file_name: document.file_name().to_string(),
            mime_type: document.mime_type().map(str::to_string),
            file_size: document.file_size(),
            content_hash: document.content_hash().as_str().to_string(),
            extracted_text: document.extracted_text().map(str::to_string),
            word_count: document.word_count(),
            page_count: document.page_count(),
            status: document.status().as_str().to_string(),
            error_message: document.status().error_message().map(str::to_string),
            created_at: document.created_at(),
            updated_at: document.updated_at(),
        }
    }
}

impl TryFrom<DocumentModel> for DomainDocument {
    type Error = String;

    fn try_from(model: DocumentModel) -> Result<Self, Self::Error> {
        let content_hash = ContentHash::new(model.content_hash)
            .map_err(|e| format!("Invalid content hash: {}", e))?;
        let status = DocumentStatus::from_parts(&model.status, model.error_message)?;

        Ok(DomainDocument::restore(
            model.id,
            model.organization_id,
            model.file_path,
            model.file_name,
            model.mime_type,
            model.file_size,
            content_hash,
            model.extracted_text,
            model.word_count,
            model.page_count,
            status,
            model.created_at,
            model.updated_at,
        ))
    }
}
