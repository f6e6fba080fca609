use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{ContentHash, DocumentStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: Uuid,
    organization_id: Uuid,
    file_path: String,
    file_name: String,
    mime_type: Option<String>,
    file_size: i64,
    content_hash: ContentHash,
    extracted_text: Option<String>,
    word_count: i32,
    page_count: i32,
    status: DocumentStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(
        organization_id: Uuid,
        file_path: String,
        file_name: String,
        mime_type: Option<String>,
        file_size: i64,
        content_hash: ContentHash,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            organization_id,
            file_path,
            file_name,
            mime_type,
            file_size,
            content_hash,
            extracted_text: None,
            word_count: 0,
            page_count: 0,
            status: DocumentStatus::Uploaded,
            created_at: now,
            updated_at: now,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: Uuid,
        organization_id: Uuid,
        file_path: String,
        file_name: String,
        mime_type: Option<String>,
        file_size: i64,
        content_hash: ContentHash,
        extracted_text: Option<String>,
        word_count: i32,
        page_count: i32,
        status: DocumentStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            organization_id,
            file_path,
            file_name,
            mime_type,
            file_size,
            content_hash,
            extracted_text,
            word_count,
            page_count,
            status,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn organization_id(&self) -> Uuid {
        self.organization_id
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn file_size(&self) -> i64 {
        self.file_size
    }

    pub fn content_hash(&self) -> &ContentHash {
        &self.content_hash
    }

    pub fn extracted_text(&self) -> Option<&str> {
        self.extracted_text.as_deref()
    }

    pub fn word_count(&self) -> i32 {
        self.word_count
    }

    pub fn page_count(&self) -> i32 {
        self.page_count
    }

    pub fn status(&self) -> &DocumentStatus {
        &self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn start_processing(&mut self) -> Result<(), String> {
        self.transition(DocumentStatus::Processing)
    }

    pub fn complete_processing(
        &mut self,
        extracted_text: String,
        word_count: i32,
        page_count: i32,
    ) -> Result<(), String> {
        self.transition(DocumentStatus::Completed)?;
        self.extracted_text = Some(extracted_text);
        self.word_count = word_count;
        self.page_count = page_count;
        Ok(())
    }

    pub fn fail_processing(&mut self, error: String) -> Result<(), String> {
        self.transition(DocumentStatus::Failed(error))
    }

    /// Whether an ingestion run may take this document. A `processing` row
    /// untouched since `stale_before` was left behind by a dead worker.
    pub fn is_claimable(&self, stale_before: DateTime<Utc>) -> bool {
        !self.status.is_processing() || self.updated_at < stale_before
    }

    /// Moves the document into `processing` for a new run, taking over a
    /// stale run if there is one.
    pub fn claim_processing(&mut self, stale_before: DateTime<Utc>) -> Result<(), String> {
        if !self.is_claimable(stale_before) {
            return Err(format!("Document {} is already being processed", self.id));
        }
        if self.status.is_processing() {
            self.updated_at = Utc::now();
            return Ok(());
        }
        self.start_processing()
    }

    fn transition(&mut self, next: DocumentStatus) -> Result<(), String> {
        if !self.status.can_transition_to(&next) {
            return Err(format!(
                "Document {} cannot move from {} to {}",
                self.id, self.status, next
            ));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> Document {
        Document::new(
            Uuid::new_v4(),
            "/uploads/abc".to_string(),
            "faq.pdf".to_string(),
            Some("application/pdf".to_string()),
            1024,
            ContentHash::of(b"faq"),
        )
    }

    #[test]
    fn test_document_creation() {
        let document = document();
        assert_eq!(document.file_name(), "faq.pdf");
        assert_eq!(document.status(), &DocumentStatus::Uploaded);
        assert!(document.is_claimable(Utc::now()));
    }

    #[test]
    fn test_processing_workflow() {
        let mut document = document();
        document.start_processing().unwrap();
        assert!(!document.is_claimable(document.updated_at()));

        document
            .complete_processing("some text".to_string(), 2, 1)
            .unwrap();
        assert_eq!(document.status(), &DocumentStatus::Completed);
        assert_eq!(document.word_count(), 2);
        assert_eq!(document.page_count(), 1);
    }

    #[test]
    fn test_failure_and_reprocess() {
        let mut document = document();
        document.start_processing().unwrap();
        document
            .fail_processing("Unsupported format: image/png".to_string())
            .unwrap();
        assert_eq!(
            document.status().error_message(),
            Some("Unsupported format: image/png")
        );

        assert!(document.start_processing().is_ok());
    }

    #[test]
    fn test_claim_takes_over_only_stale_runs() {
        let mut document = document();
        let long_ago = document.updated_at() - chrono::Duration::minutes(10);
        document.claim_processing(long_ago).unwrap();
        assert!(document.status().is_processing());

        assert!(document.claim_processing(long_ago).is_err());

        let started = document.updated_at();
        let later = started + chrono::Duration::seconds(1);
        document.claim_processing(later).unwrap();
        assert!(document.status().is_processing());
        assert!(document.updated_at() >= started);
    }

    #[test]
    fn test_cannot_complete_without_processing() {
        let mut document = document();
        assert!(document.complete_processing(String::new(), 0, 0).is_err());
    }
}
