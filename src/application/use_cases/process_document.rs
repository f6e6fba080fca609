use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};
use uuid::Uuid;

use crate::application::ports::{JobQueue, job_queue::IngestionJob};
use crate::application::services::DocumentProcessorService;
use crate::domain::entities::Document;
use crate::domain::repositories::{DocumentRepository, document_repository::DocumentRepositoryError};

#[derive(Debug, thiserror::Error)]
pub enum ProcessDocumentError {
    #[error("Document not found: {0}")]
    DocumentNotFound(Uuid),
    #[error("Repository error: {0}")]
    RepositoryError(String),
    #[error("Processing error: {0}")]
    ProcessingError(String),
    #[error("Document not processable: {0}")]
    DocumentNotProcessable(String),
    #[error("Document {0} is already being processed")]
    AlreadyProcessing(Uuid),
    #[error("Queue error: {0}")]
    QueueError(String),
}

impl From<DocumentRepositoryError> for ProcessDocumentError {
    fn from(error: DocumentRepositoryError) -> Self {
        match error {
            DocumentRepositoryError::NotFound(id) => ProcessDocumentError::DocumentNotFound(id),
            _ => ProcessDocumentError::RepositoryError(error.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProcessDocumentResponse {
    pub chunks_created: usize,
    pub processing_time_ms: u64,
}

/// `ingest(document)`: runs extraction and chunk replacement for one
/// document. The document row is claimed before work starts, so at most one
/// run holds it until that run goes quiet for longer than `stale_after`.
pub struct ProcessDocumentUseCase {
    document_repository: Arc<dyn DocumentRepository>,
    document_processor: Arc<DocumentProcessorService>,
    job_queue: Arc<dyn JobQueue>,
    stale_after: Duration,
}

impl ProcessDocumentUseCase {
    pub fn new(
        document_repository: Arc<dyn DocumentRepository>,
        document_processor: Arc<DocumentProcessorService>,
        job_queue: Arc<dyn JobQueue>,
        stale_after: Duration,
    ) -> Self {
        Self {
            document_repository,
            document_processor,
            job_queue,
            stale_after,
        }
    }

    pub async fn execute(&self, document_id: Uuid) -> Result<ProcessDocumentResponse, ProcessDocumentError> {
        let start_time = Instant::now();

        let mut document = match self
            .document_repository
            .claim_for_processing(document_id, self.stale_before())
            .await?
        {
            Some(document) => document,
            None => {
                // Distinguish a held claim from a missing row
                self.load(document_id).await?;
                return Err(ProcessDocumentError::AlreadyProcessing(document_id));
            }
        };

        match self.document_processor.process_document(&document).await {
            Ok(report) => {
                document
                    .complete_processing(report.text, report.word_count, report.page_count)
                    .map_err(ProcessDocumentError::ProcessingError)?;
                self.document_repository.update(&document).await?;

                Ok(ProcessDocumentResponse {
                    chunks_created: report.chunks_created,
                    processing_time_ms: start_time.elapsed().as_millis() as u64,
                })
            }
            Err(e) => {
                error!(document_id = %document_id, error = %e, "Document ingestion failed");
                document
                    .fail_processing(e.to_string())
                    .map_err(ProcessDocumentError::ProcessingError)?;
                self.document_repository.update(&document).await?;

                Err(ProcessDocumentError::ProcessingError(e.to_string()))
            }
        }
    }

    /// Queues a completed or failed document for another ingestion run.
    pub async fn schedule_reprocess(&self, document_id: Uuid) -> Result<Document, ProcessDocumentError> {
        let document = self.load(document_id).await?;

        if !document.is_claimable(self.stale_before()) {
            return Err(ProcessDocumentError::AlreadyProcessing(document_id));
        }

        self.job_queue
            .enqueue(IngestionJob {
                document_id,
                organization_id: document.organization_id(),
            })
            .await
            .map_err(|e| ProcessDocumentError::QueueError(e.to_string()))?;

        info!(document_id = %document_id, "Document queued for reprocessing");
        Ok(document)
    }

    fn stale_before(&self) -> DateTime<Utc> {
        chrono::Duration::from_std(self.stale_after)
            .ok()
            .and_then(|age| Utc::now().checked_sub_signed(age))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    async fn load(&self, document_id: Uuid) -> Result<Document, ProcessDocumentError> {
        self.document_repository
            .find_by_id(document_id)
            .await?
            .ok_or(ProcessDocumentError::DocumentNotFound(document_id))
    }
}
