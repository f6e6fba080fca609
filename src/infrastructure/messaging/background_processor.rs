use std::sync::Arc;
use tracing::{error, info, warn};

use crate::application::use_cases::ProcessDocumentUseCase;
use crate::application::use_cases::process_document::ProcessDocumentError;
use crate::infrastructure::messaging::MpscJobQueueReceiver;

/// Worker pool draining the ingestion queue.
pub struct BackgroundProcessor {
    job_receiver: Arc<MpscJobQueueReceiver>,
    process_document: Arc<ProcessDocumentUseCase>,
    worker_count: usize,
}

impl BackgroundProcessor {
    pub fn new(job_receiver: Arc<MpscJobQueueReceiver>, process_document: Arc<ProcessDocumentUseCase>) -> Self {
        Self {
            job_receiver,
            process_document,
            worker_count: 3,
        }
    }

    pub fn with_worker_count(mut self, count: usize) -> Self {
        self.worker_count = count.max(1);
        self
    }

    /// Runs until the queue closes.
    pub async fn start(&self) {
        info!(workers = self.worker_count, "Starting background processor");

        let handles: Vec<_> = (0..self.worker_count)
            .map(|worker_id| {
                let receiver = self.job_receiver.clone();
                let process_document = self.process_document.clone();
                tokio::spawn(async move { worker_loop(worker_id, receiver, process_document).await })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            if let Err(e) = handle.await {
                error!(worker_id = i, error = %e, "Worker panicked");
            }
        }

        info!("Background processor stopped");
    }
}

async fn worker_loop(
    worker_id: usize,
    receiver: Arc<MpscJobQueueReceiver>,
    process_document: Arc<ProcessDocumentUseCase>,
) {
    info!(worker_id, "Worker started");

    while let Some(job) = receiver.recv().await {
        info!(worker_id, document_id = %job.document_id, "Processing ingestion job");

        match process_document.execute(job.document_id).await {
            Ok(response) => info!(
                worker_id,
                document_id = %job.document_id,
                chunks = response.chunks_created,
                processing_time_ms = response.processing_time_ms,
                "Document ingested"
            ),
            Err(ProcessDocumentError::AlreadyProcessing(id)) => {
                warn!(worker_id, document_id = %id, "Skipping job, document already in progress");
            }
            // The document itself records the failure
            Err(e) => warn!(worker_id, document_id = %job.document_id, error = %e, "Ingestion job failed"),
        }
    }

    info!(worker_id, "Worker stopped");
}
