use async_trait::async_trait;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum JobQueueError {
    #[error("Job queue is closed")]
    Closed,
}

/// A request to (re)build the chunks of one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionJob {
    pub document_id: Uuid,
    pub organization_id: Uuid,
}

#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, job: IngestionJob) -> Result<(), JobQueueError>;

    /// Jobs accepted but not yet picked up by a worker.
    async fn pending(&self) -> usize;
}
