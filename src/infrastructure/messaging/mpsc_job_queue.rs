use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, mpsc};

use crate::application::ports::job_queue::{IngestionJob, JobQueue, JobQueueError};

/// In-process ingestion queue. The sending half is the `JobQueue` port;
/// the receiving half is shared by the worker pool.
pub struct MpscJobQueue {
    sender: mpsc::UnboundedSender<IngestionJob>,
    pending: Arc<AtomicUsize>,
}

pub struct MpscJobQueueReceiver {
    receiver: Mutex<mpsc::UnboundedReceiver<IngestionJob>>,
    pending: Arc<AtomicUsize>,
}

impl MpscJobQueue {
    pub fn create_pair() -> (Self, MpscJobQueueReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));

        (
            Self {
                sender,
                pending: pending.clone(),
            },
            MpscJobQueueReceiver {
                receiver: Mutex::new(receiver),
                pending,
            },
        )
    }
}

#[async_trait]
impl JobQueue for MpscJobQueue {
    async fn enqueue(&self, job: IngestionJob) -> Result<(), JobQueueError> {
        self.pending.fetch_add(1, Ordering::SeqCst);

        if self.sender.send(job).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            return Err(JobQueueError::Closed);
        }

        Ok(())
    }

    async fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

impl MpscJobQueueReceiver {
    /// Next job, or `None` once every sender is gone.
    pub async fn recv(&self) -> Option<IngestionJob> {
        let job = {
            let mut receiver = self.receiver.lock().await;
            receiver.recv().await
        };

        if job.is_some() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
        }
        job
    }
}
