use async_trait::async_trait;

use crate::domain::entities::CallSession;

#[derive(Debug, thiserror::Error)]
pub enum CallSessionRepositoryError {
    #[error("Call session not found: {0}")]
    NotFound(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[async_trait]
pub trait CallSessionRepository: Send + Sync {
    async fn save(&self, session: &CallSession) -> Result<(), CallSessionRepositoryError>;
    async fn find_by_call_sid(&self, call_sid: &str) -> Result<Option<CallSession>, CallSessionRepositoryError>;
    async fn update(&self, session: &CallSession) -> Result<(), CallSessionRepositoryError>;
}
