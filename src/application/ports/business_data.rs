use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::value_objects::Intent;

#[derive(Debug, Clone, thiserror::Error)]
pub enum BusinessDataError {
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("API error: {0}")]
    ApiError(String),
}

/// Optional real-time data (orders, stock, catalogue) used to enrich prompts.
#[async_trait]
pub trait BusinessDataSource: Send + Sync {
    /// `Ok(None)` means the source has nothing relevant.
    async fn lookup(
        &self,
        organization_id: Uuid,
        intent: Intent,
        user_text: &str,
    ) -> Result<Option<String>, BusinessDataError>;
}
