use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{AgentProfile, ChannelIntegration, Organization};
use crate::domain::value_objects::Channel;

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Organization not found: {0}")]
    OrganizationNotFound(Uuid),
    #[error("Agent not found: {0}")]
    AgentNotFound(Uuid),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Read side of account management plus the usage counter it owns.
#[async_trait]
pub trait OrganizationDirectory: Send + Sync {
    async fn get_organization(&self, id: Uuid) -> Result<Organization, DirectoryError>;

    async fn get_agent(&self, id: Uuid) -> Result<AgentProfile, DirectoryError>;

    /// Integration owning `account_id` on `channel`, active or not.
    async fn find_integration(
        &self,
        channel: Channel,
        account_id: &str,
    ) -> Result<Option<ChannelIntegration>, DirectoryError>;

    async fn find_integration_by_id(&self, id: Uuid) -> Result<Option<ChannelIntegration>, DirectoryError>;

    /// True when any active integration on `channel` uses `token` as its
    /// webhook verify token.
    async fn verify_token_matches(&self, channel: Channel, token: &str) -> Result<bool, DirectoryError>;

    async fn record_usage(&self, organization_id: Uuid, messages: i64) -> Result<(), DirectoryError>;
}
