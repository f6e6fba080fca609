use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{Conversation, Message};
use crate::domain::value_objects::Channel;

#[derive(Debug, thiserror::Error)]
pub enum ConversationRepositoryError {
    #[error("Conversation not found: {0}")]
    NotFound(Uuid),
    /// Another writer updated the row since it was loaded.
    #[error("Conversation {0} was modified concurrently")]
    Conflict(Uuid),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Everything one automated turn writes, applied as a single transaction.
#[derive(Debug, Clone)]
pub struct TurnRecord<'a> {
    /// State after the turn; its `version` is the one the caller loaded.
    pub conversation: &'a Conversation,
    pub messages: &'a [Message],
}

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Conversation>, ConversationRepositoryError>;

    /// The non-completed conversation for a channel thread, if any.
    async fn find_open_thread(
        &self,
        organization_id: Uuid,
        channel: Channel,
        external_thread_id: &str,
    ) -> Result<Option<Conversation>, ConversationRepositoryError>;

    /// Inserts the conversation and bumps the agent's conversation counter.
    /// When another writer opened the same thread first, that row is returned.
    async fn create(&self, conversation: &Conversation) -> Result<Conversation, ConversationRepositoryError>;

    /// Persists the messages, the conversation state and the agent message
    /// counter together. Fails with `Conflict` on a stale version.
    async fn record_turn(&self, turn: TurnRecord<'_>) -> Result<Conversation, ConversationRepositoryError>;

    /// Writes a status change guarded by the same version check.
    async fn update_status(&self, conversation: &Conversation) -> Result<Conversation, ConversationRepositoryError>;

    async fn messages(&self, conversation_id: Uuid) -> Result<Vec<Message>, ConversationRepositoryError>;

    /// The latest `limit` messages, oldest first.
    async fn recent_messages(
        &self,
        conversation_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Message>, ConversationRepositoryError>;
}
