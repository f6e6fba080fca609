use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::ports::{OrganizationDirectory, organization_directory::DirectoryError};
use crate::application::services::keyed_locks::KeyedLocks;
use crate::application::services::response_generator::{GenerationContext, ResponseGenerator};
use crate::domain::entities::{Conversation, Message, TurnVerdict};
use crate::domain::repositories::{
    ConversationRepository,
    conversation_repository::{ConversationRepositoryError, TurnRecord},
};
use crate::domain::value_objects::{Channel, ConversationStatus, EscalationPolicy, Intent};

const MAX_WRITE_ATTEMPTS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum ConversationServiceError {
    #[error("Conversation not found: {0}")]
    NotFound(Uuid),
    #[error("Conversation {0} is closed")]
    Closed(Uuid),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Directory error: {0}")]
    DirectoryError(String),
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

impl From<ConversationRepositoryError> for ConversationServiceError {
    fn from(error: ConversationRepositoryError) -> Self {
        match error {
            ConversationRepositoryError::NotFound(id) => ConversationServiceError::NotFound(id),
            other => ConversationServiceError::RepositoryError(other.to_string()),
        }
    }
}

impl From<DirectoryError> for ConversationServiceError {
    fn from(error: DirectoryError) -> Self {
        ConversationServiceError::DirectoryError(error.to_string())
    }
}

/// How one inbound user message was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Replied {
        conversation: Conversation,
        reply: String,
        confidence: f32,
    },
    /// This turn crossed the limit; `reply` is the handoff notice.
    Escalated { conversation: Conversation, reply: String },
    /// Already with a human: the message was stored, nothing is sent back.
    QueuedForHuman { conversation: Conversation },
    QuotaExceeded { conversation: Conversation, reply: String },
}

impl TurnOutcome {
    pub fn conversation(&self) -> &Conversation {
        match self {
            TurnOutcome::Replied { conversation, .. }
            | TurnOutcome::Escalated { conversation, .. }
            | TurnOutcome::QueuedForHuman { conversation }
            | TurnOutcome::QuotaExceeded { conversation, .. } => conversation,
        }
    }

    pub fn reply(&self) -> Option<&str> {
        match self {
            TurnOutcome::Replied { reply, .. }
            | TurnOutcome::Escalated { reply, .. }
            | TurnOutcome::QuotaExceeded { reply, .. } => Some(reply),
            TurnOutcome::QueuedForHuman { .. } => None,
        }
    }

    pub fn is_escalated(&self) -> bool {
        self.conversation().status() == ConversationStatus::Escalated
    }
}

/// Identifies the thread an inbound message belongs to.
#[derive(Debug, Clone)]
pub struct ThreadKey {
    pub organization_id: Uuid,
    pub agent_id: Uuid,
    pub channel: Channel,
    pub external_thread_id: String,
    pub customer_name: Option<String>,
}

/// The dialog loop: serializes turns per conversation, generates a reply,
/// applies the escalation rule and persists the turn atomically.
pub struct ConversationService {
    conversations: Arc<dyn ConversationRepository>,
    directory: Arc<dyn OrganizationDirectory>,
    generator: Arc<ResponseGenerator>,
    policy: EscalationPolicy,
    history_limit: i64,
    locks: KeyedLocks<Uuid>,
}

impl ConversationService {
    pub fn new(
        conversations: Arc<dyn ConversationRepository>,
        directory: Arc<dyn OrganizationDirectory>,
        generator: Arc<ResponseGenerator>,
        policy: EscalationPolicy,
        history_limit: i64,
    ) -> Self {
        Self {
            conversations,
            directory,
            generator,
            policy,
            history_limit,
            locks: KeyedLocks::new(),
        }
    }

    /// Returns the open conversation of a thread, creating it on first contact.
    pub async fn resolve_conversation(&self, key: ThreadKey) -> Result<Conversation, ConversationServiceError> {
        if let Some(existing) = self
            .conversations
            .find_open_thread(key.organization_id, key.channel, &key.external_thread_id)
            .await?
        {
            return Ok(existing);
        }

        let conversation = Conversation::new(
            key.organization_id,
            key.agent_id,
            key.channel,
            key.external_thread_id,
            key.customer_name,
        );
        let stored = self.conversations.create(&conversation).await?;
        if stored.id() == conversation.id() {
            info!(
                conversation_id = %stored.id(),
                channel = %stored.channel(),
                "Conversation started"
            );
        }
        Ok(stored)
    }

    pub async fn handle_turn(
        &self,
        conversation_id: Uuid,
        user_text: &str,
    ) -> Result<TurnOutcome, ConversationServiceError> {
        let _guard = self.locks.lock(conversation_id).await;
        let mut conversation = self.load(conversation_id).await?;

        if conversation.status() == ConversationStatus::Completed {
            return Err(ConversationServiceError::Closed(conversation_id));
        }

        let intent = Intent::detect(user_text);
        let user_message = Message::from_user(conversation_id, user_text.to_string(), intent);

        if conversation.is_escalated_to_human() {
            return self.queue_for_human(conversation, user_message).await;
        }

        let organization = self.directory.get_organization(conversation.organization_id()).await?;
        let language = organization.language;

        if !organization.can_send_message() {
            let reply = language.quota_notice().to_string();
            let messages = [user_message, Message::notice(conversation_id, reply.clone())];
            let conversation = self.write_turn(&conversation, &messages).await?;
            warn!(
                conversation_id = %conversation_id,
                organization_id = %organization.id,
                "Monthly message quota exhausted"
            );
            return Ok(TurnOutcome::QuotaExceeded { conversation, reply });
        }

        let agent = self.directory.get_agent(conversation.agent_id()).await?;
        let history = self
            .conversations
            .recent_messages(conversation_id, self.history_limit)
            .await?;

        let generated = self
            .generator
            .generate(
                GenerationContext {
                    organization_id: organization.id,
                    language,
                    agent: &agent,
                    history: &history,
                    intent,
                },
                user_text,
            )
            .await;

        let mut attempt = 0;
        let outcome = loop {
            attempt += 1;

            let mut next = conversation.clone();
            let verdict = next.record_agent_turn(generated.confidence, &self.policy);
            let reply = if verdict.is_escalated() {
                language.handoff_notice().to_string()
            } else {
                generated.text.clone()
            };
            let messages = [
                user_message.clone(),
                Message::from_agent(conversation_id, reply.clone(), generated.confidence),
            ];

            match self
                .conversations
                .record_turn(TurnRecord {
                    conversation: &next,
                    messages: &messages,
                })
                .await
            {
                Ok(saved) => {
                    break match verdict {
                        TurnVerdict::Escalated => {
                            info!(
                                conversation_id = %conversation_id,
                                unsuccessful_responses = saved.unsuccessful_responses(),
                                "Conversation escalated to a human"
                            );
                            TurnOutcome::Escalated {
                                conversation: saved,
                                reply,
                            }
                        }
                        TurnVerdict::Confident | TurnVerdict::LowConfidence { .. } => TurnOutcome::Replied {
                            conversation: saved,
                            reply,
                            confidence: generated.confidence,
                        },
                    };
                }
                Err(ConversationRepositoryError::Conflict(_)) if attempt < MAX_WRITE_ATTEMPTS => {
                    warn!(conversation_id = %conversation_id, attempt, "Concurrent update, retrying turn");
                    conversation = self.load(conversation_id).await?;
                    if conversation.is_escalated_to_human() {
                        return self.queue_for_human(conversation, user_message).await;
                    }
                }
                Err(e) => return Err(e.into()),
            }
        };

        if let Err(e) = self.directory.record_usage(organization.id, 1).await {
            warn!(organization_id = %organization.id, error = %e, "Failed to record usage");
        }

        Ok(outcome)
    }

    /// Hands the conversation to a human regardless of confidence.
    pub async fn escalate(&self, conversation_id: Uuid) -> Result<Conversation, ConversationServiceError> {
        self.transition(conversation_id, |conversation| conversation.escalate())
            .await
    }

    pub async fn complete(&self, conversation_id: Uuid) -> Result<Conversation, ConversationServiceError> {
        self.transition(conversation_id, |conversation| conversation.complete())
            .await
    }

    pub async fn get_with_messages(
        &self,
        conversation_id: Uuid,
    ) -> Result<(Conversation, Vec<Message>), ConversationServiceError> {
        let conversation = self.load(conversation_id).await?;
        let messages = self.conversations.messages(conversation_id).await?;
        Ok((conversation, messages))
    }

    async fn transition<F>(&self, conversation_id: Uuid, apply: F) -> Result<Conversation, ConversationServiceError>
    where
        F: Fn(&mut Conversation) -> Result<(), String>,
    {
        let _guard = self.locks.lock(conversation_id).await;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut conversation = self.load(conversation_id).await?;
            let before = conversation.status();
            apply(&mut conversation).map_err(ConversationServiceError::InvalidTransition)?;
            if conversation.status() == before {
                return Ok(conversation);
            }

            match self.conversations.update_status(&conversation).await {
                Ok(saved) => {
                    info!(
                        conversation_id = %conversation_id,
                        status = saved.status().as_str(),
                        "Conversation status changed"
                    );
                    return Ok(saved);
                }
                Err(ConversationRepositoryError::Conflict(_)) if attempt < MAX_WRITE_ATTEMPTS => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn queue_for_human(
        &self,
        conversation: Conversation,
        user_message: Message,
    ) -> Result<TurnOutcome, ConversationServiceError> {
        let conversation = self.write_turn(&conversation, &[user_message]).await?;
        info!(conversation_id = %conversation.id(), "Message queued for human agent");
        Ok(TurnOutcome::QueuedForHuman { conversation })
    }

    async fn write_turn(
        &self,
        conversation: &Conversation,
        messages: &[Message],
    ) -> Result<Conversation, ConversationServiceError> {
        let mut current = conversation.clone();
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self
                .conversations
                .record_turn(TurnRecord {
                    conversation: &current,
                    messages,
                })
                .await
            {
                Ok(saved) => return Ok(saved),
                Err(ConversationRepositoryError::Conflict(_)) if attempt < MAX_WRITE_ATTEMPTS => {
                    current = self.load(conversation.id()).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn load(&self, conversation_id: Uuid) -> Result<Conversation, ConversationServiceError> {
        self.conversations
            .find_by_id(conversation_id)
            .await?
            .ok_or(ConversationServiceError::NotFound(conversation_id))
    }
}
