use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{Intent, SenderType};

/// One immutable turn of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: Uuid,
    conversation_id: Uuid,
    sender_type: SenderType,
    content: String,
    confidence: Option<f32>,
    intent: Option<Intent>,
    created_at: DateTime<Utc>,
}

impl Message {
    pub fn from_user(conversation_id: Uuid, content: String, intent: Option<Intent>) -> Self {
        Self::build(conversation_id, SenderType::User, content, None, intent)
    }

    pub fn from_agent(conversation_id: Uuid, content: String, confidence: f32) -> Self {
        Self::build(conversation_id, SenderType::Agent, content, Some(confidence), None)
    }

    /// Fixed agent text that was not produced by the model.
    pub fn notice(conversation_id: Uuid, content: String) -> Self {
        Self::build(conversation_id, SenderType::Agent, content, None, None)
    }

    pub fn restore(
        id: Uuid,
        conversation_id: Uuid,
        sender_type: SenderType,
        content: String,
        confidence: Option<f32>,
        intent: Option<Intent>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            conversation_id,
            sender_type,
            content,
            confidence,
            intent,
            created_at,
        }
    }

    fn build(
        conversation_id: Uuid,
        sender_type: SenderType,
        content: String,
        confidence: Option<f32>,
        intent: Option<Intent>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation_id,
            sender_type,
            content,
            confidence,
            intent,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn conversation_id(&self) -> Uuid {
        self.conversation_id
    }

    pub fn sender_type(&self) -> SenderType {
        self.sender_type
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn confidence(&self) -> Option<f32> {
        self.confidence
    }

    pub fn intent(&self) -> Option<Intent> {
        self.intent
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
