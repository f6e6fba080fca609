use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::entities::{Conversation as DomainConversation, Message as DomainMessage};
use crate::domain::value_objects::{Channel, ConversationStatus, Intent, SenderType};
use crate::infrastructure::database::schema::{conversations, messages};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = conversations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ConversationModel {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub agent_id: Uuid,
    pub channel: String,
    pub external_thread_id: String,
    pub customer_name: Option<String>,
    pub status: String,
    pub unsuccessful_responses: i32,
    pub escalated_to_human: bool,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = conversations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewConversationModel {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub agent_id: Uuid,
    pub channel: String,
    pub external_thread_id: String,
    pub customer_name: Option<String>,
    pub status: String,
    pub unsuccessful_responses: i32,
    pub escalated_to_human: bool,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The mutable escalation columns of a conversation.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = conversations)]
pub struct ConversationStateChangeset {
    pub status: String,
    pub unsuccessful_responses: i32,
    pub escalated_to_human: bool,
    pub version: i32,
    pub updated_at: DateTime<Utc>,
}

impl From<&DomainConversation> for NewConversationModel {
    fn from(conversation: &DomainConversation) -> Self {
        Self {
            id: conversation.id(),
            organization_id: conversation.organization_id(),
            agent_id: conversation.agent_id(),
            channel: conversation.channel().as_str().to_string(),
            external_thread_id: conversation.external_thread_id().to_string(),
            customer_name: conversation.customer_name().map(str::to_string),
            status: conversation.status().as_str().to_string(),
            unsuccessful_responses: conversation.unsuccessful_responses(),
            escalated_to_human: conversation.is_escalated_to_human(),
            version: conversation.version(),
            created_at: conversation.created_at(),
            updated_at: conversation.updated_at(),
        }
    }
}

impl ConversationStateChangeset {
    /// State of `conversation` written as the next version.
    pub fn next_version(conversation: &DomainConversation) -> Self {
        Self {
            status: conversation.status().as_str().to_string(),
            unsuccessful_responses: conversation.unsuccessful_responses(),
            escalated_to_human: conversation.is_escalated_to_human(),
            version: conversation.version() + 1,
            updated_at: Utc::now(),
        }
    }
}

impl TryFrom<ConversationModel> for DomainConversation {
    type Error = String;

    fn try_from(model: ConversationModel) -> Result<Self, Self::Error> {
        DomainConversation::restore(
            model.id,
            model.organization_id,
            model.agent_id,
            Channel::from_str(&model.channel)?,
            model.external_thread_id,
            model.customer_name,
            ConversationStatus::from_str(&model.status)?,
            model.unsuccessful_responses,
            model.escalated_to_human,
            model.version,
            model.created_at,
            model.updated_at,
        )
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(belongs_to(ConversationModel, foreign_key = conversation_id))]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MessageModel {
    pub id: Uuid,
    pub seq: i64,
    pub conversation_id: Uuid,
    pub sender_type: String,
    pub content: String,
    pub confidence: Option<f32>,
    pub intent: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewMessageModel {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_type: String,
    pub content: String,
    pub confidence: Option<f32>,
    pub intent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&DomainMessage> for NewMessageModel {
    fn from(message: &DomainMessage) -> Self {
        Self {
            id: message.id(),
            conversation_id: message.conversation_id(),
            sender_type: message.sender_type().as_str().to_string(),
            content: message.content().to_string(),
            confidence: message.confidence(),
            intent: message.intent().map(|i| i.as_str().to_string()),
            created_at: message.created_at(),
        }
    }
}

impl TryFrom<MessageModel> for DomainMessage {
    type Error = String;

    fn try_from(model: MessageModel) -> Result<Self, Self::Error> {
        let intent = model.intent.as_deref().map(Intent::from_str).transpose()?;

        Ok(DomainMessage::restore(
            model.id,
            model.conversation_id,
            SenderType::from_str(&model.sender_type)?,
            model.content,
            model.confidence,
            intent,
            model.created_at,
        ))
    }
}
