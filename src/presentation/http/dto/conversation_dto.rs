use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::ports::channel_adapter::DeliveryStatus;
use crate::domain::entities::{Conversation, Message};

#[derive(Debug, Serialize)]
pub struct ConversationDto {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub agent_id: Uuid,
    pub channel: String,
    pub external_thread_id: String,
    pub customer_name: Option<String>,
    pub status: String,
    pub unsuccessful_responses: i32,
    pub escalated_to_human: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Conversation> for ConversationDto {
    fn from(conversation: &Conversation) -> Self {
        Self {
            id: conversation.id(),
            organization_id: conversation.organization_id(),
            agent_id: conversation.agent_id(),
            channel: conversation.channel().to_string(),
            external_thread_id: conversation.external_thread_id().to_string(),
            customer_name: conversation.customer_name().map(str::to_string),
            status: conversation.status().as_str().to_string(),
            unsuccessful_responses: conversation.unsuccessful_responses(),
            escalated_to_human: conversation.is_escalated_to_human(),
            created_at: conversation.created_at().to_rfc3339(),
            updated_at: conversation.updated_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageDto {
    pub id: Uuid,
    pub sender_type: String,
    pub content: String,
    pub confidence: Option<f32>,
    pub intent: Option<String>,
    pub created_at: String,
}

impl From<&Message> for MessageDto {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id(),
            sender_type: message.sender_type().as_str().to_string(),
            content: message.content().to_string(),
            confidence: message.confidence(),
            intent: message.intent().map(|i| i.as_str().to_string()),
            created_at: message.created_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConversationDetailDto {
    pub conversation: ConversationDto,
    pub messages: Vec<MessageDto>,
}

#[derive(Debug, Deserialize)]
pub struct WidgetMessageRequestDto {
    pub session_id: String,
    pub text: String,
    pub customer_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WidgetReplyDto {
    pub conversation_id: Option<Uuid>,
    pub status: Option<String>,
    pub reply: Option<String>,
}

/// Summary of one processed webhook event.
#[derive(Debug, Serialize)]
pub struct DispatchDto {
    pub outcome: String,
    pub conversation_id: Option<Uuid>,
    pub delivered: Option<bool>,
}

pub fn delivered(status: DeliveryStatus) -> bool {
    status == DeliveryStatus::Delivered
}
