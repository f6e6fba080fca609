use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{Channel, Language};

/// Tenant boundary, as seen by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub language: Language,
    pub limits: UsageLimits,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageLimits {
    /// `None` means unlimited.
    pub monthly_message_limit: Option<i64>,
    pub messages_used: i64,
}

impl UsageLimits {
    pub fn has_message_quota(&self) -> bool {
        match self.monthly_message_limit {
            Some(limit) => self.messages_used < limit,
            None => true,
        }
    }
}

impl Organization {
    pub fn can_send_message(&self) -> bool {
        self.limits.has_message_quota()
    }
}

/// Persona and generation settings of the agent answering for an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub persona: String,
    pub max_tokens: i32,
    pub temperature: f32,
    pub total_conversations: i64,
    pub total_messages: i64,
}

/// Binds an organization's channel account to the agent that answers it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelIntegration {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub agent_id: Uuid,
    pub channel: Channel,
    /// The business's own id on the platform: page id, phone-number id,
    /// Instagram account id, IVR phone number or widget key.
    pub account_id: String,
    pub access_token: Option<String>,
    pub verify_token: Option<String>,
    pub active: bool,
}

impl ChannelIntegration {
    pub fn is_own_account(&self, sender_id: &str) -> bool {
        !sender_id.is_empty() && self.account_id == sender_id
    }
}
