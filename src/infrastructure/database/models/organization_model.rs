use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::entities::{AgentProfile, ChannelIntegration, Organization, UsageLimits};
use crate::domain::value_objects::{Channel, Language};
use crate::infrastructure::database::schema::{agents, channel_integrations, organizations};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = organizations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrganizationModel {
    pub id: Uuid,
    pub name: String,
    pub language: String,
    pub monthly_message_limit: Option<i64>,
    pub messages_used: i64,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<OrganizationModel> for Organization {
    type Error = String;

    fn try_from(model: OrganizationModel) -> Result<Self, Self::Error> {
        Ok(Organization {
            id: model.id,
            name: model.name,
            language: Language::from_str(&model.language)?,
            limits: UsageLimits {
                monthly_message_limit: model.monthly_message_limit,
                messages_used: model.messages_used,
            },
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = agents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AgentModel {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub persona: String,
    pub max_tokens: i32,
    pub temperature: f32,
    pub total_conversations: i64,
    pub total_messages: i64,
    pub created_at: DateTime<Utc>,
}

impl From<AgentModel> for AgentProfile {
    fn from(model: AgentModel) -> Self {
        AgentProfile {
            id: model.id,
            organization_id: model.organization_id,
            name: model.name,
            persona: model.persona,
            max_tokens: model.max_tokens,
            temperature: model.temperature,
            total_conversations: model.total_conversations,
            total_messages: model.total_messages,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = channel_integrations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ChannelIntegrationModel {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub agent_id: Uuid,
    pub channel: String,
    pub account_id: String,
    pub access_token: Option<String>,
    pub verify_token: Option<String>,
    pub active: bool,
}

impl TryFrom<ChannelIntegrationModel> for ChannelIntegration {
    type Error = String;

    fn try_from(model: ChannelIntegrationModel) -> Result<Self, Self::Error> {
        Ok(ChannelIntegration {
            id: model.id,
            organization_id: model.organization_id,
            agent_id: model.agent_id,
            channel: Channel::from_str(&model.channel)?,
            account_id: model.account_id,
            access_token: model.access_token,
            verify_token: model.verify_token,
            active: model.active,
        })
    }
}
