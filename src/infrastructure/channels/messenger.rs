//! Messenger-platform webhooks, used by both Facebook pages and Instagram
//! professional accounts.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::meta::{GraphApiClient, MetaSignatureVerifier, parse_json};
use crate::application::ports::channel_adapter::{ChannelAdapter, ChannelError, InboundEvent, InboundKind};
use crate::domain::entities::ChannelIntegration;
use crate::domain::value_objects::Channel;

#[derive(Debug, Deserialize)]
struct WebhookBody {
    #[serde(default)]
    entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    id: String,
    #[serde(default)]
    messaging: Vec<MessagingEvent>,
}

#[derive(Debug, Deserialize)]
struct Party {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessagingEvent {
    sender: Party,
    recipient: Party,
    message: Option<MessageBody>,
    delivery: Option<serde_json::Value>,
    read: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    text: Option<String>,
    #[serde(default)]
    is_echo: bool,
    #[serde(default)]
    attachments: Vec<Attachment>,
}

#[derive(Debug, Deserialize)]
struct Attachment {
    #[serde(rename = "type")]
    kind: String,
}

pub struct MessengerAdapter {
    channel: Channel,
    graph: Arc<GraphApiClient>,
    verifier: MetaSignatureVerifier,
}

impl MessengerAdapter {
    pub fn facebook(graph: Arc<GraphApiClient>, verifier: MetaSignatureVerifier) -> Self {
        Self {
            channel: Channel::Facebook,
            graph,
            verifier,
        }
    }

    pub fn instagram(graph: Arc<GraphApiClient>, verifier: MetaSignatureVerifier) -> Self {
        Self {
            channel: Channel::Instagram,
            graph,
            verifier,
        }
    }
}

fn to_event(account_id: &str, event: MessagingEvent) -> Option<InboundEvent> {
    let kind = match event.message {
        Some(message) if message.is_echo => InboundKind::Echo,
        Some(message) => match message.text.filter(|t| !t.trim().is_empty()) {
            Some(text) => InboundKind::Text(text),
            None => InboundKind::Media(
                message
                    .attachments
                    .first()
                    .map(|a| a.kind.clone())
                    .unwrap_or_else(|| "unknown".to_string()),
            ),
        },
        None if event.delivery.is_some() || event.read.is_some() => InboundKind::Status,
        // Postbacks, reactions and referrals carry nothing to answer
        None => return None,
    };

    // Echoes are addressed from the page to the customer
    let customer = if kind == InboundKind::Echo {
        event.recipient.id
    } else {
        event.sender.id
    };

    Some(InboundEvent {
        account_id: account_id.to_string(),
        sender_id: customer.clone(),
        thread_id: customer,
        customer_name: None,
        kind,
    })
}

#[async_trait]
impl ChannelAdapter for MessengerAdapter {
    fn channel(&self) -> Channel {
        self.channel
    }

    fn verify_signature(&self, signature: Option<&str>, body: &[u8]) -> Result<(), ChannelError> {
        self.verifier.verify(signature, body)
    }

    fn parse_events(&self, body: &[u8]) -> Result<Vec<InboundEvent>, ChannelError> {
        let body: WebhookBody = parse_json(body)?;

        Ok(body
            .entry
            .into_iter()
            .flat_map(|entry| {
                let account_id = entry.id;
                entry
                    .messaging
                    .into_iter()
                    .filter_map(move |event| to_event(&account_id, event))
            })
            .collect())
    }

    async fn send(
        &self,
        integration: &ChannelIntegration,
        recipient_id: &str,
        text: &str,
    ) -> Result<(), ChannelError> {
        let payload = json!({
            "recipient": { "id": recipient_id },
            "messaging_type": "RESPONSE",
            "message": { "text": text },
        });

        self.graph.post_message(integration, &payload).await
    }
}
