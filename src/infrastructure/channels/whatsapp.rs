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
    #[serde(default)]
    changes: Vec<Change>,
}

#[derive(Debug, Deserialize)]
struct Change {
    value: ChangeValue,
}

#[derive(Debug, Deserialize)]
struct ChangeValue {
    metadata: Option<Metadata>,
    #[serde(default)]
    contacts: Vec<Contact>,
    #[serde(default)]
    messages: Vec<WhatsAppMessage>,
    #[serde(default)]
    statuses: Vec<StatusUpdate>,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    phone_number_id: String,
}

#[derive(Debug, Deserialize)]
struct Contact {
    wa_id: Option<String>,
    profile: Option<Profile>,
}

#[derive(Debug, Deserialize)]
struct Profile {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WhatsAppMessage {
    from: String,
    #[serde(rename = "type")]
    kind: String,
    text: Option<TextBody>,
}

#[derive(Debug, Deserialize)]
struct TextBody {
    body: String,
}

#[derive(Debug, Deserialize)]
struct StatusUpdate {
    recipient_id: Option<String>,
}

/// WhatsApp Cloud API adapter.
pub struct WhatsAppAdapter {
    graph: Arc<GraphApiClient>,
    verifier: MetaSignatureVerifier,
}

impl WhatsAppAdapter {
    pub fn new(graph: Arc<GraphApiClient>, verifier: MetaSignatureVerifier) -> Self {
        Self { graph, verifier }
    }
}

fn events_from(value: ChangeValue) -> Vec<InboundEvent> {
    let Some(metadata) = value.metadata else {
        return Vec::new();
    };
    let account_id = metadata.phone_number_id;

    let name_of = |wa_id: &str| {
        value
            .contacts
            .iter()
            .find(|c| c.wa_id.as_deref() == Some(wa_id))
            .or_else(|| value.contacts.first())
            .and_then(|c| c.profile.as_ref())
            .and_then(|p| p.name.clone())
    };

    let mut events: Vec<InboundEvent> = value
        .messages
        .iter()
        .map(|message| {
            let kind = match (message.kind.as_str(), &message.text) {
                ("text", Some(text)) if !text.body.trim().is_empty() => InboundKind::Text(text.body.clone()),
                (other, _) => InboundKind::Media(other.to_string()),
            };
            InboundEvent {
                account_id: account_id.clone(),
                sender_id: message.from.clone(),
                thread_id: message.from.clone(),
                customer_name: name_of(&message.from),
                kind,
            }
        })
        .collect();

    events.extend(value.statuses.iter().map(|status| {
        let recipient = status.recipient_id.clone().unwrap_or_default();
        InboundEvent {
            account_id: account_id.clone(),
            sender_id: recipient.clone(),
            thread_id: recipient,
            customer_name: None,
            kind: InboundKind::Status,
        }
    }));

    events
}

#[async_trait]
impl ChannelAdapter for WhatsAppAdapter {
    fn channel(&self) -> Channel {
        Channel::WhatsApp
    }

    fn verify_signature(&self, signature: Option<&str>, body: &[u8]) -> Result<(), ChannelError> {
        self.verifier.verify(signature, body)
    }

    fn parse_events(&self, body: &[u8]) -> Result<Vec<InboundEvent>, ChannelError> {
        let body: WebhookBody = parse_json(body)?;

        Ok(body
            .entry
            .into_iter()
            .flat_map(|entry| entry.changes)
            .flat_map(|change| events_from(change.value))
            .collect())
    }

    async fn send(
        &self,
        integration: &ChannelIntegration,
        recipient_id: &str,
        text: &str,
    ) -> Result<(), ChannelError> {
        let payload = json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": recipient_id,
            "type": "text",
            "text": { "body": text },
        });

        self.graph.post_message(integration, &payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChannelConfig;

    fn adapter() -> WhatsAppAdapter {
        let graph = GraphApiClient::new(&ChannelConfig {
            graph_api_base: "http://localhost".to_string(),
            graph_api_version: "v18.0".to_string(),
            meta_app_secret: None,
            send_timeout_secs: 1,
        })
        .unwrap();
        WhatsAppAdapter::new(Arc::new(graph), MetaSignatureVerifier::new(None))
    }

    #[test]
    fn test_parses_text_with_contact_name() {
        let body = br#"{"object":"whatsapp_business_account","entry":[{"id":"WABA","changes":[{"field":"messages","value":{
            "messaging_product":"whatsapp",
            "metadata":{"display_phone_number":"8801700000000","phone_number_id":"PHONE"},
            "contacts":[{"profile":{"name":"Rahim"},"wa_id":"8801811111111"}],
            "messages":[{"from":"8801811111111","id":"wamid.1","timestamp":"1","type":"text","text":{"body":"delivery charge koto?"}}]
        }}]}]}"#;

        let events = adapter().parse_events(body).unwrap();

        assert_eq!(
            events,
            vec![InboundEvent {
                account_id: "PHONE".to_string(),
                sender_id: "8801811111111".to_string(),
                thread_id: "8801811111111".to_string(),
                customer_name: Some("Rahim".to_string()),
                kind: InboundKind::Text("delivery charge koto?".to_string()),
            }]
        );
    }

    #[test]
    fn test_media_and_status_events() {
        let body = br#"{"entry":[{"changes":[{"value":{
            "metadata":{"phone_number_id":"PHONE"},
            "messages":[{"from":"880","type":"image","image":{"id":"img"}}],
            "statuses":[{"id":"wamid.2","status":"delivered","recipient_id":"880"}]
        }}]}]}"#;

        let kinds: Vec<InboundKind> = adapter()
            .parse_events(body)
            .unwrap()
            .into_iter()
            .map(|e| e.kind)
            .collect();

        assert_eq!(kinds, vec![InboundKind::Media("image".to_string()), InboundKind::Status]);
    }

    #[test]
    fn test_change_without_metadata_is_skipped() {
        let body = br#"{"entry":[{"changes":[{"value":{"messages":[]}}]}]}"#;
        assert!(adapter().parse_events(body).unwrap().is_empty());
    }
}
