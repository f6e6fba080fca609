use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::entities::ChannelIntegration;
use crate::domain::value_objects::Channel;

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Webhook verification failed")]
    VerificationFailed,
    #[error("Invalid webhook signature")]
    SignatureInvalid,
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
    #[error("Send failed: {0}")]
    SendFailed(String),
    #[error("Channel is not configured: {0}")]
    NotConfigured(String),
}

/// Query of a webhook subscription handshake.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookVerification {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InboundKind {
    Text(String),
    /// Image, video, audio or another attachment without text.
    Media(String),
    /// Sent by the business account itself.
    Echo,
    /// Delivery receipts, read marks and other status-only notifications.
    Status,
}

/// One normalized event from a channel payload.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    /// The business account the event was addressed to.
    pub account_id: String,
    /// The customer; replies go back to this id.
    pub sender_id: String,
    /// Channel-specific thread identifier.
    pub thread_id: String,
    pub customer_name: Option<String>,
    pub kind: InboundKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered,
    Failed,
}

/// Uniform verify / receive / send contract of a chat channel.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    fn channel(&self) -> Channel;

    /// Returns the challenge to echo back when the handshake is valid.
    fn verify(
        &self,
        query: &WebhookVerification,
        token_is_known: bool,
    ) -> Result<String, ChannelError> {
        match (&query.mode, &query.challenge) {
            (Some(mode), Some(challenge)) if mode == "subscribe" && token_is_known => {
                Ok(challenge.clone())
            }
            _ => Err(ChannelError::VerificationFailed),
        }
    }

    /// Checks the platform signature of a raw body.
    fn verify_signature(&self, signature: Option<&str>, body: &[u8]) -> Result<(), ChannelError>;

    fn parse_events(&self, body: &[u8]) -> Result<Vec<InboundEvent>, ChannelError>;

    async fn send(
        &self,
        integration: &ChannelIntegration,
        recipient_id: &str,
        text: &str,
    ) -> Result<(), ChannelError>;
}
