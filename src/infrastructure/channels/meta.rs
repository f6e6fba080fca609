//! Pieces shared by the Meta platforms: webhook signatures and the Graph
//! API send endpoint.

use hmac::{Hmac, Mac};
use reqwest::Client;
use serde_json::Value;
use sha2::Sha256;
use std::time::Duration;
use tracing::debug;

use crate::application::ports::channel_adapter::ChannelError;
use crate::config::ChannelConfig;
use crate::domain::entities::ChannelIntegration;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Checks `X-Hub-Signature-256: sha256=<hex>` against the app secret.
/// Without a configured secret every body is accepted.
#[derive(Clone)]
pub struct MetaSignatureVerifier {
    app_secret: Option<String>,
}

impl MetaSignatureVerifier {
    pub fn new(app_secret: Option<String>) -> Self {
        Self { app_secret }
    }

    pub fn verify(&self, signature: Option<&str>, body: &[u8]) -> Result<(), ChannelError> {
        let Some(secret) = &self.app_secret else {
            return Ok(());
        };

        let signature = signature.ok_or(ChannelError::SignatureInvalid)?;
        let hex_sig = signature.strip_prefix("sha256=").unwrap_or(signature);
        let expected = hex::decode(hex_sig).map_err(|_| ChannelError::SignatureInvalid)?;

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| ChannelError::SignatureInvalid)?;
        mac.update(body);
        mac.verify_slice(&expected).map_err(|_| ChannelError::SignatureInvalid)
    }
}

/// `sha256=<hex>` signature Meta would send for `body`.
#[cfg(test)]
pub fn sign(secret: &str, body: &[u8]) -> Result<String, ChannelError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| ChannelError::SignatureInvalid)?;
    mac.update(body);
    Ok(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

/// Posts message payloads to `{base}/{version}/{account_id}/messages`.
pub struct GraphApiClient {
    client: Client,
    base_url: String,
    version: String,
}

impl GraphApiClient {
    pub fn new(config: &ChannelConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.send_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.graph_api_base.trim_end_matches('/').to_string(),
            version: config.graph_api_version.clone(),
        })
    }

    pub fn messages_url(&self, account_id: &str) -> String {
        format!("{}/{}/{}/messages", self.base_url, self.version, account_id)
    }

    pub async fn post_message(&self, integration: &ChannelIntegration, payload: &Value) -> Result<(), ChannelError> {
        let token = integration
            .access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ChannelError::NotConfigured(format!("no access token for {}", integration.id)))?;

        let url = self.messages_url(&integration.account_id);
        debug!(channel = %integration.channel, integration_id = %integration.id, "Sending Graph API message");

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(payload)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed(e.without_url().to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body: Value = response.json().await.unwrap_or(Value::Null);
        let reason = body["error"]["message"].as_str().unwrap_or("unknown error");
        Err(ChannelError::SendFailed(format!("HTTP {}: {}", status.as_u16(), reason)))
    }
}

/// Parses a webhook body, mapping JSON errors to `MalformedPayload`.
pub fn parse_json<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ChannelError> {
    serde_json::from_slice(body).map_err(|e| ChannelError::MalformedPayload(e.to_string()))
}
