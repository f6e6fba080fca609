use async_trait::async_trait;

use crate::application::ports::channel_adapter::{
    ChannelAdapter, ChannelError, InboundEvent, WebhookVerification,
};
use crate::domain::entities::ChannelIntegration;
use crate::domain::value_objects::Channel;

/// Website widget. Messages arrive through the widget endpoint and replies
/// are returned in its HTTP response, so there is nothing to push.
pub struct WebWidgetAdapter;

#[async_trait]
impl ChannelAdapter for WebWidgetAdapter {
    fn channel(&self) -> Channel {
        Channel::Web
    }

    fn verify(
        &self,
        _query: &WebhookVerification,
        _token_is_known: bool,
    ) -> Result<String, ChannelError> {
        Err(ChannelError::VerificationFailed)
    }

    fn verify_signature(&self, _signature: Option<&str>, _body: &[u8]) -> Result<(), ChannelError> {
        Ok(())
    }

    fn parse_events(&self, _body: &[u8]) -> Result<Vec<InboundEvent>, ChannelError> {
        Err(ChannelError::MalformedPayload(
            "web widget messages use the widget endpoint".to_string(),
        ))
    }

    async fn send(
        &self,
        _integration: &ChannelIntegration,
        _recipient_id: &str,
        _text: &str,
    ) -> Result<(), ChannelError> {
        Ok(())
    }
}
