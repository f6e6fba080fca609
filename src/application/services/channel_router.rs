use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::application::ports::{
    ChannelAdapter, OrganizationDirectory,
    channel_adapter::{ChannelError, DeliveryStatus, InboundEvent, InboundKind, WebhookVerification},
    organization_directory::DirectoryError,
};
use crate::application::services::conversation_service::{
    ConversationService, ConversationServiceError, ThreadKey, TurnOutcome,
};
use crate::domain::entities::ChannelIntegration;
use crate::domain::value_objects::{Channel, ConversationStatus};

#[derive(Debug, thiserror::Error)]
pub enum ChannelRouterError {
    #[error("No adapter registered for channel {0}")]
    UnsupportedChannel(Channel),
    #[error("Integration not found: {0}")]
    IntegrationNotFound(String),
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Conversation(#[from] ConversationServiceError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Echo,
    StatusUpdate,
    UnknownAccount,
    InactiveIntegration,
}

/// What happened to one inbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Ignored(IgnoreReason),
    /// A media-only message answered with the fixed notice.
    MediaRejected { delivery: DeliveryStatus },
    Handled {
        conversation_id: Uuid,
        status: ConversationStatus,
        reply: Option<String>,
        delivery: Option<DeliveryStatus>,
    },
    /// The event could not be processed; the rest of the batch still was.
    Failed { reason: String },
}

/// Normalizes channel events into conversation turns and sends replies
/// back out the channel they came from.
pub struct ChannelRouter {
    adapters: HashMap<Channel, Arc<dyn ChannelAdapter>>,
    directory: Arc<dyn OrganizationDirectory>,
    conversations: Arc<ConversationService>,
}

impl ChannelRouter {
    pub fn new(
        adapters: Vec<Arc<dyn ChannelAdapter>>,
        directory: Arc<dyn OrganizationDirectory>,
        conversations: Arc<ConversationService>,
    ) -> Self {
        let adapters = adapters
            .into_iter()
            .map(|adapter| (adapter.channel(), adapter))
            .collect();

        Self {
            adapters,
            directory,
            conversations,
        }
    }

    fn adapter(&self, channel: Channel) -> Result<&Arc<dyn ChannelAdapter>, ChannelRouterError> {
        self.adapters
            .get(&channel)
            .ok_or(ChannelRouterError::UnsupportedChannel(channel))
    }

    /// Webhook subscription handshake; returns the challenge to echo.
    pub async fn verify(
        &self,
        channel: Channel,
        query: &WebhookVerification,
    ) -> Result<String, ChannelRouterError> {
        let adapter = self.adapter(channel)?;
        let token_is_known = match query.verify_token.as_deref() {
            Some(token) if !token.is_empty() => self.directory.verify_token_matches(channel, token).await?,
            _ => false,
        };

        let challenge = adapter.verify(query, token_is_known)?;
        info!(channel = %channel, "Webhook verified");
        Ok(challenge)
    }

    /// Checks the signature, then dispatches each event in payload order.
    /// Only request-level failures are errors: a failing event is reported
    /// as `Dispatch::Failed` so the platform does not redeliver the events
    /// that already went through.
    pub async fn receive(
        &self,
        channel: Channel,
        signature: Option<&str>,
        body: &[u8],
    ) -> Result<Vec<Dispatch>, ChannelRouterError> {
        let adapter = self.adapter(channel)?;

        if let Err(e) = adapter.verify_signature(signature, body) {
            warn!(channel = %channel, "Rejected webhook with invalid signature");
            return Err(e.into());
        }

        let events = adapter.parse_events(body)?;
        let mut dispatches = Vec::with_capacity(events.len());

        for event in events {
            let thread_id = event.thread_id.clone();
            let dispatch = match self.route_event(adapter.as_ref(), event).await {
                Ok(dispatch) => dispatch,
                Err(e) => {
                    error!(channel = %channel, thread_id = %thread_id, error = %e, "Inbound event failed");
                    Dispatch::Failed { reason: e.to_string() }
                }
            };
            dispatches.push(dispatch);
        }

        Ok(dispatches)
    }

    async fn route_event(
        &self,
        adapter: &dyn ChannelAdapter,
        event: InboundEvent,
    ) -> Result<Dispatch, ChannelRouterError> {
        let channel = adapter.channel();
        match self.directory.find_integration(channel, &event.account_id).await? {
            Some(integration) => self.dispatch(adapter, &integration, event).await,
            None => {
                warn!(channel = %channel, account_id = %event.account_id, "Event for unknown account");
                Ok(Dispatch::Ignored(IgnoreReason::UnknownAccount))
            }
        }
    }

    /// Web widget turn. The reply travels back in the HTTP response.
    pub async fn receive_web_message(
        &self,
        integration_id: Uuid,
        session_id: &str,
        text: &str,
        customer_name: Option<String>,
    ) -> Result<Dispatch, ChannelRouterError> {
        let adapter = self.adapter(Channel::Web)?;
        let integration = self
            .directory
            .find_integration_by_id(integration_id)
            .await?
            .filter(|i| i.channel == Channel::Web)
            .ok_or_else(|| ChannelRouterError::IntegrationNotFound(integration_id.to_string()))?;

        let event = InboundEvent {
            account_id: integration.account_id.clone(),
            sender_id: session_id.to_string(),
            thread_id: session_id.to_string(),
            customer_name,
            kind: InboundKind::Text(text.to_string()),
        };

        self.dispatch(adapter.as_ref(), &integration, event).await
    }

    async fn dispatch(
        &self,
        adapter: &dyn ChannelAdapter,
        integration: &ChannelIntegration,
        event: InboundEvent,
    ) -> Result<Dispatch, ChannelRouterError> {
        let channel = adapter.channel();

        if !integration.active {
            return Ok(Dispatch::Ignored(IgnoreReason::InactiveIntegration));
        }

        let text = match event.kind {
            InboundKind::Status => {
                debug!(channel = %channel, "Ignoring status event");
                return Ok(Dispatch::Ignored(IgnoreReason::StatusUpdate));
            }
            InboundKind::Echo => return Ok(Dispatch::Ignored(IgnoreReason::Echo)),
            _ if integration.is_own_account(&event.sender_id) => {
                return Ok(Dispatch::Ignored(IgnoreReason::Echo));
            }
            InboundKind::Media(media_type) => {
                let organization = self.directory.get_organization(integration.organization_id).await?;
                info!(channel = %channel, media_type = %media_type, "Unsupported media received");
                let delivery = self
                    .deliver(
                        adapter,
                        integration,
                        &event.sender_id,
                        organization.language.unsupported_media_notice(),
                    )
                    .await;
                return Ok(Dispatch::MediaRejected { delivery });
            }
            InboundKind::Text(text) => text,
        };

        let conversation = self
            .conversations
            .resolve_conversation(ThreadKey {
                organization_id: integration.organization_id,
                agent_id: integration.agent_id,
                channel,
                external_thread_id: event.thread_id.clone(),
                customer_name: event.customer_name.clone(),
            })
            .await?;

        let outcome = self.conversations.handle_turn(conversation.id(), &text).await?;
        let reply = outcome.reply().map(str::to_string);

        let delivery = match &reply {
            Some(reply) => Some(self.deliver(adapter, integration, &event.sender_id, reply).await),
            None => None,
        };

        if let TurnOutcome::Escalated { .. } = outcome {
            info!(channel = %channel, conversation_id = %conversation.id(), "Handoff notice sent");
        }

        Ok(Dispatch::Handled {
            conversation_id: conversation.id(),
            status: outcome.conversation().status(),
            reply,
            delivery,
        })
    }

    /// At most once: failures are logged and reported, never retried.
    async fn deliver(
        &self,
        adapter: &dyn ChannelAdapter,
        integration: &ChannelIntegration,
        recipient_id: &str,
        text: &str,
    ) -> DeliveryStatus {
        match adapter.send(integration, recipient_id, text).await {
            Ok(()) => DeliveryStatus::Delivered,
            Err(e) => {
                error!(
                    channel = %adapter.channel(),
                    integration_id = %integration.id,
                    error = %e,
                    "Channel send failed"
                );
                DeliveryStatus::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Conversation;
    use crate::domain::repositories::ConversationRepository;
    use crate::testing::{Harness, RecordingAdapter, ScriptedLanguageModel};

    fn router(harness: &Harness, adapter: Arc<RecordingAdapter>) -> ChannelRouter {
        ChannelRouter::new(
            vec![adapter],
            harness.directory.clone(),
            harness.conversation_service.clone(),
        )
    }

    fn text_event(harness: &Harness, sender: &str, text: &str) -> InboundEvent {
        InboundEvent {
            account_id: harness.integration(Channel::Facebook).account_id,
            sender_id: sender.to_string(),
            thread_id: sender.to_string(),
            customer_name: None,
            kind: InboundKind::Text(text.to_string()),
        }
    }

    #[tokio::test]
    async fn test_text_event_is_answered_on_origin_channel() {
        let harness = Harness::new(ScriptedLanguageModel::replying("Hello from the shop"));
        let adapter = Arc::new(RecordingAdapter::new(Channel::Facebook));
        adapter.queue_events(vec![text_event(&harness, "user-1", "hi")]);
        let router = router(&harness, adapter.clone());

        let dispatches = router.receive(Channel::Facebook, None, b"{}").await.unwrap();

        assert!(matches!(
            &dispatches[0],
            Dispatch::Handled { delivery: Some(DeliveryStatus::Delivered), .. }
        ));
        assert_eq!(
            adapter.sent(),
            vec![("user-1".to_string(), "Hello from the shop".to_string())]
        );
    }

    #[tokio::test]
    async fn test_own_account_events_are_dropped() {
        let harness = Harness::new(ScriptedLanguageModel::replying("unused"));
        let adapter = Arc::new(RecordingAdapter::new(Channel::Facebook));
        let page_id = harness.integration(Channel::Facebook).account_id;
        adapter.queue_events(vec![
            text_event(&harness, &page_id, "our own reply"),
            InboundEvent {
                kind: InboundKind::Echo,
                ..text_event(&harness, "user-2", "echo")
            },
        ]);
        let router = router(&harness, adapter.clone());

        let dispatches = router.receive(Channel::Facebook, None, b"{}").await.unwrap();

        assert_eq!(
            dispatches,
            vec![
                Dispatch::Ignored(IgnoreReason::Echo),
                Dispatch::Ignored(IgnoreReason::Echo)
            ]
        );
        assert!(adapter.sent().is_empty());
        assert_eq!(harness.conversations.message_count(), 0);
    }

    #[tokio::test]
    async fn test_media_gets_fixed_notice() {
        let harness = Harness::new(ScriptedLanguageModel::replying("unused"));
        let adapter = Arc::new(RecordingAdapter::new(Channel::Facebook));
        adapter.queue_events(vec![InboundEvent {
            kind: InboundKind::Media("image".to_string()),
            ..text_event(&harness, "user-3", "")
        }]);
        let router = router(&harness, adapter.clone());

        router.receive(Channel::Facebook, None, b"{}").await.unwrap();

        assert_eq!(
            adapter.sent(),
            vec![(
                "user-3".to_string(),
                harness.language().unsupported_media_notice().to_string()
            )]
        );
        assert_eq!(harness.model.calls(), 0);
    }

    #[tokio::test]
    async fn test_bad_signature_is_rejected_before_parsing() {
        let harness = Harness::new(ScriptedLanguageModel::replying("unused"));
        let adapter = Arc::new(RecordingAdapter::new(Channel::Facebook).rejecting_signatures());
        adapter.queue_events(vec![text_event(&harness, "user-4", "hi")]);
        let router = router(&harness, adapter.clone());

        let result = router.receive(Channel::Facebook, Some("sha256=00"), b"{}").await;

        assert!(matches!(
            result,
            Err(ChannelRouterError::Channel(ChannelError::SignatureInvalid))
        ));
        assert_eq!(harness.conversations.message_count(), 0);
    }

    #[tokio::test]
    async fn test_failing_event_does_not_abort_the_batch() {
        let harness = Harness::new(ScriptedLanguageModel::replying("not sure"));
        let broken = Conversation::new(
            harness.directory.organization_id(),
            Uuid::new_v4(),
            Channel::Facebook,
            "user-2".to_string(),
            None,
        );
        harness.conversations.create(&broken).await.unwrap();
        let adapter = Arc::new(RecordingAdapter::new(Channel::Facebook));
        adapter.queue_events(vec![
            text_event(&harness, "user-1", "where is my parcel"),
            text_event(&harness, "user-2", "hello?"),
        ]);
        let router = router(&harness, adapter.clone());

        let dispatches = router.receive(Channel::Facebook, None, b"{}").await.unwrap();

        assert_eq!(dispatches.len(), 2);
        let Dispatch::Handled { conversation_id, .. } = &dispatches[0] else {
            panic!("first event should be answered, got {:?}", dispatches[0]);
        };
        assert!(matches!(&dispatches[1], Dispatch::Failed { .. }));
        assert_eq!(
            adapter.sent(),
            vec![("user-1".to_string(), "not sure".to_string())]
        );

        let answered = harness.conversations.get(*conversation_id).unwrap();
        assert_eq!(answered.unsuccessful_responses(), 1);
        assert!(!answered.is_escalated_to_human());
    }

    #[tokio::test]
    async fn test_send_failure_is_reported() {
        let harness = Harness::new(ScriptedLanguageModel::replying("hello"));
        let adapter = Arc::new(RecordingAdapter::new(Channel::Facebook).failing_sends());
        adapter.queue_events(vec![text_event(&harness, "user-5", "hi")]);
        let router = router(&harness, adapter.clone());

        let dispatches = router.receive(Channel::Facebook, None, b"{}").await.unwrap();

        assert!(matches!(
            &dispatches[0],
            Dispatch::Handled { delivery: Some(DeliveryStatus::Failed), .. }
        ));
        assert_eq!(adapter.send_attempts(), 1);
    }

    #[tokio::test]
    async fn test_verify_handshake() {
        let harness = Harness::new(ScriptedLanguageModel::replying("unused"));
        let router = router(&harness, Arc::new(RecordingAdapter::new(Channel::Facebook)));
        let token = harness.integration(Channel::Facebook).verify_token;

        let query = WebhookVerification {
            mode: Some("subscribe".to_string()),
            verify_token: token,
            challenge: Some("1158201444".to_string()),
        };
        assert_eq!(router.verify(Channel::Facebook, &query).await.unwrap(), "1158201444");

        let wrong = WebhookVerification {
            verify_token: Some("nope".to_string()),
            ..query
        };
        assert!(router.verify(Channel::Facebook, &wrong).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_channel() {
        let harness = Harness::new(ScriptedLanguageModel::replying("unused"));
        let router = router(&harness, Arc::new(RecordingAdapter::new(Channel::Facebook)));

        assert!(matches!(
            router.receive(Channel::Instagram, None, b"{}").await,
            Err(ChannelRouterError::UnsupportedChannel(Channel::Instagram))
        ));
    }
}
