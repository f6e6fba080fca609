use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::application::ports::channel_adapter::{ChannelError, WebhookVerification};
use crate::application::services::ChannelRouter;
use crate::application::services::channel_router::{ChannelRouterError, Dispatch, IgnoreReason};
use crate::domain::value_objects::Channel;
use crate::infrastructure::channels::meta::SIGNATURE_HEADER;
use crate::presentation::http::dto::{
    DispatchDto, WidgetMessageRequestDto, WidgetReplyDto, delivered, error_response, ok_response,
};

pub struct WebhookHandler {
    router: Arc<ChannelRouter>,
}

fn failure(e: ChannelRouterError) -> Response {
    let (status, code) = match &e {
        ChannelRouterError::UnsupportedChannel(_) => (StatusCode::NOT_FOUND, "UNSUPPORTED_CHANNEL"),
        ChannelRouterError::IntegrationNotFound(_) => (StatusCode::NOT_FOUND, "INTEGRATION_NOT_FOUND"),
        ChannelRouterError::Channel(ChannelError::VerificationFailed) => {
            (StatusCode::FORBIDDEN, "VERIFICATION_FAILED")
        }
        ChannelRouterError::Channel(ChannelError::SignatureInvalid) => {
            (StatusCode::UNAUTHORIZED, "INVALID_SIGNATURE")
        }
        ChannelRouterError::Channel(ChannelError::MalformedPayload(_)) => {
            (StatusCode::BAD_REQUEST, "MALFORMED_PAYLOAD")
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "WEBHOOK_FAILED"),
    };
    error_response(status, code, e)
}

/// Only Meta channels are reachable through the public webhook path.
fn webhook_channel(name: &str) -> Option<Channel> {
    name.parse::<Channel>().ok().filter(Channel::uses_meta_webhooks)
}

fn summarize(dispatch: &Dispatch) -> DispatchDto {
    match dispatch {
        Dispatch::Ignored(reason) => DispatchDto {
            outcome: match reason {
                IgnoreReason::Echo => "ignored_echo",
                IgnoreReason::StatusUpdate => "ignored_status",
                IgnoreReason::UnknownAccount => "ignored_unknown_account",
                IgnoreReason::InactiveIntegration => "ignored_inactive",
            }
            .to_string(),
            conversation_id: None,
            delivered: None,
        },
        Dispatch::MediaRejected { delivery } => DispatchDto {
            outcome: "media_rejected".to_string(),
            conversation_id: None,
            delivered: Some(delivered(*delivery)),
        },
        Dispatch::Handled {
            conversation_id,
            status,
            delivery,
            ..
        } => DispatchDto {
            outcome: status.as_str().to_string(),
            conversation_id: Some(*conversation_id),
            delivered: delivery.map(delivered),
        },
        Dispatch::Failed { .. } => DispatchDto {
            outcome: "failed".to_string(),
            conversation_id: None,
            delivered: None,
        },
    }
}

impl WebhookHandler {
    pub fn new(router: Arc<ChannelRouter>) -> Self {
        Self { router }
    }

    /// Subscription handshake; the challenge is echoed as plain text.
    pub async fn verify_webhook(
        State(handler): State<Arc<WebhookHandler>>,
        Path(channel): Path<String>,
        Query(query): Query<WebhookVerification>,
    ) -> Response {
        let Some(channel) = webhook_channel(&channel) else {
            return error_response(StatusCode::NOT_FOUND, "UNSUPPORTED_CHANNEL", format!("No webhook for {}", channel));
        };

        match handler.router.verify(channel, &query).await {
            Ok(challenge) => (StatusCode::OK, challenge).into_response(),
            Err(e) => {
                warn!(channel = %channel, "Webhook verification rejected");
                failure(e)
            }
        }
    }

    pub async fn receive_webhook(
        State(handler): State<Arc<WebhookHandler>>,
        Path(channel): Path<String>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Response {
        let Some(channel) = webhook_channel(&channel) else {
            return error_response(StatusCode::NOT_FOUND, "UNSUPPORTED_CHANNEL", format!("No webhook for {}", channel));
        };
        let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());

        match handler.router.receive(channel, signature, &body).await {
            Ok(dispatches) => {
                let summary: Vec<DispatchDto> = dispatches.iter().map(summarize).collect();
                ok_response(StatusCode::OK, summary)
            }
            Err(e) => failure(e),
        }
    }

    pub async fn widget_message(
        State(handler): State<Arc<WebhookHandler>>,
        Path(integration_id): Path<Uuid>,
        Json(request): Json<WidgetMessageRequestDto>,
    ) -> Response {
        if request.text.trim().is_empty() || request.session_id.trim().is_empty() {
            return error_response(
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILED",
                "session_id and text are required",
            );
        }

        let result = handler
            .router
            .receive_web_message(integration_id, &request.session_id, &request.text, request.customer_name)
            .await;

        match result {
            Ok(Dispatch::Handled {
                conversation_id,
                status,
                reply,
                ..
            }) => ok_response(
                StatusCode::OK,
                WidgetReplyDto {
                    conversation_id: Some(conversation_id),
                    status: Some(status.as_str().to_string()),
                    reply,
                },
            ),
            Ok(Dispatch::Ignored(IgnoreReason::InactiveIntegration)) => error_response(
                StatusCode::FORBIDDEN,
                "INTEGRATION_INACTIVE",
                "This widget is disabled",
            ),
            Ok(_) => ok_response(
                StatusCode::OK,
                WidgetReplyDto {
                    conversation_id: None,
                    status: None,
                    reply: None,
                },
            ),
            Err(e) => failure(e),
        }
    }
}
