use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::presentation::http::handlers::{IvrHandler, WebhookHandler};

pub fn channel_routes(webhook_handler: Arc<WebhookHandler>) -> Router {
    Router::new()
        .route(
            "/webhooks/{channel}",
            get(WebhookHandler::verify_webhook).post(WebhookHandler::receive_webhook),
        )
        .route(
            "/api/widget/{integration_id}/messages",
            post(WebhookHandler::widget_message),
        )
        .with_state(webhook_handler)
}

pub fn ivr_routes(ivr_handler: Arc<IvrHandler>) -> Router {
    Router::new()
        .route("/ivr/voice", post(IvrHandler::voice))
        .route("/ivr/gather", post(IvrHandler::gather))
        .route("/ivr/status", post(IvrHandler::status))
        .with_state(ivr_handler)
}
