use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::presentation::http::handlers::ConversationHandler;

pub fn conversation_routes(conversation_handler: Arc<ConversationHandler>) -> Router {
    Router::new()
        .route(
            "/api/conversations/{conversation_id}",
            get(ConversationHandler::get_conversation),
        )
        .route(
            "/api/conversations/{conversation_id}/complete",
            post(ConversationHandler::complete_conversation),
        )
        .route(
            "/api/conversations/{conversation_id}/escalate",
            post(ConversationHandler::escalate_conversation),
        )
        .with_state(conversation_handler)
}
