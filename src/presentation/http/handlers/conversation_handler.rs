use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::services::ConversationService;
use crate::application::services::conversation_service::ConversationServiceError;
use crate::presentation::http::dto::{
    ConversationDetailDto, ConversationDto, MessageDto, error_response, ok_response,
};

pub struct ConversationHandler {
    conversations: Arc<ConversationService>,
}

fn failure(e: ConversationServiceError) -> Response {
    let (status, code) = match &e {
        ConversationServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "CONVERSATION_NOT_FOUND"),
        ConversationServiceError::Closed(_) | ConversationServiceError::InvalidTransition(_) => {
            (StatusCode::CONFLICT, "INVALID_TRANSITION")
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "CONVERSATION_ERROR"),
    };
    error_response(status, code, e)
}

impl ConversationHandler {
    pub fn new(conversations: Arc<ConversationService>) -> Self {
        Self { conversations }
    }

    pub async fn get_conversation(
        State(handler): State<Arc<ConversationHandler>>,
        Path(conversation_id): Path<Uuid>,
    ) -> Response {
        match handler.conversations.get_with_messages(conversation_id).await {
            Ok((conversation, messages)) => ok_response(
                StatusCode::OK,
                ConversationDetailDto {
                    conversation: ConversationDto::from(&conversation),
                    messages: messages.iter().map(MessageDto::from).collect(),
                },
            ),
            Err(e) => failure(e),
        }
    }

    pub async fn complete_conversation(
        State(handler): State<Arc<ConversationHandler>>,
        Path(conversation_id): Path<Uuid>,
    ) -> Response {
        match handler.conversations.complete(conversation_id).await {
            Ok(conversation) => ok_response(StatusCode::OK, ConversationDto::from(&conversation)),
            Err(e) => failure(e),
        }
    }

    pub async fn escalate_conversation(
        State(handler): State<Arc<ConversationHandler>>,
        Path(conversation_id): Path<Uuid>,
    ) -> Response {
        match handler.conversations.escalate(conversation_id).await {
            Ok(conversation) => ok_response(StatusCode::OK, ConversationDto::from(&conversation)),
            Err(e) => failure(e),
        }
    }
}
