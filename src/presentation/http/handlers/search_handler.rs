use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::use_cases::{
    SearchKnowledgeUseCase,
    search_knowledge::{SearchKnowledgeError, SearchKnowledgeRequest},
};
use crate::presentation::http::dto::{SearchRequestDto, SearchResponseDto, error_response, ok_response};

pub struct SearchHandler {
    search_use_case: Arc<SearchKnowledgeUseCase>,
}

impl SearchHandler {
    pub fn new(search_use_case: Arc<SearchKnowledgeUseCase>) -> Self {
        Self { search_use_case }
    }

    pub async fn search_knowledge(
        State(handler): State<Arc<SearchHandler>>,
        Path(organization_id): Path<Uuid>,
        Query(params): Query<SearchRequestDto>,
    ) -> Response {
        let request = SearchKnowledgeRequest {
            organization_id,
            query: params.query,
            limit: params.limit,
        };

        match handler.search_use_case.execute(request).await {
            Ok(response) => ok_response(StatusCode::OK, SearchResponseDto::from(response)),
            Err(e @ SearchKnowledgeError::ValidationError(_)) => {
                error_response(StatusCode::BAD_REQUEST, "INVALID_QUERY", e)
            }
            Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, "SEARCH_FAILED", e),
        }
    }
}
