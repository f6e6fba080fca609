use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::presentation::http::handlers::DocumentHandler;

pub fn document_routes(document_handler: Arc<DocumentHandler>) -> Router {
    Router::new()
        .route("/api/documents", post(DocumentHandler::upload_document))
        .route(
            "/api/organizations/{organization_id}/documents",
            get(DocumentHandler::list_documents),
        )
        .route("/api/documents/{document_id}", get(DocumentHandler::get_document))
        .route(
            "/api/documents/{document_id}/chunks",
            get(DocumentHandler::get_document_chunks),
        )
        .route(
            "/api/documents/{document_id}/reprocess",
            post(DocumentHandler::reprocess_document),
        )
        .with_state(document_handler)
}
