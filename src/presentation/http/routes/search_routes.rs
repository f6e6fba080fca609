use axum::{Router, routing::get};
use std::sync::Arc;

use crate::presentation::http::handlers::SearchHandler;

pub fn search_routes(search_handler: Arc<SearchHandler>) -> Router {
    Router::new()
        .route(
            "/api/organizations/{organization_id}/search",
            get(SearchHandler::search_knowledge),
        )
        .with_state(search_handler)
}
