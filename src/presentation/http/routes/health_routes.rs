use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use std::sync::Arc;

use crate::application::ports::JobQueue;
use crate::presentation::http::dto::{ApiResponse, HealthResponseDto};

pub fn health_routes(job_queue: Arc<dyn JobQueue>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .with_state(job_queue)
}

async fn root_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(ApiResponse::success("omnidesk".to_string())))
}

async fn health_handler(State(job_queue): State<Arc<dyn JobQueue>>) -> impl IntoResponse {
    let health_response = HealthResponseDto {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        pending_ingestion_jobs: job_queue.pending().await,
    };

    (StatusCode::OK, Json(ApiResponse::success(health_response)))
}
