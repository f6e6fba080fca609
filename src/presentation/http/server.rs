use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::application::ports::JobQueue;
use crate::infrastructure::messaging::BackgroundProcessor;
use crate::presentation::http::{
    handlers::{ConversationHandler, DocumentHandler, IvrHandler, SearchHandler, WebhookHandler},
    routes::{channel_routes, conversation_routes, document_routes, health_routes, ivr_routes, search_routes},
};

pub struct HttpServer {
    document_handler: Arc<DocumentHandler>,
    search_handler: Arc<SearchHandler>,
    conversation_handler: Arc<ConversationHandler>,
    webhook_handler: Arc<WebhookHandler>,
    ivr_handler: Arc<IvrHandler>,
    job_queue: Arc<dyn JobQueue>,
    background_processor: Arc<BackgroundProcessor>,
    bind_address: String,
    max_body_bytes: usize,
}

impl HttpServer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        document_handler: Arc<DocumentHandler>,
        search_handler: Arc<SearchHandler>,
        conversation_handler: Arc<ConversationHandler>,
        webhook_handler: Arc<WebhookHandler>,
        ivr_handler: Arc<IvrHandler>,
        job_queue: Arc<dyn JobQueue>,
        background_processor: Arc<BackgroundProcessor>,
        bind_address: String,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            document_handler,
            search_handler,
            conversation_handler,
            webhook_handler,
            ivr_handler,
            job_queue,
            background_processor,
            bind_address,
            max_body_bytes,
        }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .merge(health_routes(self.job_queue.clone()))
            .merge(document_routes(self.document_handler.clone()))
            .merge(search_routes(self.search_handler.clone()))
            .merge(conversation_routes(self.conversation_handler.clone()))
            .merge(channel_routes(self.webhook_handler.clone()))
            .merge(ivr_routes(self.ivr_handler.clone()))
            .layer(cors)
            .layer(RequestBodyLimitLayer::new(self.max_body_bytes))
            .layer(
                TraceLayer::new_for_http()
                    .on_request(
                        |request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {
                            tracing::info!("Received request: {} {}", request.method(), request.uri().path());
                        },
                    )
                    .on_response(
                        |response: &axum::http::Response<axum::body::Body>,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::info!("Response: {} (took {} ms)", response.status(), latency.as_millis());
                        },
                    )
                    .on_failure(
                        |error: ServerErrorsFailureClass, latency: std::time::Duration, _span: &tracing::Span| {
                            tracing::error!("Request failed: {:?} (took {} ms)", error, latency.as_millis());
                        },
                    ),
            )
    }

    pub async fn run(self) -> Result<(), std::io::Error> {
        let background_processor = self.background_processor.clone();
        tokio::spawn(async move {
            background_processor.start().await;
        });

        let app = self.router();
        let listener = TcpListener::bind(&self.bind_address).await?;
        info!(address = %self.bind_address, "HTTP server listening");
        axum::serve(listener, app).await
    }
}
