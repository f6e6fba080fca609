use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::warn;

use crate::{
    application::{
        ports::{
            BusinessDataSource, ChannelAdapter, DocumentExtractor, EmbeddingProvider, FileStorage, JobQueue,
            LanguageModel, OrganizationDirectory,
        },
        services::{
            ChannelRouter, ConversationService, DocumentProcessorService, IvrEngine, ResponseGenerator,
            RetrievalService,
            document_processor::{ChunkingOptions, DocumentProcessingError},
            response_generator::GenerationSettings,
        },
        use_cases::{
            GetDocumentChunksUseCase, GetDocumentUseCase, ListDocumentsUseCase, ProcessDocumentUseCase,
            SearchKnowledgeUseCase, UploadDocumentUseCase,
        },
    },
    config::AppConfig,
    domain::repositories::{CallSessionRepository, ChunkRepository, ConversationRepository, DocumentRepository},
    infrastructure::{
        channels::{
            GraphApiClient, MessengerAdapter, MetaSignatureVerifier, TwilioSignatureValidator, WebWidgetAdapter,
            WhatsAppAdapter,
        },
        database::{
            DbPool,
            repositories::{
                PostgresCallSessionRepository, PostgresChunkRepository, PostgresConversationRepository,
                PostgresDocumentRepository, PostgresOrganizationDirectory,
            },
        },
        external_services::{
            HttpBusinessDataClient, InferenceClient, InferenceEmbeddingProvider, OpenAiChatClient,
            document_extractors::CompositeDocumentExtractor,
        },
        file_system::LocalFileStorage,
        messaging::{BackgroundProcessor, MpscJobQueue},
    },
    presentation::http::{
        HttpServer,
        handlers::{ConversationHandler, DocumentHandler, IvrHandler, SearchHandler, WebhookHandler},
    },
};

#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] DocumentProcessingError),
}

pub struct AppContainer {
    // Job queue and background processing
    pub job_queue: Arc<dyn JobQueue>,
    pub background_processor: Arc<BackgroundProcessor>,

    // HTTP handlers
    pub document_handler: Arc<DocumentHandler>,
    pub search_handler: Arc<SearchHandler>,
    pub conversation_handler: Arc<ConversationHandler>,
    pub webhook_handler: Arc<WebhookHandler>,
    pub ivr_handler: Arc<IvrHandler>,

    bind_address: String,
    max_body_bytes: usize,
}

impl AppContainer {
    pub fn new(config: &AppConfig, db_pool: DbPool) -> Result<Self, ContainerError> {
        // Repositories
        let document_repository: Arc<dyn DocumentRepository> =
            Arc::new(PostgresDocumentRepository::new(db_pool.clone()));
        let chunk_repository: Arc<dyn ChunkRepository> = Arc::new(PostgresChunkRepository::new(db_pool.clone()));
        let conversation_repository: Arc<dyn ConversationRepository> =
            Arc::new(PostgresConversationRepository::new(db_pool.clone()));
        let call_session_repository: Arc<dyn CallSessionRepository> =
            Arc::new(PostgresCallSessionRepository::new(db_pool.clone()));
        let directory: Arc<dyn OrganizationDirectory> = Arc::new(PostgresOrganizationDirectory::new(db_pool));

        // External services
        let embedding_provider: Arc<dyn EmbeddingProvider> = Arc::new(InferenceEmbeddingProvider::new(
            InferenceClient::new(config.embedding.clone())?,
        ));
        let language_model: Arc<dyn LanguageModel> = Arc::new(OpenAiChatClient::new(&config.generation)?);
        let business_data: Option<Arc<dyn BusinessDataSource>> =
            HttpBusinessDataClient::from_config(&config.business_data)?
                .map(|client| Arc::new(client) as Arc<dyn BusinessDataSource>);
        let file_storage: Arc<dyn FileStorage> =
            Arc::new(LocalFileStorage::new(PathBuf::from(&config.ingestion.upload_dir)));
        let document_extractor: Arc<dyn DocumentExtractor> = Arc::new(CompositeDocumentExtractor::new());

        // Ingestion
        let chunking = ChunkingOptions::new(
            config.ingestion.chunking.size_words,
            config.ingestion.chunking.overlap_words,
        )?;
        let document_processor = Arc::new(DocumentProcessorService::new(
            document_extractor.clone(),
            embedding_provider.clone(),
            chunk_repository.clone(),
            chunking,
            Duration::from_secs(config.ingestion.timeout_secs),
        ));

        let (job_queue, job_receiver) = MpscJobQueue::create_pair();
        let job_queue: Arc<dyn JobQueue> = Arc::new(job_queue);

        let process_document_use_case = Arc::new(ProcessDocumentUseCase::new(
            document_repository.clone(),
            document_processor,
            job_queue.clone(),
            Duration::from_secs(config.ingestion.timeout_secs),
        ));
        let background_processor = Arc::new(
            BackgroundProcessor::new(Arc::new(job_receiver), process_document_use_case.clone())
                .with_worker_count(config.ingestion.workers),
        );

        let upload_use_case = Arc::new(UploadDocumentUseCase::new(
            document_repository.clone(),
            file_storage.clone(),
            job_queue.clone(),
            directory.clone(),
        ));
        let get_document_use_case = Arc::new(GetDocumentUseCase::new(document_repository.clone()));
        let list_documents_use_case = Arc::new(ListDocumentsUseCase::new(document_repository.clone()));
        let get_chunks_use_case = Arc::new(GetDocumentChunksUseCase::new(
            document_repository.clone(),
            chunk_repository.clone(),
        ));

        // Retrieval and generation
        let retrieval_service = Arc::new(RetrievalService::new(
            embedding_provider.clone(),
            chunk_repository.clone(),
        ));
        let search_use_case = Arc::new(SearchKnowledgeUseCase::new(
            retrieval_service.clone(),
            config.generation.retrieval_top_k,
        ));
        let generator = Arc::new(ResponseGenerator::new(
            retrieval_service.clone(),
            language_model,
            business_data,
            GenerationSettings {
                top_k: config.generation.retrieval_top_k,
                timeout: Duration::from_secs(config.generation.timeout_secs),
                enrichment_timeout: Duration::from_secs(config.business_data.timeout_secs),
            },
        ));
        let conversation_service = Arc::new(ConversationService::new(
            conversation_repository,
            directory.clone(),
            generator,
            config.escalation,
            config.generation.history_limit,
        ));

        // Channels
        if config.channels.meta_app_secret.is_none() {
            warn!("META_APP_SECRET is not set, Meta webhook signatures will not be checked");
        }
        let graph = Arc::new(GraphApiClient::new(&config.channels)?);
        let verifier = MetaSignatureVerifier::new(config.channels.meta_app_secret.clone());
        let adapters: Vec<Arc<dyn ChannelAdapter>> = vec![
            Arc::new(WebWidgetAdapter),
            Arc::new(WhatsAppAdapter::new(graph.clone(), verifier.clone())),
            Arc::new(MessengerAdapter::facebook(graph.clone(), verifier.clone())),
            Arc::new(MessengerAdapter::instagram(graph, verifier)),
        ];
        let channel_router = Arc::new(ChannelRouter::new(
            adapters,
            directory.clone(),
            conversation_service.clone(),
        ));

        if config.ivr.twilio_auth_token.is_none() {
            warn!("TWILIO_AUTH_TOKEN is not set, IVR callback signatures will not be checked");
        }
        let ivr_engine = Arc::new(IvrEngine::new(
            call_session_repository,
            directory.clone(),
            conversation_service.clone(),
            config.ivr.support_number.clone(),
        ));

        // HTTP handlers
        let document_handler = Arc::new(DocumentHandler::new(
            upload_use_case,
            get_document_use_case,
            list_documents_use_case,
            get_chunks_use_case,
            process_document_use_case,
        ));
        let search_handler = Arc::new(SearchHandler::new(search_use_case));
        let conversation_handler = Arc::new(ConversationHandler::new(conversation_service));
        let webhook_handler = Arc::new(WebhookHandler::new(channel_router));
        let ivr_handler = Arc::new(IvrHandler::new(
            ivr_engine,
            TwilioSignatureValidator::new(config.ivr.twilio_auth_token.clone()),
            config.server.public_base_url.clone(),
        ));

        Ok(Self {
            job_queue,
            background_processor,
            document_handler,
            search_handler,
            conversation_handler,
            webhook_handler,
            ivr_handler,
            bind_address: config.bind_address(),
            max_body_bytes: config.server.max_body_bytes,
        })
    }

    pub fn into_server(self) -> HttpServer {
        HttpServer::new(
            self.document_handler,
            self.search_handler,
            self.conversation_handler,
            self.webhook_handler,
            self.ivr_handler,
            self.job_queue,
            self.background_processor,
            self.bind_address,
            self.max_body_bytes,
        )
    }
}
