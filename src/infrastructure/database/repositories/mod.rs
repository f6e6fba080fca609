pub mod postgres_call_session_repository;
pub mod postgres_chunk_repository;
pub mod postgres_conversation_repository;
pub mod postgres_document_repository;
pub mod postgres_organization_directory;

pub use postgres_call_session_repository::PostgresCallSessionRepository;
pub use postgres_chunk_repository::PostgresChunkRepository;
pub use postgres_conversation_repository::PostgresConversationRepository;
pub use postgres_document_repository::PostgresDocumentRepository;
pub use postgres_organization_directory::PostgresOrganizationDirectory;
