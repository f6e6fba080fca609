pub mod business_data;
pub mod channel_adapter;
pub mod document_extractor;
pub mod embedding_provider;
pub mod file_storage;
pub mod job_queue;
pub mod language_model;
pub mod organization_directory;

pub use business_data::BusinessDataSource;
pub use channel_adapter::ChannelAdapter;
pub use document_extractor::DocumentExtractor;
pub use embedding_provider::EmbeddingProvider;
pub use file_storage::FileStorage;
pub use job_queue::JobQueue;
pub use language_model::LanguageModel;
pub use organization_directory::OrganizationDirectory;
