pub mod get_document;
pub mod get_document_chunks;
pub mod list_documents;
pub mod process_document;
pub mod search_knowledge;
pub mod upload_document;

pub use get_document::GetDocumentUseCase;
pub use get_document_chunks::GetDocumentChunksUseCase;
pub use list_documents::ListDocumentsUseCase;
pub use process_document::ProcessDocumentUseCase;
pub use search_knowledge::SearchKnowledgeUseCase;
pub use upload_document::UploadDocumentUseCase;
