pub mod channel_router;
pub mod conversation_service;
pub mod document_processor;
pub mod ivr_engine;
pub mod keyed_locks;
pub mod response_generator;
pub mod retrieval_service;

pub use channel_router::ChannelRouter;
pub use conversation_service::ConversationService;
pub use document_processor::DocumentProcessorService;
pub use ivr_engine::IvrEngine;
pub use response_generator::ResponseGenerator;
pub use retrieval_service::RetrievalService;
