pub mod conversation_handler;
pub mod document_handler;
pub mod ivr_handler;
pub mod search_handler;
pub mod webhook_handler;

pub use conversation_handler::ConversationHandler;
pub use document_handler::DocumentHandler;
pub use ivr_handler::IvrHandler;
pub use search_handler::SearchHandler;
pub use webhook_handler::WebhookHandler;
