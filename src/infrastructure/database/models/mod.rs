pub mod call_session_model;
pub mod chunk_model;
pub mod conversation_model;
pub mod document_model;
pub mod organization_model;

pub use call_session_model::CallSessionModel;
pub use chunk_model::{DocumentChunkModel, NewDocumentChunkModel};
pub use conversation_model::{
    ConversationModel, ConversationStateChangeset, MessageModel, NewConversationModel, NewMessageModel,
};
pub use document_model::{DocumentModel, NewDocumentModel};
pub use organization_model::{AgentModel, ChannelIntegrationModel, OrganizationModel};
