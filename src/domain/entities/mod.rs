pub mod call_session;
pub mod conversation;
pub mod document;
pub mod document_chunk;
pub mod message;
pub mod organization;

pub use call_session::{CallSession, CallState, InputOutcome};
pub use conversation::{Conversation, TurnVerdict};
pub use document::Document;
pub use document_chunk::DocumentChunk;
pub use message::Message;
pub use organization::{AgentProfile, ChannelIntegration, Organization, UsageLimits};
