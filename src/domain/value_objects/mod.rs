pub mod channel;
pub mod content_hash;
pub mod conversation_status;
pub mod document_status;
pub mod escalation_policy;
pub mod intent;
pub mod ivr_menu;
pub mod language;
pub mod similarity;

pub use channel::Channel;
pub use content_hash::ContentHash;
pub use conversation_status::{ConversationStatus, SenderType};
pub use document_status::DocumentStatus;
pub use escalation_policy::EscalationPolicy;
pub use intent::Intent;
pub use ivr_menu::IvrMenu;
pub use language::Language;
