pub mod channel_routes;
pub mod conversation_routes;
pub mod document_routes;
pub mod health_routes;
pub mod search_routes;

pub use channel_routes::*;
pub use conversation_routes::*;
pub use document_routes::*;
pub use health_routes::*;
pub use search_routes::*;
