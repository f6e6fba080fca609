pub mod business_data_client;
pub mod document_extractors;
pub mod inference_client;
pub mod openai_chat_client;

pub use business_data_client::HttpBusinessDataClient;
pub use inference_client::{InferenceClient, InferenceEmbeddingProvider};
pub use openai_chat_client::OpenAiChatClient;
