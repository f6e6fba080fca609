use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use crate::application::ports::language_model::{
    ChatMessage, ChatRole, CompletionRequest, CompletionResponse, LanguageModel, LanguageModelError,
};
use crate::config::GenerationConfig;

/// Chat-completions client for any OpenAI-compatible endpoint.
pub struct OpenAiChatClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiChatClient {
    pub fn new(config: &GenerationConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    fn request_body(&self, request: &CompletionRequest) -> Value {
        let mut messages = Vec::with_capacity(request.history.len() + 2);
        messages.push(ChatMessage::new(ChatRole::System, request.system_prompt.clone()));
        messages.extend(request.history.iter().cloned());
        messages.push(ChatMessage::new(ChatRole::User, request.user_text.clone()));

        json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "stream": false,
        })
    }
}

fn parse_response(body: &Value) -> Result<CompletionResponse, LanguageModelError> {
    let text = body
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| LanguageModelError::ParseError("No message content in response".to_string()))?;

    let text = text.trim();
    if text.is_empty() {
        return Err(LanguageModelError::EmptyResponse);
    }

    Ok(CompletionResponse { text: text.to_string() })
}

#[async_trait]
impl LanguageModel for OpenAiChatClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LanguageModelError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.request_body(&request);

        debug!(url = %url, model = %self.model, history = request.history.len(), "Sending completion request");

        let mut builder = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| LanguageModelError::NetworkError(e.without_url().to_string()))?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .map_err(|e| LanguageModelError::NetworkError(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(LanguageModelError::ApiError {
                status: status.as_u16(),
                message: response_body,
            });
        }

        let json: Value = serde_json::from_str(&response_body)
            .map_err(|e| LanguageModelError::ParseError(format!("Invalid JSON: {}", e)))?;

        parse_response(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenAiChatClient {
        OpenAiChatClient::new(&GenerationConfig {
            api_base: "http://localhost:8080/v1/".to_string(),
            api_key: None,
            model: "test-model".to_string(),
            timeout_secs: 5,
            history_limit: 6,
            retrieval_top_k: 3,
        })
        .unwrap()
    }

    #[test]
    fn test_request_body_orders_turns() {
        let request = CompletionRequest {
            system_prompt: "Be helpful".to_string(),
            history: vec![
                ChatMessage::new(ChatRole::User, "hi"),
                ChatMessage::new(ChatRole::Assistant, "hello"),
            ],
            user_text: "where is my order?".to_string(),
            max_tokens: 200,
            temperature: 0.2,
        };

        let body = client().request_body(&request);
        let roles: Vec<&str> = body["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["role"].as_str().unwrap())
            .collect();

        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert_eq!(body["messages"][3]["content"], "where is my order?");
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["max_tokens"], 200);
    }

    #[test]
    fn test_base_url_is_normalized() {
        assert_eq!(client().base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn test_parse_text_response() {
        let body = json!({"choices": [{"message": {"role": "assistant", "content": " Sure! "}}]});
        assert_eq!(parse_response(&body).unwrap().text, "Sure!");
    }

    #[test]
    fn test_parse_empty_and_missing_content() {
        let empty = json!({"choices": [{"message": {"content": "   "}}]});
        assert!(matches!(parse_response(&empty), Err(LanguageModelError::EmptyResponse)));

        let missing = json!({"choices": []});
        assert!(matches!(parse_response(&missing), Err(LanguageModelError::ParseError(_))));
    }
}
