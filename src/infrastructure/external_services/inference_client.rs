use async_trait::async_trait;
use pgvector::Vector;
use reqwest::{Client, Error as ReqwestError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::application::ports::embedding_provider::{EmbeddingError, EmbeddingProvider};
use crate::config::EmbeddingConfig;

#[derive(Serialize)]
pub struct EmbeddingsRequest {
    pub text: TextInput,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextInput {
    Single(String),
    Multiple(Vec<String>),
}

#[derive(Deserialize)]
pub struct EmbeddingsResponse {
    pub success: bool,
    pub embeddings: Vec<Vector>,
}

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingsError {
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Service returned {status}: {body}")]
    HttpStatus { status: u16, body: String },
}

impl From<EmbeddingsError> for EmbeddingError {
    fn from(error: EmbeddingsError) -> Self {
        match error {
            EmbeddingsError::RequestError(msg) => EmbeddingError::Unavailable(msg),
            EmbeddingsError::HttpStatus { status, body } if status >= 500 => {
                EmbeddingError::Unavailable(format!("HTTP {}: {}", status, body))
            }
            other => EmbeddingError::Rejected(other.to_string()),
        }
    }
}

/// HTTP client for the embedding inference service, retrying with
/// exponential backoff.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    client: Client,
    config: EmbeddingConfig,
}

impl InferenceClient {
    pub fn new(config: EmbeddingConfig) -> Result<Self, ReqwestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub async fn get_embedding(&self, text: &str) -> Result<EmbeddingsResponse, EmbeddingsError> {
        let request = EmbeddingsRequest {
            text: TextInput::Single(text.to_string()),
        };

        self.send_request(request).await
    }

    pub async fn get_embeddings(&self, texts: &[String]) -> Result<EmbeddingsResponse, EmbeddingsError> {
        let request = EmbeddingsRequest {
            text: TextInput::Multiple(texts.to_vec()),
        };

        self.send_request(request).await
    }

    async fn send_request(&self, request: EmbeddingsRequest) -> Result<EmbeddingsResponse, EmbeddingsError> {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.execute_request(&request).await {
                Ok(response) => return Ok(response),
                Err(e) if attempts > self.config.max_retries || !is_retryable(&e) => return Err(e),
                Err(e) => {
                    let backoff_time = backoff(self.config.backoff_factor, attempts);
                    warn!(attempt = attempts, error = %e, "Embedding request failed, retrying in {:?}", backoff_time);
                    tokio::time::sleep(backoff_time).await;
                }
            }
        }
    }

    async fn execute_request(&self, request: &EmbeddingsRequest) -> Result<EmbeddingsResponse, EmbeddingsError> {
        let response = self
            .client
            .post(&self.config.service_url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| EmbeddingsError::RequestError(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingsError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed = response
            .json::<EmbeddingsResponse>()
            .await
            .map_err(|e| EmbeddingsError::ParseError(e.to_string()))?;

        if !parsed.success {
            return Err(EmbeddingsError::ParseError(
                "Service reported an unsuccessful embedding run".to_string(),
            ));
        }

        Ok(parsed)
    }
}

fn is_retryable(error: &EmbeddingsError) -> bool {
    match error {
        EmbeddingsError::RequestError(_) => true,
        EmbeddingsError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
        EmbeddingsError::ParseError(_) => false,
    }
}

fn backoff(factor: f64, attempt: u32) -> Duration {
    Duration::from_millis((factor.powi(attempt as i32 - 1) * 1000.0) as u64)
}

pub struct InferenceEmbeddingProvider {
    client: InferenceClient,
}

impl InferenceEmbeddingProvider {
    pub fn new(client: InferenceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EmbeddingProvider for InferenceEmbeddingProvider {
    async fn embed_query(&self, text: &str) -> Result<Vector, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        self.client
            .get_embedding(text)
            .await?
            .embeddings
            .into_iter()
            .next()
            .ok_or(EmbeddingError::CountMismatch { expected: 1, got: 0 })
    }

    async fn embed_passages(&self, passages: &[String]) -> Result<Vec<Vector>, EmbeddingError> {
        if passages.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self.client.get_embeddings(passages).await?.embeddings;
        if embeddings.len() != passages.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: passages.len(),
                got: embeddings.len(),
            });
        }
        Ok(embeddings)
    }
}
