use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::use_cases::search_knowledge::SearchKnowledgeResponse;

#[derive(Debug, Deserialize)]
pub struct SearchRequestDto {
    pub query: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResultDto {
    pub chunk_id: Uuid,
    pub document_id: Uuid,
    pub chunk_text: String,
    pub similarity: f32,
}

#[derive(Debug, Serialize)]
pub struct SearchResponseDto {
    pub query: String,
    pub results: Vec<SearchResultDto>,
    pub total_results: usize,
    pub search_time_ms: u64,
}

impl From<SearchKnowledgeResponse> for SearchResponseDto {
    fn from(response: SearchKnowledgeResponse) -> Self {
        let results: Vec<SearchResultDto> = response
            .results
            .into_iter()
            .map(|r| SearchResultDto {
                chunk_id: r.chunk_id,
                document_id: r.document_id,
                chunk_text: r.chunk_text,
                similarity: r.similarity,
            })
            .collect();

        Self {
            query: response.query,
            total_results: results.len(),
            results,
            search_time_ms: response.search_time_ms,
        }
    }
}
