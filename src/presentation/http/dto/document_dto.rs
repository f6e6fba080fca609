use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::use_cases::get_document_chunks::GetDocumentChunksResponse;
use crate::domain::entities::{Document, DocumentChunk};

#[derive(Debug, Serialize)]
pub struct DocumentResponseDto {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub file_name: String,
    pub mime_type: Option<String>,
    pub file_size: i64,
    pub content_hash: String,
    pub status: String,
    pub error_message: Option<String>,
    pub word_count: i32,
    pub page_count: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Document> for DocumentResponseDto {
    fn from(document: Document) -> Self {
        Self {
            id: document.id(),
            organization_id: document.organization_id(),
            file_name: document.file_name().to_string(),
            mime_type: document.mime_type().map(str::to_string),
            file_size: document.file_size(),
            content_hash: document.content_hash().as_str().to_string(),
            status: document.status().as_str().to_string(),
            error_message: document.status().error_message().map(str::to_string),
            word_count: document.word_count(),
            page_count: document.page_count(),
            created_at: document.created_at().to_rfc3339(),
            updated_at: document.updated_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PaginationDto {
    #[serde(default = "default_skip")]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_skip() -> i64 {
    0
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize)]
pub struct PaginationMetaDto {
    pub offset: i64,
    pub limit: i64,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct DocumentListResponseDto {
    pub documents: Vec<DocumentResponseDto>,
    pub meta: PaginationMetaDto,
}

#[derive(Debug, Serialize)]
pub struct ChunkDto {
    pub id: Uuid,
    pub chunk_index: i32,
    pub chunk_text: String,
    pub word_count: i32,
    pub dimension: usize,
}

impl From<DocumentChunk> for ChunkDto {
    fn from(chunk: DocumentChunk) -> Self {
        Self {
            id: chunk.id(),
            chunk_index: chunk.chunk_index(),
            dimension: chunk.dimension(),
            word_count: chunk.word_count(),
            chunk_text: chunk.chunk_text().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentChunksResponseDto {
    pub document_id: Uuid,
    pub chunks: Vec<ChunkDto>,
    pub meta: PaginationMetaDto,
}

impl From<GetDocumentChunksResponse> for DocumentChunksResponseDto {
    fn from(response: GetDocumentChunksResponse) -> Self {
        Self {
            document_id: response.document_id,
            chunks: response.chunks.into_iter().map(ChunkDto::from).collect(),
            meta: PaginationMetaDto {
                offset: response.skip,
                limit: response.limit,
                total: response.total_chunks,
            },
        }
    }
}
