use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::application::ports::{
    DocumentExtractor, EmbeddingProvider,
};
use crate::domain::entities::{Document, DocumentChunk};
use crate::domain::repositories::ChunkRepository;

#[derive(Debug, thiserror::Error)]
pub enum DocumentProcessingError {
    #[error("{0}")]
    ExtractionError(String),
    #[error("Embedding error: {0}")]
    EmbeddingError(String),
    #[error("Repository error: {0}")]
    RepositoryError(String),
    #[error("Ingestion timed out after {0}s")]
    Timeout(u64),
    #[error("Invalid chunking configuration: {0}")]
    InvalidConfiguration(String),
}

/// Lines shorter than this after trimming are treated as headers, footers
/// or page numbers and dropped.
const MIN_LINE_CHARS: usize = 4;

const EMBEDDING_BATCH_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingOptions {
    pub size_words: usize,
    pub overlap_words: usize,
}

impl ChunkingOptions {
    pub fn new(size_words: usize, overlap_words: usize) -> Result<Self, DocumentProcessingError> {
        if size_words == 0 || overlap_words >= size_words {
            return Err(DocumentProcessingError::InvalidConfiguration(format!(
                "overlap {} must be smaller than window {}",
                overlap_words, size_words
            )));
        }
        Ok(Self {
            size_words,
            overlap_words,
        })
    }
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            size_words: 1000,
            overlap_words: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestionReport {
    pub text: String,
    pub chunks_created: usize,
    pub word_count: i32,
    pub page_count: i32,
}

pub struct DocumentProcessorService {
    document_extractor: Arc<dyn DocumentExtractor>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    chunk_repository: Arc<dyn ChunkRepository>,
    chunking: ChunkingOptions,
    timeout: Duration,
}

impl DocumentProcessorService {
    pub fn new(
        document_extractor: Arc<dyn DocumentExtractor>,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        chunk_repository: Arc<dyn ChunkRepository>,
        chunking: ChunkingOptions,
        timeout: Duration,
    ) -> Self {
        Self {
            document_extractor,
            embedding_provider,
            chunk_repository,
            chunking,
            timeout,
        }
    }

    /// Extracts, chunks and embeds the document, then swaps its chunk set.
    ///
    /// The deadline covers extraction and embedding only. Nothing is written
    /// until every chunk has its vector, so a timeout leaves the previous
    /// chunk set untouched.
    pub async fn process_document(
        &self,
        document: &Document,
    ) -> Result<IngestionReport, DocumentProcessingError> {
        let prepared = tokio::time::timeout(self.timeout, self.prepare(document))
            .await
            .map_err(|_| DocumentProcessingError::Timeout(self.timeout.as_secs()))??;

        let (report, chunks) = prepared;
        let stored = self
            .chunk_repository
            .replace_for_document(document.id(), &chunks)
            .await
            .map_err(|e| DocumentProcessingError::RepositoryError(e.to_string()))?;

        info!(
            document_id = %document.id(),
            chunks = stored,
            words = report.word_count,
            "Document chunks replaced"
        );

        Ok(report)
    }

    async fn prepare(
        &self,
        document: &Document,
    ) -> Result<(IngestionReport, Vec<DocumentChunk>), DocumentProcessingError> {
        let mime_type = document.mime_type().unwrap_or_default();
        let extracted = self
            .document_extractor
            .extract_text(Path::new(document.file_path()), mime_type)
            .await
            .map_err(|e| DocumentProcessingError::ExtractionError(e.to_string()))?;

        let text = normalize_text(&extracted.text);
        let windows = split_into_windows(&text, self.chunking);
        debug!(
            document_id = %document.id(),
            windows = windows.len(),
            "Split document into windows"
        );

        let chunks = self.embed_windows(document, windows).await?;
        let word_count = text.split_whitespace().count() as i32;

        Ok((
            IngestionReport {
                text,
                chunks_created: chunks.len(),
                word_count,
                page_count: extracted.page_count.unwrap_or(1),
            },
            chunks,
        ))
    }

    async fn embed_windows(
        &self,
        document: &Document,
        windows: Vec<String>,
    ) -> Result<Vec<DocumentChunk>, DocumentProcessingError> {
        let mut chunks = Vec::with_capacity(windows.len());

        for batch in windows.chunks(EMBEDDING_BATCH_SIZE) {
            let embeddings = self
                .embedding_provider
                .embed_passages(batch)
                .await
                .map_err(|e| DocumentProcessingError::EmbeddingError(e.to_string()))?;

            if embeddings.len() != batch.len() {
                return Err(DocumentProcessingError::EmbeddingError(format!(
                    "expected {} vectors, provider returned {}",
                    batch.len(),
                    embeddings.len()
                )));
            }

            for (text, embedding) in batch.iter().zip(embeddings) {
                let index = chunks.len() as i32;
                chunks.push(DocumentChunk::new(
                    document.id(),
                    document.organization_id(),
                    index,
                    text.clone(),
                    embedding,
                ));
            }
        }

        Ok(chunks)
    }
}

/// Collapses runs of whitespace and drops very short lines.
pub fn normalize_text(raw: &str) -> String {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| line.chars().count() >= MIN_LINE_CHARS)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Word windows of `size_words`, each starting `size_words - overlap_words`
/// after the previous one. The last window ends at the final word.
pub fn split_into_windows(text: &str, options: ChunkingOptions) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut windows = Vec::new();

    if words.is_empty() {
        return windows;
    }

    let step = options.size_words - options.overlap_words;
    let mut start = 0;

    loop {
        let end = std::cmp::min(start + options.size_words, words.len());
        windows.push(words[start..end].join(" "));

        if end >= words.len() {
            break;
        }
        start += step;
    }

    windows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::document_extractor::DocumentExtractionError;
    use crate::domain::value_objects::ContentHash;
    use crate::testing::{InMemoryChunkRepository, StaticExtractor, StubEmbeddingProvider};
    use uuid::Uuid;

    fn document(mime: &str) -> Document {
        Document::new(
            Uuid::new_v4(),
            "/uploads/doc".to_string(),
            "doc".to_string(),
            Some(mime.to_string()),
            10,
            ContentHash::of(b"doc"),
        )
    }

    #[test]
    fn test_normalize_text() {
        let raw = "  Refund   policy\n\n12\nItems can be   returned\twithin 7 days\n-- \n";
        assert_eq!(
            normalize_text(raw),
            "Refund policy\nItems can be returned within 7 days"
        );
    }

    #[test]
    fn test_windows_overlap() {
        let text = (0..25).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        let windows = split_into_windows(&text, ChunkingOptions::new(10, 4).unwrap());

        assert_eq!(windows.len(), 4);
        assert!(windows[0].starts_with("w0 "));
        assert!(windows[1].starts_with("w6 "));
        assert!(windows[3].ends_with("w24"));
        assert_eq!(windows[0].split_whitespace().count(), 10);
    }

    #[test]
    fn test_short_text_is_one_window() {
        let windows = split_into_windows("just a few words", ChunkingOptions::default());
        assert_eq!(windows, vec!["just a few words".to_string()]);
        assert!(split_into_windows("   ", ChunkingOptions::default()).is_empty());
    }

    #[test]
    fn test_invalid_chunking_options() {
        assert!(ChunkingOptions::new(100, 100).is_err());
        assert!(ChunkingOptions::new(0, 0).is_err());
    }

    #[tokio::test]
    async fn test_process_document_replaces_chunks() {
        let repository = Arc::new(InMemoryChunkRepository::default());
        let service = DocumentProcessorService::new(
            Arc::new(StaticExtractor::text("Shipping takes three days inside Dhaka.")),
            Arc::new(StubEmbeddingProvider::default()),
            repository.clone(),
            ChunkingOptions::new(4, 1).unwrap(),
            Duration::from_secs(5),
        );
        let document = document("text/plain");

        let report = service.process_document(&document).await.unwrap();
        assert_eq!(report.word_count, 6);
        assert_eq!(report.chunks_created, 2);
        assert_eq!(repository.chunks_for(document.id()).len(), 2);

        service.process_document(&document).await.unwrap();
        assert_eq!(repository.chunks_for(document.id()).len(), 2);
    }

    #[tokio::test]
    async fn test_extraction_failure_keeps_old_chunks() {
        let repository = Arc::new(InMemoryChunkRepository::default());
        let document = document("image/png");
        let good = DocumentProcessorService::new(
            Arc::new(StaticExtractor::text("Opening hours are nine to five daily.")),
            Arc::new(StubEmbeddingProvider::default()),
            repository.clone(),
            ChunkingOptions::default(),
            Duration::from_secs(5),
        );
        good.process_document(&document).await.unwrap();

        let failing = DocumentProcessorService::new(
            Arc::new(StaticExtractor::failing(DocumentExtractionError::UnsupportedFormat(
                "image/png".to_string(),
            ))),
            Arc::new(StubEmbeddingProvider::default()),
            repository.clone(),
            ChunkingOptions::default(),
            Duration::from_secs(5),
        );
        let error = failing.process_document(&document).await.unwrap_err();

        assert_eq!(error.to_string(), "Unsupported format: image/png");
        assert_eq!(repository.chunks_for(document.id()).len(), 1);
    }
}
