use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use super::{DocxExtractor, HtmlExtractor, PdfExtractor, TextExtractor};
use crate::application::ports::document_extractor::{
    DocumentExtractionError, DocumentExtractor, ExtractedContent,
};
use crate::application::use_cases::upload_document::mime_from_extension;

/// Routes each document to the extractor for its MIME type, falling back
/// to the file extension when the declared type is missing or unknown.
pub struct CompositeDocumentExtractor {
    extractors: Vec<Arc<dyn DocumentExtractor>>,
}

impl CompositeDocumentExtractor {
    pub fn new() -> Self {
        Self {
            extractors: vec![
                Arc::new(PdfExtractor::new()),
                Arc::new(DocxExtractor),
                Arc::new(HtmlExtractor::new()),
                Arc::new(TextExtractor),
            ],
        }
    }

    fn get_extractor_for_type(&self, mime_type: &str) -> Option<&Arc<dyn DocumentExtractor>> {
        self.extractors.iter().find(|e| e.can_extract(mime_type))
    }

    fn resolve_type(&self, file_path: &Path, declared: &str) -> Option<String> {
        let declared = declared
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if self.get_extractor_for_type(&declared).is_some() {
            return Some(declared);
        }

        let file_name = file_path.file_name()?.to_str()?;
        mime_from_extension(file_name).map(str::to_string)
    }
}

impl Default for CompositeDocumentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentExtractor for CompositeDocumentExtractor {
    async fn extract_text(
        &self,
        file_path: &Path,
        mime_type: &str,
    ) -> Result<ExtractedContent, DocumentExtractionError> {
        let resolved = self.resolve_type(file_path, mime_type).ok_or_else(|| {
            DocumentExtractionError::UnsupportedFormat(if mime_type.is_empty() {
                "unknown".to_string()
            } else {
                mime_type.to_string()
            })
        })?;

        let extractor = self
            .get_extractor_for_type(&resolved)
            .ok_or_else(|| DocumentExtractionError::UnsupportedFormat(resolved.clone()))?;

        extractor.extract_text(file_path, &resolved).await
    }

    fn supported_formats(&self) -> Vec<String> {
        self.extractors.iter().flat_map(|e| e.supported_formats()).collect()
    }
}
