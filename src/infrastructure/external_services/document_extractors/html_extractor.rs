use async_trait::async_trait;
use html2text::from_read;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use crate::application::ports::document_extractor::{
    DocumentExtractionError, DocumentExtractor, ExtractedContent,
};

const TEXT_WIDTH: usize = 100;

static TITLE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>([^<]+)</title>").ok());

pub struct HtmlExtractor;

impl HtmlExtractor {
    pub fn new() -> Self {
        Self
    }

    fn html_to_text(html_content: &str) -> Result<String, DocumentExtractionError> {
        let body = from_read(html_content.as_bytes(), TEXT_WIDTH).map_err(|e| {
            DocumentExtractionError::ExtractionFailed(format!("Failed to convert HTML to text: {}", e))
        })?;

        // html2text drops <head>, so the page title is carried over by hand
        Ok(match extract_title_from_html(html_content) {
            Some(title) if !body.contains(&title) => format!("{}\n\n{}", title, body.trim()),
            _ => body.trim().to_string(),
        })
    }
}

impl Default for HtmlExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentExtractor for HtmlExtractor {
    async fn extract_text(
        &self,
        file_path: &Path,
        _mime_type: &str,
    ) -> Result<ExtractedContent, DocumentExtractionError> {
        let bytes = tokio::fs::read(file_path)
            .await
            .map_err(|e| DocumentExtractionError::IoError(e.to_string()))?;
        let html_content = String::from_utf8_lossy(&bytes);

        Ok(ExtractedContent {
            text: Self::html_to_text(&html_content)?,
            page_count: Some(1),
        })
    }

    fn supported_formats(&self) -> Vec<String> {
        vec!["text/html".to_string(), "application/xhtml+xml".to_string()]
    }
}

fn extract_title_from_html(html: &str) -> Option<String> {
    TITLE
        .as_ref()?
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty())
}
