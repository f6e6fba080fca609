use async_trait::async_trait;
use lopdf::{Document, Object};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::application::ports::document_extractor::{
    DocumentExtractionError, DocumentExtractor, ExtractedContent,
};

pub const PDF_MIME: &str = "application/pdf";

pub struct PdfExtractor {
    password: String,
}

impl PdfExtractor {
    pub fn new() -> Self {
        Self {
            password: String::new(),
        }
    }

    /// Drops dictionary keys that never carry text to keep large scans cheap to load.
    fn filter_func(object_id: (u32, u16), object: &mut Object) -> Option<((u32, u16), Object)> {
        static IGNORE: &[&[u8]] = &[
            b"Length",
            b"BBox",
            b"Matrix",
            b"Filter",
            b"ColorSpace",
            b"Width",
            b"Height",
            b"BitsPerComponent",
            b"PTEX.FileName",
            b"PTEX.PageNumber",
            b"PTEX.InfoDict",
            b"FontDescriptor",
            b"ExtGState",
            b"MediaBox",
        ];

        if let Object::Dictionary(dict) = object {
            let keys_to_remove: Vec<_> = dict
                .iter()
                .filter(|(key, _)| IGNORE.contains(&key.as_slice()))
                .map(|(key, _)| key.clone())
                .collect();
            for key in keys_to_remove {
                dict.remove(&key);
            }
        }

        Some((object_id, object.to_owned()))
    }

    fn extract_blocking(path: PathBuf, password: String) -> Result<ExtractedContent, DocumentExtractionError> {
        let mut doc = Document::load_filtered(&path, Self::filter_func)
            .map_err(|e| DocumentExtractionError::CorruptedFile(e.to_string()))?;

        if doc.is_encrypted() {
            doc.decrypt(&password).map_err(|_| {
                DocumentExtractionError::ExtractionFailed("Failed to decrypt PDF".to_string())
            })?;
        }

        let pages = doc.get_pages();
        let page_count = pages.len() as i32;

        let mut extracted: Vec<(u32, Result<String, String>)> = pages
            .into_par_iter()
            .map(|(page_num, _)| {
                let text = doc
                    .extract_text(&[page_num])
                    .map_err(|e| format!("page {}: {}", page_num, e));
                (page_num, text)
            })
            .collect();
        extracted.sort_by_key(|(page_num, _)| *page_num);

        let mut lines = Vec::new();
        for (page_num, result) in extracted {
            match result {
                Ok(text) => lines.extend(
                    text.lines()
                        .map(|l| l.trim_end().to_string())
                        .filter(|l| !l.is_empty()),
                ),
                Err(e) => warn!(page = page_num, error = %e, "Skipping unreadable PDF page"),
            }
        }

        if lines.is_empty() {
            // Image-only scans have pages but no text layer
            return Err(DocumentExtractionError::ExtractionFailed(
                "No text layer found in PDF".to_string(),
            ));
        }

        Ok(ExtractedContent {
            text: lines.join("\n"),
            page_count: Some(page_count),
        })
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentExtractor for PdfExtractor {
    async fn extract_text(
        &self,
        file_path: &Path,
        _mime_type: &str,
    ) -> Result<ExtractedContent, DocumentExtractionError> {
        let path = file_path.to_path_buf();
        let password = self.password.clone();

        tokio::task::spawn_blocking(move || Self::extract_blocking(path, password))
            .await
            .map_err(|e| DocumentExtractionError::ExtractionFailed(e.to_string()))?
    }

    fn supported_formats(&self) -> Vec<String> {
        vec![PDF_MIME.to_string()]
    }
}
