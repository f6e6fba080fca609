use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::application::ports::document_extractor::{
    DocumentExtractionError, DocumentExtractor, ExtractedContent,
};

pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const BODY_PART: &str = "word/document.xml";

/// Reads the text runs of a Word document, one line per paragraph.
pub struct DocxExtractor;

impl DocxExtractor {
    fn read_body(path: PathBuf) -> Result<String, DocumentExtractionError> {
        let file = std::fs::File::open(&path).map_err(|e| DocumentExtractionError::IoError(e.to_string()))?;
        let mut archive =
            zip::ZipArchive::new(file).map_err(|e| DocumentExtractionError::CorruptedFile(e.to_string()))?;
        let mut part = archive
            .by_name(BODY_PART)
            .map_err(|e| DocumentExtractionError::CorruptedFile(format!("{}: {}", BODY_PART, e)))?;

        let mut xml = String::new();
        part.read_to_string(&mut xml)
            .map_err(|e| DocumentExtractionError::CorruptedFile(e.to_string()))?;
        Ok(xml)
    }
}

pub fn paragraphs_from_xml(xml: &str) -> Result<String, DocumentExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut in_text = false;
    let mut paragraph = String::new();
    let mut paragraphs = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"w:t" => in_text = true,
            Ok(Event::Text(ref e)) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|err| DocumentExtractionError::CorruptedFile(err.to_string()))?;
                paragraph.push_str(&text);
            }
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"w:tab" => paragraph.push('\t'),
                b"w:br" => paragraph.push('\n'),
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => {
                    let text = paragraph.trim();
                    if !text.is_empty() {
                        paragraphs.push(text.to_string());
                    }
                    paragraph.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(DocumentExtractionError::CorruptedFile(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs.join("\n"))
}

#[async_trait]
impl DocumentExtractor for DocxExtractor {
    async fn extract_text(
        &self,
        file_path: &Path,
        _mime_type: &str,
    ) -> Result<ExtractedContent, DocumentExtractionError> {
        let path = file_path.to_path_buf();
        let xml = tokio::task::spawn_blocking(move || Self::read_body(path))
            .await
            .map_err(|e| DocumentExtractionError::ExtractionFailed(e.to_string()))??;

        Ok(ExtractedContent {
            text: paragraphs_from_xml(&xml)?,
            page_count: None,
        })
    }

    fn supported_formats(&self) -> Vec<String> {
        vec![DOCX_MIME.to_string()]
    }
}
