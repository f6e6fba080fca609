use async_trait::async_trait;
use std::path::Path;

use crate::application::ports::document_extractor::{
    DocumentExtractionError, DocumentExtractor, ExtractedContent,
};

pub const CSV_MIME: &str = "text/csv";

/// Plain text and markdown as-is; CSV rows flattened into
/// `header: value` lines so each row reads as a sentence.
pub struct TextExtractor;

impl TextExtractor {
    fn is_csv(mime_type: &str, file_path: &Path) -> bool {
        mime_type == CSV_MIME
            || mime_type == "application/csv"
            || file_path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
    }
}

#[async_trait]
impl DocumentExtractor for TextExtractor {
    async fn extract_text(
        &self,
        file_path: &Path,
        mime_type: &str,
    ) -> Result<ExtractedContent, DocumentExtractionError> {
        let bytes = tokio::fs::read(file_path)
            .await
            .map_err(|e| DocumentExtractionError::IoError(e.to_string()))?;
        let raw = String::from_utf8_lossy(&bytes);
        let raw = raw.trim_start_matches('\u{feff}');

        let text = if Self::is_csv(mime_type, file_path) {
            flatten_csv(raw)
        } else {
            raw.to_string()
        };

        Ok(ExtractedContent {
            text,
            page_count: Some(1),
        })
    }

    fn supported_formats(&self) -> Vec<String> {
        vec![
            "text/plain".to_string(),
            "text/markdown".to_string(),
            CSV_MIME.to_string(),
            "application/csv".to_string(),
        ]
    }
}

/// Turns `name,price\nShirt,500` into `name: Shirt, price: 500`.
pub fn flatten_csv(input: &str) -> String {
    let mut rows = input
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(split_csv_line);

    let Some(headers) = rows.next() else {
        return String::new();
    };

    rows.map(|row| {
        row.iter()
            .enumerate()
            .filter(|(_, value)| !value.is_empty())
            .map(|(i, value)| match headers.get(i).filter(|h| !h.is_empty()) {
                Some(header) => format!("{}: {}", header, value),
                None => value.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    })
    .filter(|line| !line.is_empty())
    .collect::<Vec<_>>()
    .join("\n")
}

fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field).trim().to_string()),
            _ => field.push(c),
        }
    }
    fields.push(field.trim().to_string());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_flatten_csv() {
        let csv = "product,price,stock\nShirt,500,12\n\"Panjabi, cotton\",1200,\n";
        assert_eq!(
            flatten_csv(csv),
            "product: Shirt, price: 500, stock: 12\nproduct: Panjabi, cotton, price: 1200"
        );
    }

    #[test]
    fn test_quoted_quotes() {
        assert_eq!(split_csv_line(r#"a,"say ""hi""",c"#), vec!["a", "say \"hi\"", "c"]);
    }

    #[test]
    fn test_header_only_csv_is_empty() {
        assert_eq!(flatten_csv("a,b\n"), "");
    }

    #[tokio::test]
    async fn test_plain_text_passthrough() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "\u{feff}Store hours: 10am to 8pm").unwrap();

        let content = TextExtractor.extract_text(file.path(), "text/plain").await.unwrap();
        assert_eq!(content.text, "Store hours: 10am to 8pm");
    }
}
