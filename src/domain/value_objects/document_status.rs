use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DocumentStatus {
    Uploaded,
    Processing,
    Completed,
    Failed(String),
}

impl DocumentStatus {
    pub fn is_processing(&self) -> bool {
        matches!(self, DocumentStatus::Processing)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, DocumentStatus::Completed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DocumentStatus::Failed(_))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DocumentStatus::Completed | DocumentStatus::Failed(_))
    }

    pub fn can_transition_to(&self, new_status: &DocumentStatus) -> bool {
        match (self, new_status) {
            (DocumentStatus::Uploaded, DocumentStatus::Processing) => true,
            (DocumentStatus::Processing, DocumentStatus::Completed) => true,
            (DocumentStatus::Processing, DocumentStatus::Failed(_)) => true,
            // Reprocessing
            (DocumentStatus::Completed, DocumentStatus::Processing) => true,
            (DocumentStatus::Failed(_), DocumentStatus::Processing) => true,
            _ => false,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            DocumentStatus::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Uploaded => "uploaded",
            DocumentStatus::Processing => "processing",
            DocumentStatus::Completed => "completed",
            // The error text lives in its own column
            DocumentStatus::Failed(_) => "failed",
        }
    }

    /// Rebuilds a status from its column value and the separately stored error message.
    pub fn from_parts(status: &str, error_message: Option<String>) -> Result<Self, String> {
        match status.to_lowercase().as_str() {
            "uploaded" => Ok(DocumentStatus::Uploaded),
            "processing" => Ok(DocumentStatus::Processing),
            "completed" => Ok(DocumentStatus::Completed),
            "failed" => Ok(DocumentStatus::Failed(
                error_message.unwrap_or_else(|| "Unknown error".to_string()),
            )),
            other => Err(format!("Invalid document status: {}", other)),
        }
    }
}

impl Default for DocumentStatus {
    fn default() -> Self {
        DocumentStatus::Uploaded
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
