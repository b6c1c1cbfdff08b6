use async_trait::async_trait;

use crate::domain::value_objects::MediaType;

/// Extraction outcome for a single upload. `UnsupportedFormat` is permanent
/// and must not be retried; `ExtractionFailed` covers corrupt or undecodable
/// content.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentExtractionError {
    UnsupportedFormat(String),
    ExtractionFailed(String),
}

impl DocumentExtractionError {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, DocumentExtractionError::UnsupportedFormat(_))
    }
}

impl std::fmt::Display for DocumentExtractionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentExtractionError::UnsupportedFormat(format) => {
                write!(f, "Unsupported file type: {}", format)
            }
            DocumentExtractionError::ExtractionFailed(msg) => {
                write!(f, "Extraction failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for DocumentExtractionError {}

#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract_text_from_bytes(
        &self,
        data: &[u8],
        media_type: &MediaType,
    ) -> Result<String, DocumentExtractionError>;

    fn supported_formats(&self) -> Vec<MediaType>;

    fn can_extract(&self, media_type: &MediaType) -> bool {
        self.supported_formats().contains(media_type)
    }
}
