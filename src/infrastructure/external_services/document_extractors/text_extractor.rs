use async_trait::async_trait;

use crate::application::ports::document_extractor::{DocumentExtractionError, DocumentExtractor};
use crate::domain::value_objects::MediaType;

pub struct PlainTextExtractor;

#[async_trait]
impl DocumentExtractor for PlainTextExtractor {
    async fn extract_text_from_bytes(
        &self,
        data: &[u8],
        media_type: &MediaType,
    ) -> Result<String, DocumentExtractionError> {
        if !self.can_extract(media_type) {
            return Err(DocumentExtractionError::UnsupportedFormat(
                media_type.to_string(),
            ));
        }

        String::from_utf8(data.to_vec())
            .map_err(|e| DocumentExtractionError::ExtractionFailed(format!("Invalid UTF-8: {}", e)))
    }

    fn supported_formats(&self) -> Vec<MediaType> {
        vec![MediaType::PlainText]
    }
}
