use async_trait::async_trait;
use std::sync::Arc;

use super::{DocxExtractor, ImageOcrExtractor, PdfExtractor, PlainTextExtractor};
use crate::application::ports::document_extractor::{DocumentExtractionError, DocumentExtractor};
use crate::domain::value_objects::MediaType;

/// Dispatches on the declared media type and trims whatever the chosen
/// extractor returns.
pub struct CompositeDocumentExtractor {
    extractors: Vec<Arc<dyn DocumentExtractor>>,
}

impl CompositeDocumentExtractor {
    pub fn new() -> Result<Self, DocumentExtractionError> {
        Ok(Self::with_extractors(vec![
            Arc::new(PdfExtractor::new()),
            Arc::new(DocxExtractor::new()?),
            Arc::new(ImageOcrExtractor::new()),
            Arc::new(PlainTextExtractor),
        ]))
    }

    pub fn with_extractors(extractors: Vec<Arc<dyn DocumentExtractor>>) -> Self {
        Self { extractors }
    }

    fn get_extractor_for_type(&self, media_type: &MediaType) -> Option<Arc<dyn DocumentExtractor>> {
        self.extractors
            .iter()
            .find(|extractor| extractor.can_extract(media_type))
            .cloned()
    }
}

#[async_trait]
impl DocumentExtractor for CompositeDocumentExtractor {
    async fn extract_text_from_bytes(
        &self,
        data: &[u8],
        media_type: &MediaType,
    ) -> Result<String, DocumentExtractionError> {
        let extractor = self
            .get_extractor_for_type(media_type)
            .ok_or_else(|| DocumentExtractionError::UnsupportedFormat(media_type.to_string()))?;

        let text = extractor.extract_text_from_bytes(data, media_type).await?;
        Ok(text.trim().to_string())
    }

    fn supported_formats(&self) -> Vec<MediaType> {
        self.extractors
            .iter()
            .flat_map(|extractor| extractor.supported_formats())
            .collect()
    }
}
