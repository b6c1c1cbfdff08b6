use async_trait::async_trait;
use lopdf::Document;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, warn};

use crate::application::ports::document_extractor::{DocumentExtractionError, DocumentExtractor};
use crate::domain::value_objects::MediaType;

/// Page-by-page text extraction with lopdf. Pages are extracted in parallel
/// and joined in page order; pages without text are skipped.
pub struct PdfExtractor {
    password: String,
}

impl PdfExtractor {
    pub fn new() -> Self {
        Self {
            password: String::new(),
        }
    }

    pub fn with_password(password: String) -> Self {
        Self { password }
    }

    fn extract_pages(data: &[u8], password: &str) -> Result<String, DocumentExtractionError> {
        let mut doc = Document::load_mem(data)
            .map_err(|e| DocumentExtractionError::ExtractionFailed(e.to_string()))?;

        if doc.is_encrypted() {
            doc.decrypt(password).map_err(|_e| {
                DocumentExtractionError::ExtractionFailed(
                    "Failed to decrypt PDF - invalid password".to_string(),
                )
            })?;
        }

        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        let page_count = page_numbers.len();

        let extracted_pages: Vec<Result<String, String>> = page_numbers
            .into_par_iter()
            .map(|page_num| {
                doc.extract_text(&[page_num])
                    .map(|text| {
                        text.split('\n')
                            .map(str::trim_end)
                            .filter(|line| !line.is_empty())
                            .collect::<Vec<_>>()
                            .join("\n")
                    })
                    .map_err(|e| format!("page {}: {}", page_num, e))
            })
            .collect();

        let mut pages = Vec::with_capacity(page_count);
        let mut errors = Vec::new();
        for page in extracted_pages {
            match page {
                Ok(text) if !text.trim().is_empty() => pages.push(text),
                Ok(_) => {}
                Err(e) => errors.push(e),
            }
        }

        if !errors.is_empty() {
            if errors.len() == page_count {
                return Err(DocumentExtractionError::ExtractionFailed(format!(
                    "No page could be read: {}",
                    errors.join("; ")
                )));
            }
            warn!(
                "Skipped {} of {} PDF pages: {}",
                errors.len(),
                page_count,
                errors.join("; ")
            );
        }

        debug!("Extracted text from {} of {} PDF pages", pages.len(), page_count);
        Ok(pages.join("\n"))
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentExtractor for PdfExtractor {
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

        let data = data.to_vec();
        let password = self.password.clone();
        tokio::task::spawn_blocking(move || Self::extract_pages(&data, &password))
            .await
            .map_err(|e| DocumentExtractionError::ExtractionFailed(e.to_string()))?
    }

    fn supported_formats(&self) -> Vec<MediaType> {
        vec![MediaType::Pdf]
    }
}
