use async_trait::async_trait;
use image::ImageFormat;
use std::io::Cursor;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::application::ports::document_extractor::{DocumentExtractionError, DocumentExtractor};
use crate::domain::value_objects::MediaType;

/// OCR through the `tesseract` CLI. Images are decoded first so corrupt
/// input fails before a process is spawned, then handed over as PNG on
/// stdin.
pub struct ImageOcrExtractor {
    binary: String,
    language: String,
}

impl ImageOcrExtractor {
    pub fn new() -> Self {
        Self {
            binary: "tesseract".to_string(),
            language: "eng".to_string(),
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    fn normalise_to_png(data: &[u8]) -> Result<Vec<u8>, DocumentExtractionError> {
        let image = image::load_from_memory(data)
            .map_err(|e| DocumentExtractionError::ExtractionFailed(format!("Cannot decode image: {}", e)))?;

        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| DocumentExtractionError::ExtractionFailed(e.to_string()))?;
        Ok(png)
    }

    async fn run_tesseract(&self, png: Vec<u8>) -> Result<String, DocumentExtractionError> {
        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", &self.language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                DocumentExtractionError::ExtractionFailed(format!(
                    "Failed to start {}: {}",
                    self.binary, e
                ))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&png)
                .await
                .map_err(|e| DocumentExtractionError::ExtractionFailed(e.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| DocumentExtractionError::ExtractionFailed(e.to_string()))?;

        if !output.status.success() {
            return Err(DocumentExtractionError::ExtractionFailed(format!(
                "OCR exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        debug!("OCR produced {} characters", text.len());
        Ok(text)
    }
}

impl Default for ImageOcrExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentExtractor for ImageOcrExtractor {
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
        let png = tokio::task::spawn_blocking(move || Self::normalise_to_png(&data))
            .await
            .map_err(|e| DocumentExtractionError::ExtractionFailed(e.to_string()))??;

        self.run_tesseract(png).await
    }

    fn supported_formats(&self) -> Vec<MediaType> {
        vec![MediaType::Png, MediaType::Jpeg, MediaType::Webp]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_png() -> Vec<u8> {
        let image = image::RgbImage::new(4, 4);
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        png
    }

    #[tokio::test]
    async fn test_undecodable_image_fails_before_ocr() {
        let error = ImageOcrExtractor::new()
            .with_binary("/nonexistent/tesseract")
            .extract_text_from_bytes(b"not an image", &MediaType::Png)
            .await
            .unwrap_err();

        assert!(error.to_string().contains("Cannot decode image"));
    }

    #[tokio::test]
    async fn test_missing_ocr_binary_is_an_extraction_failure() {
        let error = ImageOcrExtractor::new()
            .with_binary("/nonexistent/tesseract")
            .extract_text_from_bytes(&tiny_png(), &MediaType::Png)
            .await
            .unwrap_err();

        assert!(matches!(error, DocumentExtractionError::ExtractionFailed(ref msg) if msg.contains("Failed to start")));
    }
}
