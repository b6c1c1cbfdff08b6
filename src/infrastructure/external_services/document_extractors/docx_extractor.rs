use async_trait::async_trait;
use regex::Regex;
use std::io::{Cursor, Read};

use crate::application::ports::document_extractor::{DocumentExtractionError, DocumentExtractor};
use crate::domain::value_objects::MediaType;

const DOCUMENT_PART: &str = "word/document.xml";

/// Reads the main document part of a DOCX archive and returns one line per
/// paragraph. Tabs and line breaks inside a paragraph become whitespace.
pub struct DocxExtractor {
    paragraph: Regex,
    run_content: Regex,
    entity: Regex,
}

impl DocxExtractor {
    pub fn new() -> Result<Self, DocumentExtractionError> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| DocumentExtractionError::ExtractionFailed(e.to_string()))
        };

        Ok(Self {
            paragraph: compile(r"(?s)<w:p[ >].*?</w:p>")?,
            // Paragraph properties come first so their tab stops are skipped.
            run_content: compile(
                r"(?s)<w:pPr>.*?</w:pPr>|<w:t(?:\s[^>]*)?>(.*?)</w:t>|<w:(tab|br|cr)\b[^>]*/>",
            )?,
            entity: compile(r"&(#x[0-9a-fA-F]+|#[0-9]+|lt|gt|quot|apos|amp);")?,
        })
    }

    fn read_document_xml(data: &[u8]) -> Result<String, DocumentExtractionError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(data))
            .map_err(|e| DocumentExtractionError::ExtractionFailed(format!("Not a DOCX archive: {}", e)))?;

        let mut part = archive.by_name(DOCUMENT_PART).map_err(|e| {
            DocumentExtractionError::ExtractionFailed(format!("{} missing: {}", DOCUMENT_PART, e))
        })?;

        let mut xml = String::new();
        part.read_to_string(&mut xml)
            .map_err(|e| DocumentExtractionError::ExtractionFailed(e.to_string()))?;
        Ok(xml)
    }

    fn paragraphs(&self, xml: &str) -> Vec<String> {
        self.paragraph
            .find_iter(xml)
            .map(|paragraph| {
                self.run_content
                    .captures_iter(paragraph.as_str())
                    .map(|run| match (run.get(1), run.get(2)) {
                        (Some(text), _) => self.unescape_xml(text.as_str()),
                        (None, Some(tag)) if tag.as_str() == "tab" => "\t".to_string(),
                        (None, Some(_)) => "\n".to_string(),
                        (None, None) => String::new(),
                    })
                    .collect::<String>()
            })
            .collect()
    }

    /// Resolves the predefined entities and numeric character references in
    /// one pass. Unknown or invalid references are kept verbatim.
    fn unescape_xml(&self, text: &str) -> String {
        self.entity
            .replace_all(text, |caps: &regex::Captures| {
                let name = &caps[1];
                let resolved = match name {
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "amp" => Some('&'),
                    _ => name
                        .strip_prefix("#x")
                        .map(|hex| u32::from_str_radix(hex, 16))
                        .unwrap_or_else(|| name[1..].parse::<u32>())
                        .ok()
                        .and_then(char::from_u32),
                };
                resolved.map_or_else(|| caps[0].to_string(), String::from)
            })
            .into_owned()
    }
}

#[async_trait]
impl DocumentExtractor for DocxExtractor {
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

        let xml = Self::read_document_xml(data)?;
        Ok(self.paragraphs(&xml).join("\n"))
    }

    fn supported_formats(&self) -> Vec<MediaType> {
        vec![MediaType::Docx]
    }
}
