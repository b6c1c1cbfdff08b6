use std::fmt;

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Declared media type of an upload, normalised to its essence
/// (`type/subtype`, lowercase, parameters dropped).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MediaType {
    Pdf,
    Docx,
    Png,
    Jpeg,
    Webp,
    PlainText,
    Other(String),
}

impl MediaType {
    pub fn parse(raw: &str) -> Self {
        let essence = raw
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        match essence.as_str() {
            "application/pdf" => MediaType::Pdf,
            DOCX_MIME => MediaType::Docx,
            "image/png" => MediaType::Png,
            "image/jpeg" | "image/jpg" => MediaType::Jpeg,
            "image/webp" => MediaType::Webp,
            "text/plain" => MediaType::PlainText,
            _ => MediaType::Other(essence),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MediaType::Pdf => "application/pdf",
            MediaType::Docx => DOCX_MIME,
            MediaType::Png => "image/png",
            MediaType::Jpeg => "image/jpeg",
            MediaType::Webp => "image/webp",
            MediaType::PlainText => "text/plain",
            MediaType::Other(essence) => essence,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, MediaType::Png | MediaType::Jpeg | MediaType::Webp)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
