use std::fmt;

/// One uploaded file, as received at the HTTP boundary.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Used when the client declares no content type.
    pub const DEFAULT_MIME_TYPE: &'static str = "application/pdf";

    pub fn new(file_name: impl Into<String>, mime_type: Option<&str>, bytes: Vec<u8>) -> Self {
        let mime_type = mime_type
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(Self::DEFAULT_MIME_TYPE)
            .to_string();
        Self { file_name: file_name.into(), mime_type, bytes }
    }
}

/// Base64 document content attached inline to a multimodal model request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineContent<'a> {
    pub mime_type: &'a str,
    pub data_base64: &'a str,
}

/// A single upstream call within the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// OCR text detection (first half of the OCR path).
    Ocr,
    /// Language-model structuring of OCR text (second half of the OCR path).
    Structuring,
    /// Language model reading the document directly.
    Direct,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Ocr => write!(f, "ocr"),
            Stage::Structuring => write!(f, "structuring"),
            Stage::Direct => write!(f, "direct"),
        }
    }
}
