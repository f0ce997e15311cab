//! Text extraction from uploaded contract files.
//!
//! Dispatches on the file extension:
//! - `.pdf` - text layer extraction page by page (pdf-extract)
//! - `.docx` - paragraph text from `word/document.xml` (zip)
//! - anything else - lossy UTF-8 decode, invalid bytes dropped
//!
//! PDF and DOCX failures are reported as [`ExtractionError`] carrying the
//! underlying library message. Plain text never fails.

mod docx;
mod pdf;

use thiserror::Error;

#[cfg(test)]
pub(crate) use docx::tests::make_test_docx as docx_fixture;
#[cfg(test)]
pub(crate) use pdf::tests::make_test_pdf as pdf_fixture;

/// File extensions accepted by the upload endpoint.
pub const ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".docx", ".txt"];

/// Errors that can occur during text extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to extract text from PDF: {0}")]
    Pdf(String),

    #[error("Failed to extract text from DOCX: {0}")]
    Docx(String),
}

/// Document format, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentFormat {
    /// Detect the format from a filename (case-insensitive).
    /// Unknown extensions fall back to plain text.
    pub fn from_filename(filename: &str) -> Self {
        let lower = filename.to_lowercase();
        if lower.ends_with(".pdf") {
            Self::Pdf
        } else if lower.ends_with(".docx") {
            Self::Docx
        } else {
            Self::PlainText
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::PlainText => "text",
        }
    }
}

/// Check whether a filename carries one of [`ALLOWED_EXTENSIONS`].
pub fn is_allowed_upload(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    ALLOWED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Result of text extraction.
#[derive(Debug)]
pub struct ExtractionResult {
    /// Extracted text content.
    pub text: String,
    /// Format the file was handled as.
    pub format: DocumentFormat,
    /// Number of pages processed (PDF only).
    pub page_count: Option<usize>,
}

/// Extracts text from in-memory file contents.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextExtractor;

impl TextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract text from `bytes`, choosing the parser from `filename`.
    pub fn extract(
        &self,
        bytes: &[u8],
        filename: &str,
    ) -> Result<ExtractionResult, ExtractionError> {
        let format = DocumentFormat::from_filename(filename);
        let result = match format {
            DocumentFormat::Pdf => {
                let (text, pages) = pdf::extract_pdf(bytes)?;
                ExtractionResult {
                    text,
                    format,
                    page_count: Some(pages),
                }
            }
            DocumentFormat::Docx => ExtractionResult {
                text: docx::extract_docx(bytes)?,
                format,
                page_count: None,
            },
            DocumentFormat::PlainText => ExtractionResult {
                text: decode_lossy(bytes),
                format,
                page_count: None,
            },
        };

        tracing::debug!(
            filename,
            format = result.format.as_str(),
            chars = result.text.chars().count(),
            "Extracted text"
        );
        Ok(result)
    }

    /// Convenience wrapper returning only the text.
    pub fn extract_text(&self, bytes: &[u8], filename: &str) -> Result<String, ExtractionError> {
        self.extract(bytes, filename).map(|r| r.text)
    }
}

/// Decode UTF-8, silently dropping invalid byte sequences.
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}
