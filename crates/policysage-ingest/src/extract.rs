//! Document text extraction.
//!
//! The `TextExtractor` trait abstracts over turning a staged document into raw
//! text. `DocumentExtractor` picks the PDF or plain-text backend per file.

use std::io::Read;
use std::path::Path;

use policysage_core::{Error, Result};

/// Trait for text extraction backends.
pub trait TextExtractor: Send + Sync {
    /// Extract raw, untrimmed text from the document at `path`.
    fn extract(&self, path: &Path) -> Result<String>;
}

/// Supported document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    PlainText,
    Unknown,
}

impl FileType {
    /// Detect file type from extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "txt" | "text" | "md" => Self::PlainText,
            _ => Self::Unknown,
        }
    }

    /// Detect file type from the leading bytes, then the extension.
    pub fn detect(path: &Path) -> Self {
        if has_pdf_header(path) {
            return Self::Pdf;
        }
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::from_extension(ext)
    }
}

fn has_pdf_header(path: &Path) -> bool {
    let mut header = [0u8; 5];
    std::fs::File::open(path)
        .and_then(|mut f| f.read_exact(&mut header))
        .map(|_| &header == b"%PDF-")
        .unwrap_or(false)
}

/// PDF text extractor using the pdf-extract crate.
/// Handles digital PDFs with embedded text layers.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        // pdf-extract panics on some malformed inputs instead of returning an error.
        std::panic::catch_unwind(|| pdf_extract::extract_text(path))
            .map_err(|_| Error::Extraction(format!("PDF parser panicked on {}", path.display())))?
            .map_err(|e| Error::Extraction(e.to_string()))
    }
}

/// Reads the document as UTF-8 text.
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path)?;
        String::from_utf8(bytes)
            .map_err(|_| Error::Extraction(format!("{} is not valid UTF-8", path.display())))
    }
}

/// Dispatches to the right backend by file type. Unknown files are tried as PDF.
pub struct DocumentExtractor {
    pdf: PdfTextExtractor,
    plain: PlainTextExtractor,
}

impl DocumentExtractor {
    pub fn new() -> Self {
        Self {
            pdf: PdfTextExtractor,
            plain: PlainTextExtractor,
        }
    }
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for DocumentExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        match FileType::detect(path) {
            FileType::PlainText => self.plain.extract(path),
            FileType::Pdf | FileType::Unknown => self.pdf.extract(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_with(suffix: &str, contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_file_type_from_extension() {
        assert_eq!(FileType::from_extension("PDF"), FileType::Pdf);
        assert_eq!(FileType::from_extension("txt"), FileType::PlainText);
        assert_eq!(FileType::from_extension("docx"), FileType::Unknown);
    }

    #[test]
    fn test_detect_prefers_magic_header() {
        let file = temp_with(".txt", b"%PDF-1.4\n%garbage");
        assert_eq!(FileType::detect(file.path()), FileType::Pdf);

        let file = temp_with(".txt", b"plain words");
        assert_eq!(FileType::detect(file.path()), FileType::PlainText);
    }

    #[test]
    fn test_plain_text_extraction() {
        let file = temp_with(".txt", "Kasko poliçesi".as_bytes());
        let text = DocumentExtractor::new().extract(file.path()).unwrap();
        assert_eq!(text, "Kasko poliçesi");
    }

    #[test]
    fn test_garbage_pdf_is_an_error() {
        let file = temp_with(".pdf", b"this is not a pdf at all");
        let result = DocumentExtractor::new().extract(file.path());
        assert!(matches!(result, Err(Error::Extraction(_))));
    }
}
