//! PolicySage Ingest: upload staging, text extraction and normalization.

pub mod extract;
pub mod normalize;
pub mod staging;

pub use extract::{DocumentExtractor, FileType, PdfTextExtractor, PlainTextExtractor, TextExtractor};
pub use normalize::{
    bound_text, ensure_documents, label_fragments, AcceptedText, NormalizeLimits, Normalizer,
    MAX_TEXT_CHARS, MIN_TEXT_CHARS,
};
pub use staging::{StagingWriter, UploadedDocument};
