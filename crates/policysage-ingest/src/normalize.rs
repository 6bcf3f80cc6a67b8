//! Document normalization: extract, trim, filter and truncate.
//!
//! Lengths are counted in Unicode scalar values, not bytes.

use std::sync::Arc;

use policysage_core::{Error, NormalizedFragment, Result};
use tracing::{debug, warn};

use crate::extract::TextExtractor;
use crate::staging::UploadedDocument;

/// Texts at or below this many characters (after trimming) are dropped.
pub const MIN_TEXT_CHARS: usize = 100;
/// Hard cap on fragment length.
pub const MAX_TEXT_CHARS: usize = 15_000;

/// Length bounds applied to every extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeLimits {
    pub min_chars: usize,
    pub max_chars: usize,
}

impl Default for NormalizeLimits {
    fn default() -> Self {
        Self {
            min_chars: MIN_TEXT_CHARS,
            max_chars: MAX_TEXT_CHARS,
        }
    }
}

/// Text accepted from one document, before labels are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedText {
    pub text: String,
    pub name: Option<String>,
}

/// Turns uploaded documents into bounded text fragments.
#[derive(Clone)]
pub struct Normalizer {
    extractor: Arc<dyn TextExtractor>,
    limits: NormalizeLimits,
}

impl Normalizer {
    pub fn new(extractor: Arc<dyn TextExtractor>) -> Self {
        Self::with_limits(extractor, NormalizeLimits::default())
    }

    pub fn with_limits(extractor: Arc<dyn TextExtractor>, limits: NormalizeLimits) -> Self {
        Self { extractor, limits }
    }

    pub fn limits(&self) -> NormalizeLimits {
        self.limits
    }

    /// Extract and bound one document. Consumes the document, so its staged
    /// file is released when this returns, whatever the outcome.
    pub fn extract_document(&self, doc: UploadedDocument) -> Option<AcceptedText> {
        let display_name = doc.name().unwrap_or("unnamed").to_string();

        let raw = match self.extractor.extract(doc.path()) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Error processing file {}: {}", display_name, e);
                return None;
            }
        };

        match bound_text(&raw, self.limits) {
            Some(text) => Some(AcceptedText {
                text,
                name: doc.name().map(str::to_string),
            }),
            None => {
                debug!("Dropping {}: too little text", display_name);
                None
            }
        }
    }

    /// Normalize a batch sequentially. Fails only when there are no documents.
    pub fn normalize(&self, docs: Vec<UploadedDocument>) -> Result<Vec<NormalizedFragment>> {
        ensure_documents(&docs)?;
        let accepted = docs.into_iter().map(|doc| self.extract_document(doc));
        Ok(label_fragments(accepted))
    }
}

/// Reject an empty upload before any normalization work starts.
pub fn ensure_documents(docs: &[UploadedDocument]) -> Result<()> {
    if docs.is_empty() {
        return Err(Error::Input("No files were uploaded.".into()));
    }
    Ok(())
}

/// Trim, drop short texts and truncate long ones to exactly `max_chars`.
pub fn bound_text(raw: &str, limits: NormalizeLimits) -> Option<String> {
    let trimmed = raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}');
    if trimmed.chars().count() <= limits.min_chars {
        return None;
    }

    let text = match trimmed.char_indices().nth(limits.max_chars) {
        Some((cut, _)) => &trimmed[..cut],
        None => trimmed,
    };
    Some(text.to_string())
}

/// Assign labels in order of accepted documents. Documents without a usable
/// name become `Policy {n}`, `n` counting accepted fragments only.
pub fn label_fragments(
    accepted: impl IntoIterator<Item = Option<AcceptedText>>,
) -> Vec<NormalizedFragment> {
    let mut fragments: Vec<NormalizedFragment> = Vec::new();
    for AcceptedText { text, name } in accepted.into_iter().flatten() {
        let label = match name {
            Some(name) if !name.is_empty() => name,
            _ => format!("Policy {}", fragments.len() + 1),
        };
        fragments.push(NormalizedFragment { text, label });
    }
    fragments
}
