//! Scoped staging of uploaded documents.
//!
//! Each uploaded file is written to a `NamedTempFile` as it streams in. The
//! file is removed when its `UploadedDocument` (or an unfinished
//! `StagingWriter`) is dropped, so every exit path releases it.

use std::io::Write;
use std::path::Path;

use policysage_core::{Error, Result};
use tempfile::NamedTempFile;

/// An uploaded document staged on disk for the lifetime of one request.
#[derive(Debug)]
pub struct UploadedDocument {
    name: Option<String>,
    file: NamedTempFile,
    size: u64,
}

impl UploadedDocument {
    /// Start staging a document into `dir`, refusing more than `max_bytes`.
    pub fn stage(dir: &Path, name: Option<String>, max_bytes: u64) -> Result<StagingWriter> {
        // Keep the extension so the extractor can detect the file type.
        let suffix = name.as_deref().and_then(safe_extension).map(|ext| format!(".{ext}"));
        let mut builder = tempfile::Builder::new();
        builder.prefix("upload-");
        if let Some(suffix) = &suffix {
            builder.suffix(suffix);
        }
        let file = builder.tempfile_in(dir)?;

        Ok(StagingWriter {
            name,
            file,
            written: 0,
            max_bytes,
        })
    }

    /// Stage an in-memory payload in one step.
    pub fn from_bytes(dir: &Path, name: Option<String>, bytes: &[u8]) -> Result<Self> {
        let mut writer = Self::stage(dir, name, u64::MAX)?;
        writer.write_chunk(bytes)?;
        writer.finish()
    }

    /// Display name supplied by the client, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Path of the staged file. Only valid while `self` is alive.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// In-progress staging of one document.
#[derive(Debug)]
pub struct StagingWriter {
    name: Option<String>,
    file: NamedTempFile,
    written: u64,
    max_bytes: u64,
}

impl StagingWriter {
    /// Append a chunk, failing once the document exceeds its size limit.
    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.written += chunk.len() as u64;
        if self.written > self.max_bytes {
            return Err(Error::PayloadTooLarge(format!(
                "{} exceeds the {} byte limit",
                self.name.as_deref().unwrap_or("upload"),
                self.max_bytes
            )));
        }
        self.file.write_all(chunk)?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<UploadedDocument> {
        self.file.flush()?;
        Ok(UploadedDocument {
            name: self.name,
            file: self.file,
            size: self.written,
        })
    }
}

fn safe_extension(name: &str) -> Option<&str> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_keeps_extension_and_contents() {
        let dir = tempfile::tempdir().unwrap();
        let doc = UploadedDocument::from_bytes(dir.path(), Some("teklif.PDF".into()), b"hello")
            .unwrap();
        assert_eq!(doc.name(), Some("teklif.PDF"));
        assert_eq!(doc.size(), 5);
        assert_eq!(doc.path().extension().unwrap(), "PDF");
        assert_eq!(std::fs::read(doc.path()).unwrap(), b"hello");
    }

    #[test]
    fn test_drop_removes_staged_file() {
        let dir = tempfile::tempdir().unwrap();
        let doc = UploadedDocument::from_bytes(dir.path(), None, b"x").unwrap();
        let path = doc.path().to_path_buf();
        assert!(path.exists());
        drop(doc);
        assert!(!path.exists());
    }

    #[test]
    fn test_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = UploadedDocument::stage(dir.path(), Some("a.pdf".into()), 4).unwrap();
        writer.write_chunk(b"abcd").unwrap();
        let err = writer.write_chunk(b"e").unwrap_err();
        assert!(matches!(err, Error::PayloadTooLarge(_)));
        drop(writer);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_unsafe_extension_dropped() {
        assert_eq!(safe_extension("../../etc/passwd"), None);
        assert_eq!(safe_extension("policy.pdf"), Some("pdf"));
        assert_eq!(safe_extension("weird.p d f"), None);
    }
}
