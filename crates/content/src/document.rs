use crate::ContentResult;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Locally computed metadata for an outbound document.
///
/// This structure is an auditable record of what was handed to the content
/// store, computed from the bytes themselves before any upload. It contains
/// no patient or clinical identifiers.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct DocumentMetadata {
    /// Hashing algorithm used (always "sha256" for the current implementation)
    pub hash_algorithm: String,

    /// Hexadecimal digest of the document content
    pub hash: String,

    /// Size of the document in bytes
    pub size_bytes: u64,

    /// Detected media type (MIME type), if available
    ///
    /// This is a best-effort detection and should not be considered
    /// authoritative. May be `None` if the media type cannot be determined.
    pub media_type: Option<String>,

    /// Original filename from the source path
    pub original_filename: String,

    /// UTC timestamp when the document was read (ISO 8601 format)
    pub read_at: DateTime<Utc>,
}

/// A document staged for delivery: its bytes plus integrity metadata.
///
/// Construction reads the whole document into memory and computes the
/// metadata eagerly; the value is immutable afterwards. The content store's
/// handle is *not* part of this type; it only exists once an upload
/// succeeds, and pairing the two is the delivery pipeline's job.
#[derive(Debug, Clone)]
pub struct OutboundDocument {
    bytes: Vec<u8>,
    metadata: DocumentMetadata,
}

impl OutboundDocument {
    /// Stages a document from in-memory bytes.
    ///
    /// The digest, size and media type are computed from `bytes`; `filename`
    /// is kept verbatim as the original filename.
    pub fn from_bytes(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let hash = hex::encode(hasher.finalize());

        let media_type = infer::get(&bytes).map(|kind| kind.mime_type().to_owned());

        let metadata = DocumentMetadata {
            hash_algorithm: "sha256".to_owned(),
            hash,
            size_bytes: bytes.len() as u64,
            media_type,
            original_filename: filename.into(),
            read_at: Utc::now(),
        };

        Self { bytes, metadata }
    }

    /// Stages a document by reading it from the filesystem.
    ///
    /// The original filename is taken from the path's final component.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ContentError::Io`] if the file cannot be read.
    pub fn from_path(source_path: &Path) -> ContentResult<Self> {
        let bytes = fs::read(source_path).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("failed to read {}: {}", source_path.display(), e),
            )
        })?;

        let filename = source_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");

        Ok(Self::from_bytes(filename, bytes))
    }

    /// Returns the original filename.
    pub fn filename(&self) -> &str {
        &self.metadata.original_filename
    }

    /// Returns the document bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the locally computed metadata.
    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn computes_digest_and_size() {
        let doc = OutboundDocument::from_bytes("test.txt", b"Hello, World!".to_vec());

        assert_eq!(doc.metadata().hash_algorithm, "sha256");
        assert_eq!(
            doc.metadata().hash,
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );
        assert_eq!(doc.metadata().size_bytes, 13);
        assert_eq!(doc.filename(), "test.txt");
    }

    #[test]
    fn detects_media_type() {
        let png_header = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let doc = OutboundDocument::from_bytes("scan.png", png_header);

        assert_eq!(doc.metadata().media_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn plain_text_has_no_detected_type() {
        let doc = OutboundDocument::from_bytes("note.txt", b"just text".to_vec());
        assert_eq!(doc.metadata().media_type, None);
    }

    #[test]
    fn empty_document_is_staged() {
        let doc = OutboundDocument::from_bytes("empty.dat", vec![]);
        assert_eq!(doc.metadata().size_bytes, 0);
        assert!(doc.bytes().is_empty());
    }

    #[test]
    fn from_path_reads_file_and_filename() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("report.pdf");
        fs::write(&path, b"%PDF-1.4 minimal").unwrap();

        let doc = OutboundDocument::from_path(&path).unwrap();
        assert_eq!(doc.filename(), "report.pdf");
        assert_eq!(doc.bytes(), b"%PDF-1.4 minimal");
    }

    #[test]
    fn from_path_missing_file_errors() {
        let result = OutboundDocument::from_path(Path::new("/non-existent/file.txt"));
        assert!(matches!(result, Err(crate::ContentError::Io(_))));
    }

    #[test]
    fn metadata_serialises() {
        let doc = OutboundDocument::from_bytes("test.txt", b"Hello, World!".to_vec());
        let json = serde_json::to_string(doc.metadata()).unwrap();
        assert!(json.contains("sha256"));
        assert!(json.contains("test.txt"));
    }
}
