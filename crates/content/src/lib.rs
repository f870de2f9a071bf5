//! Outbound document handling for the MedLedger client.
//!
//! Binary documents (prescriptions, reports) never live on the ledger; they
//! are uploaded to an external content-addressed store, and only the returned
//! handle is recorded on-chain. This crate owns the client side of that
//! boundary:
//!
//! - [`OutboundDocument`]: a document read into memory together with locally
//!   computed integrity metadata (SHA-256 digest, size, best-effort media
//!   type, original filename).
//! - [`ContentStore`]: the seam to the external store; upload bytes, get an
//!   opaque [`DocumentHandle`] back.
//!
//! The store owns the handle format and enforces its own size/type limits;
//! the local digest exists so a delivery can be audited against the bytes
//! that were actually sent.

mod document;
mod store;

pub use document::{DocumentMetadata, OutboundDocument};
pub use store::ContentStore;

use medledger_types::HandleError;

/// Error type for content-store operations.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// The source file could not be opened or read.
    #[error("failed to read source document: {0}")]
    Io(#[from] std::io::Error),
    /// The store rejected the upload (size, type, or policy).
    #[error("upload rejected by content store: {0}")]
    Rejected(String),
    /// The store could not be reached or the call failed in transit.
    #[error("content store transport error: {0}")]
    Transport(String),
    /// The store returned a handle that fails local validation.
    #[error("content store returned an invalid handle: {0}")]
    InvalidHandle(#[from] HandleError),
}

/// Result type for content-store operations.
pub type ContentResult<T> = std::result::Result<T, ContentError>;
