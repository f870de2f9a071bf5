use crate::{ContentResult, OutboundDocument};
use medledger_types::DocumentHandle;
use std::future::Future;

/// The seam to the external content-addressed store.
///
/// Implementations upload a staged document's bytes and return the store's
/// opaque handle. Size and media-type constraints are enforced by the store,
/// not here; a violation surfaces as [`crate::ContentError::Rejected`].
///
/// Uploads are single attempts; retry policy belongs to the caller, and the
/// delivery pipeline deliberately does not retry (a failed document aborts
/// the remainder of its batch).
pub trait ContentStore: Send + Sync {
    /// Uploads a document and returns its content-derived handle.
    fn upload(
        &self,
        document: &OutboundDocument,
    ) -> impl Future<Output = ContentResult<DocumentHandle>> + Send;
}
