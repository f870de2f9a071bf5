//! Document delivery: upload, then record, one document at a time.
//!
//! A delivered document lives in two places (its bytes in the content store,
//! its handle on the ledger) and the invariant worth keeping simple is
//! "document N's handle is on-chain before document N+1 is touched". Delivery
//! is therefore strictly sequential, never pipelined, at the cost of
//! throughput.
//!
//! A failure on document *k* aborts the remaining sequence starting at *k*.
//! Documents *1..k-1* stay delivered; there is no rollback and no resume, and
//! the caller gets the receipts for what landed plus the position and cause
//! of the failure.

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::LedgerService;
use crate::session::WalletSession;
use medledger_content::{ContentStore, OutboundDocument};
use medledger_types::{Address, DocumentHandle};
use std::sync::Arc;

/// Which ledger record a delivered handle lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Doctor → patient.
    Prescription,
    /// Patient → doctor.
    Report,
}

/// Proof that one document completed both halves of its delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub filename: String,
    pub handle: DocumentHandle,
}

/// A delivery batch that stopped partway.
///
/// `delivered` holds the receipts for every document that completed before
/// the failure; `failed_index` is the zero-based input position of the
/// document that did not.
#[derive(Debug, thiserror::Error)]
#[error("delivery aborted at '{filename}' (document {failed_index}): {source}")]
pub struct DeliveryFailure {
    pub delivered: Vec<DeliveryReceipt>,
    pub failed_index: usize,
    pub filename: String,
    #[source]
    pub source: LedgerError,
}

/// Delivers documents for one authenticated party.
#[derive(Debug)]
pub struct DocumentDelivery<L, S> {
    ledger: Arc<L>,
    store: Arc<S>,
    session: WalletSession,
}

impl<L: LedgerService, S: ContentStore> DocumentDelivery<L, S> {
    pub fn new(ledger: Arc<L>, store: Arc<S>, session: WalletSession) -> Self {
        Self {
            ledger,
            store,
            session,
        }
    }

    /// Delivers `documents` to `recipient` in input order.
    ///
    /// For each document: upload to the content store, then one ledger call
    /// recording `(recipient, handle)`. On full success exactly N uploads and
    /// N record calls are made, each upload strictly before its record call.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryFailure`] carrying the receipts of the documents
    /// delivered before the failure. An upload failure means no ledger call
    /// was made for that document or any later one.
    pub async fn deliver(
        &self,
        kind: DocumentKind,
        recipient: Address,
        documents: &[OutboundDocument],
    ) -> std::result::Result<Vec<DeliveryReceipt>, DeliveryFailure> {
        let sender = self.session.party();
        let mut delivered = Vec::with_capacity(documents.len());

        for (index, document) in documents.iter().enumerate() {
            match self.deliver_one(kind, sender, recipient, document).await {
                Ok(handle) => delivered.push(DeliveryReceipt {
                    filename: document.filename().to_owned(),
                    handle,
                }),
                Err(source) => {
                    return Err(DeliveryFailure {
                        delivered,
                        failed_index: index,
                        filename: document.filename().to_owned(),
                        source,
                    })
                }
            }
        }

        Ok(delivered)
    }

    async fn deliver_one(
        &self,
        kind: DocumentKind,
        sender: Address,
        recipient: Address,
        document: &OutboundDocument,
    ) -> LedgerResult<DocumentHandle> {
        let handle = self
            .store
            .upload(document)
            .await
            .map_err(LedgerError::UploadFailed)?;

        let record = match kind {
            DocumentKind::Prescription => {
                self.ledger
                    .send_prescription(sender, recipient, &handle)
                    .await
            }
            DocumentKind::Report => self.ledger.send_report(sender, recipient, &handle).await,
        };
        record.map_err(LedgerError::SubmissionFailed)?;

        tracing::info!(
            filename = document.filename(),
            %handle,
            digest = %document.metadata().hash,
            "document recorded on ledger"
        );
        Ok(handle)
    }
}
