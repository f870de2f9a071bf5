//! Consultation-request lifecycle.
//!
//! A consultation request is keyed by the **ordered** pair (requester,
//! approver): the identifier is a one-way digest of the pair, so swapping the
//! two parties yields a different identifier and the two directions never
//! collide. The ledger stores only `{exists, approved}` under that key, which
//! collapses the real lifecycle (absent → pending → approved/rejected) into
//! two observable buckets; see [`ConsultationStatus`].
//!
//! All operations here are single attempts against the ledger; the polling
//! layer ([`crate::poll`]) is what keeps a view's picture of the lifecycle
//! current.

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::{Decision, LedgerService};
use crate::session::WalletSession;
use medledger_types::{Address, RequestId};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Derives the identifier of the consultation request from `requester` to
/// `approver`.
///
/// The digest is SHA-256 over the 64-byte fixed-width encoding of the pair:
/// each address left-padded to a 32-byte word, requester word first. The
/// function is pure: identical inputs always yield the identical identifier,
/// and swapping the inputs yields a different one.
///
/// This is the single canonical derivation; both the requester-side and the
/// approver-side flows key their queries with it.
pub fn derive_request_id(requester: Address, approver: Address) -> RequestId {
    let mut words = [0u8; 64];
    words[12..32].copy_from_slice(requester.as_bytes());
    words[44..64].copy_from_slice(approver.as_bytes());
    RequestId::from_bytes(Sha256::digest(words).into())
}

/// The lifecycle status of an ordered pair, as observable by this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsultationStatus {
    /// A request exists and awaits the approver's decision.
    Pending,
    /// No actionable request: never filed, already approved, or rejected.
    ///
    /// The ledger does not expose enough to tell these three apart, so this
    /// client does not try to. Known limitation, kept deliberately.
    Inactive,
}

impl ConsultationStatus {
    pub fn is_pending(self) -> bool {
        matches!(self, ConsultationStatus::Pending)
    }
}

impl std::fmt::Display for ConsultationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsultationStatus::Pending => f.write_str("pending"),
            ConsultationStatus::Inactive => f.write_str("inactive"),
        }
    }
}

/// Classifies the ordered pair by reading the request record and the
/// independent approval flag.
///
/// The tie-break is exact: the pair is `Pending` iff the record exists and
/// neither the record nor the independent query reports approval; everything
/// else (never requested, approved, or rejected) is `Inactive`.
pub async fn classify_pair<L: LedgerService>(
    ledger: &L,
    requester: Address,
    approver: Address,
) -> LedgerResult<ConsultationStatus> {
    let id = derive_request_id(requester, approver);
    let record = ledger.request(id).await.map_err(LedgerError::QueryFailed)?;
    let independently_approved = ledger
        .is_approved(requester, approver)
        .await
        .map_err(LedgerError::QueryFailed)?;

    let approved = record.approved || independently_approved;
    if record.exists && !approved {
        Ok(ConsultationStatus::Pending)
    } else {
        Ok(ConsultationStatus::Inactive)
    }
}

/// Drives the consultation-request lifecycle for one authenticated party.
///
/// Holds the ledger binding and the wallet session it acts as; views construct
/// one per session and share it. All methods are read-modify cycles against
/// remote state; nothing is cached here.
#[derive(Debug)]
pub struct RequestLifecycleClient<L> {
    ledger: Arc<L>,
    session: WalletSession,
}

impl<L> Clone for RequestLifecycleClient<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            session: self.session,
        }
    }
}

impl<L: LedgerService> RequestLifecycleClient<L> {
    pub fn new(ledger: Arc<L>, session: WalletSession) -> Self {
        Self { ledger, session }
    }

    /// The party this client acts as.
    pub fn party(&self) -> Address {
        self.session.party()
    }

    /// Classifies the request from `requester` to `approver`.
    ///
    /// Read-only; see [`classify_pair`] for the tie-break rule.
    pub async fn classify(
        &self,
        requester: Address,
        approver: Address,
    ) -> LedgerResult<ConsultationStatus> {
        classify_pair(self.ledger.as_ref(), requester, approver).await
    }

    /// Submits a consultation request from the session party to `approver`.
    ///
    /// Guard: at most one request may be pending per ordered pair, and the
    /// external ledger may or may not reject duplicates itself, so the guard
    /// is enforced locally: if the pair is already `Pending` this fails with
    /// [`LedgerError::RequestAlreadyPending`] and no ledger call is made.
    ///
    /// # Errors
    ///
    /// [`LedgerError::SubmissionFailed`] on any transport, signing or
    /// ledger-rejection error; no partial state is assumed client-side.
    pub async fn submit_request(&self, approver: Address) -> LedgerResult<()> {
        let requester = self.session.party();
        if self.classify(requester, approver).await?.is_pending() {
            return Err(LedgerError::RequestAlreadyPending { approver });
        }

        self.ledger
            .request_consultation(requester, approver)
            .await
            .map_err(LedgerError::SubmissionFailed)?;
        tracing::info!(%requester, %approver, "consultation request submitted");
        Ok(())
    }

    /// Resolves the pending request filed by `requester`, acting as the
    /// session party (the designated approver).
    ///
    /// # Errors
    ///
    /// [`LedgerError::ResolutionFailed`] on any remote error. Callers that
    /// removed the request from a local pending list before calling must
    /// reinstate it on failure; see [`crate::registry::ApproverInbox`].
    pub async fn resolve_request(
        &self,
        requester: Address,
        decision: Decision,
    ) -> LedgerResult<()> {
        let approver = self.session.party();
        let result = match decision {
            Decision::Accept => self.ledger.approve_consultation(approver, requester).await,
            Decision::Reject => self.ledger.reject_consultation(approver, requester).await,
        };
        result.map_err(LedgerError::ResolutionFailed)?;
        tracing::info!(%requester, %approver, ?decision, "consultation request resolved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::ConsultationRecord;
    use crate::test_support::{addr, MockLedger};
    use medledger_types::Address;

    #[test]
    fn request_ids_are_order_sensitive() {
        let a = addr(0xaa);
        let b = addr(0xbb);
        assert_ne!(derive_request_id(a, b), derive_request_id(b, a));
    }

    #[test]
    fn request_ids_are_referentially_transparent() {
        let a = addr(0x01);
        let b = addr(0x02);
        assert_eq!(derive_request_id(a, b), derive_request_id(a, b));
    }

    #[test]
    fn request_id_matches_pinned_digest() {
        // SHA-256 of two zero-padded address words; pins the wire-visible
        // derivation so it cannot drift silently.
        let a = Address::parse("0x0000000000000000000000000000000000000001").unwrap();
        let b = Address::parse("0x0000000000000000000000000000000000000002").unwrap();
        assert_eq!(
            derive_request_id(a, b).to_hex(),
            "d6ba9329f8932c12192b37849f772104d20048f76434a3290512d9d814e4116f"
        );
    }

    #[tokio::test]
    async fn classify_truth_table() {
        let a = addr(0xaa);
        let b = addr(0xbb);
        let ledger = Arc::new(MockLedger::default());
        let client = RequestLifecycleClient::new(Arc::clone(&ledger), WalletSession::new(a));

        // Never requested.
        assert_eq!(
            client.classify(a, b).await.unwrap(),
            ConsultationStatus::Inactive
        );

        // Pending: exists, not approved.
        ledger.set_record(
            derive_request_id(a, b),
            ConsultationRecord {
                exists: true,
                approved: false,
            },
        );
        assert_eq!(
            client.classify(a, b).await.unwrap(),
            ConsultationStatus::Pending
        );

        // Approved on the record itself.
        ledger.set_record(
            derive_request_id(a, b),
            ConsultationRecord {
                exists: true,
                approved: true,
            },
        );
        assert_eq!(
            client.classify(a, b).await.unwrap(),
            ConsultationStatus::Inactive
        );
    }

    #[tokio::test]
    async fn classify_honours_independent_approval_signal() {
        let a = addr(0xaa);
        let b = addr(0xbb);
        let ledger = MockLedger::default();
        ledger.set_record(
            derive_request_id(a, b),
            ConsultationRecord {
                exists: true,
                approved: false,
            },
        );
        ledger.set_approved(a, b);

        let status = classify_pair(&ledger, a, b).await.unwrap();
        assert_eq!(status, ConsultationStatus::Inactive);
    }

    #[tokio::test]
    async fn submit_then_resolve_cycle() {
        let patient = addr(0xaa);
        let doctor = addr(0xbb);
        let ledger = Arc::new(MockLedger::default());

        let requester_client =
            RequestLifecycleClient::new(Arc::clone(&ledger), WalletSession::new(patient));
        let approver_client =
            RequestLifecycleClient::new(Arc::clone(&ledger), WalletSession::new(doctor));

        assert_eq!(
            requester_client.classify(patient, doctor).await.unwrap(),
            ConsultationStatus::Inactive
        );

        requester_client.submit_request(doctor).await.unwrap();
        assert_eq!(
            requester_client.classify(patient, doctor).await.unwrap(),
            ConsultationStatus::Pending
        );

        approver_client
            .resolve_request(patient, Decision::Accept)
            .await
            .unwrap();
        // Approved is observably identical to never-requested.
        assert_eq!(
            requester_client.classify(patient, doctor).await.unwrap(),
            ConsultationStatus::Inactive
        );
    }

    #[tokio::test]
    async fn submit_is_guarded_against_duplicates() {
        let patient = addr(0xaa);
        let doctor = addr(0xbb);
        let ledger = Arc::new(MockLedger::default());
        let client = RequestLifecycleClient::new(Arc::clone(&ledger), WalletSession::new(patient));

        client.submit_request(doctor).await.unwrap();
        let writes_before = ledger.call_count("request_consultation");

        let second = client.submit_request(doctor).await;
        assert!(matches!(
            second,
            Err(LedgerError::RequestAlreadyPending { approver }) if approver == doctor
        ));
        // The guard fired locally: no second ledger write happened.
        assert_eq!(ledger.call_count("request_consultation"), writes_before);
    }

    #[tokio::test]
    async fn submit_surfaces_submission_failure() {
        let patient = addr(0xaa);
        let doctor = addr(0xbb);
        let ledger = Arc::new(MockLedger::default());
        ledger.fail_method("request_consultation");
        let client = RequestLifecycleClient::new(Arc::clone(&ledger), WalletSession::new(patient));

        let result = client.submit_request(doctor).await;
        assert!(matches!(result, Err(LedgerError::SubmissionFailed(_))));
    }

    #[tokio::test]
    async fn reject_returns_pair_to_inactive() {
        let patient = addr(0xaa);
        let doctor = addr(0xbb);
        let ledger = Arc::new(MockLedger::default());
        let requester =
            RequestLifecycleClient::new(Arc::clone(&ledger), WalletSession::new(patient));
        let approver =
            RequestLifecycleClient::new(Arc::clone(&ledger), WalletSession::new(doctor));

        requester.submit_request(doctor).await.unwrap();
        approver
            .resolve_request(patient, Decision::Reject)
            .await
            .unwrap();

        assert_eq!(
            requester.classify(patient, doctor).await.unwrap(),
            ConsultationStatus::Inactive
        );
    }
}
