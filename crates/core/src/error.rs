use medledger_content::ContentError;
use medledger_types::{Address, Role};

/// Detail of a failed remote call, as reported by a service binding.
///
/// Bindings map their transport's error type into this; core code never sees
/// wire-level error types directly.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    /// The gateway could not be reached or the call failed in transit.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The call reached the ledger and was rejected (revert, access control,
    /// signing failure).
    #[error("rejected by ledger: {0}")]
    Rejected(String),
}

/// Errors surfaced by the MedLedger client.
///
/// Every variant is recoverable at the call site: the binary prints a status
/// line and exits non-zero, the poller logs and keeps its last good snapshot.
/// There is no automatic retry anywhere; each user-initiated action is a
/// single attempt that the user must re-trigger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// No signing provider is present in the environment.
    #[error("no wallet provider is available")]
    WalletUnavailable,
    /// An operation required an authenticated party but none is connected.
    #[error("wallet is not connected")]
    WalletNotConnected,
    /// The configured deployments table has no contract binding for the
    /// gateway's network.
    #[error("contract is not deployed on network {network_id}")]
    ContractNotDeployed { network_id: u64 },
    /// The gateway handshake failed before any ledger call was made.
    #[error("failed to connect to ledger gateway: {0}")]
    Connection(#[source] CallError),
    /// A read-only ledger query failed.
    #[error("ledger query failed: {0}")]
    QueryFailed(#[source] CallError),
    /// A state-changing submission (consultation request or document record)
    /// failed; no partial state is assumed client-side.
    #[error("submission failed: {0}")]
    SubmissionFailed(#[source] CallError),
    /// An accept/reject call failed. Any optimistic local removal must be
    /// rolled back by the caller.
    #[error("failed to resolve consultation request: {0}")]
    ResolutionFailed(#[source] CallError),
    /// A profile registration write failed.
    #[error("registration failed: {0}")]
    RegistrationFailed(#[source] CallError),
    /// A document upload failed; no ledger call was made for that document.
    #[error("document upload failed: {0}")]
    UploadFailed(#[source] ContentError),
    /// Client-side duplicate guard: a request for this ordered pair is
    /// already pending, so no second submission was attempted.
    #[error("a consultation request to {approver} is already pending")]
    RequestAlreadyPending { approver: Address },
    /// The party has no registered profile for the given role.
    #[error("party {party} is not registered as a {role}")]
    NotRegistered { party: Address, role: Role },
    /// Invalid configuration or caller input.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for client operations.
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
