//! # MedLedger Core
//!
//! Core client logic for the MedLedger medical-records system.
//!
//! The ledger (a smart contract behind an external gateway) owns all data and
//! permissions; this crate owns the protocol a well-behaved client follows
//! against it:
//! - Consultation-request lifecycle: identifier derivation, status
//!   classification, guarded submission, resolution with rollback
//! - Approval-status polling with a cancellable, non-overlapping sweep task
//! - Sequential document delivery (upload to the content store, then record
//!   the handle on the ledger)
//! - Registration, dashboards and directory sweeps
//! - Wallet-session lifecycle and startup configuration
//!
//! **No wire concerns**: gRPC bindings and message conversions belong in
//! `ledger-grpc`; this crate programs against the [`ledger::LedgerService`]
//! and `ContentStore` seams only.

pub mod config;
pub mod delivery;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod nav;
pub mod poll;
pub mod registry;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{parse_deployments, ClientConfig};
pub use delivery::{DeliveryFailure, DeliveryReceipt, DocumentDelivery, DocumentKind};
pub use error::{CallError, LedgerError, LedgerResult};
pub use ledger::{
    CallResult, ConsultationRecord, Decision, DoctorProfile, LedgerService, PatientProfile,
};
pub use lifecycle::{
    classify_pair, derive_request_id, ConsultationStatus, RequestLifecycleClient,
};
pub use nav::{allowed_views, is_allowed, View};
pub use poll::{StatusPoller, StatusSweep, DEFAULT_POLL_INTERVAL};
pub use registry::{ApproverInbox, DoctorListing, InboxEntry, Registry};
pub use session::{Wallet, WalletProvider, WalletSession};
