//! The seam to the external ledger.
//!
//! The ledger (a smart contract behind a gateway) is the system of record for
//! profiles, consultation requests and document references. This module
//! defines the method-level surface the rest of the client programs against;
//! the concrete binding lives in `ledger-grpc`, and tests substitute an
//! in-memory fake.
//!
//! Reads are eventually consistent with writes: a submitted call's effect
//! becomes visible to subsequent reads only after confirmation, which is why
//! the lifecycle layer re-polls rather than assuming its own writes are
//! immediately observable.

use crate::error::CallError;
use medledger_types::{Address, DocumentHandle, RequestId};
use std::future::Future;

/// Result type for raw ledger calls.
pub type CallResult<T> = std::result::Result<T, CallError>;

/// Descriptive fields of a registered patient.
///
/// Created once via registration; amended only by re-registration (the ledger
/// exposes no partial update).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PatientProfile {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub email: String,
    pub gender: String,
    pub home_address: String,
    pub phone_number: String,
    pub blood_group: String,
    pub insurance_provider: String,
    pub policy_number: String,
}

/// Descriptive fields of a registered doctor.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DoctorProfile {
    pub first_name: String,
    pub last_name: String,
    pub specialization: String,
    pub email: String,
    pub phone_number: String,
    pub license_number: String,
    pub experience_years: String,
    pub clinic_address: String,
    pub date_of_birth: String,
}

/// The `{exists, approved}` pair stored under a request identifier.
///
/// This is everything the ledger exposes about a consultation request; in
/// particular there is no distinct "rejected" flag, which is why downstream
/// classification conflates rejected with absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsultationRecord {
    pub exists: bool,
    pub approved: bool,
}

/// The approver's decision on a pending consultation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
}

/// Method-level surface of the ledger gateway.
///
/// Write calls carry the sender party explicitly; the gateway owns signing
/// and transaction semantics. Profile reads map the ledger's registered flag
/// to `Option`: `None` means the party never registered.
pub trait LedgerService: Send + Sync {
    fn register_patient(
        &self,
        sender: Address,
        profile: &PatientProfile,
    ) -> impl Future<Output = CallResult<()>> + Send;

    fn register_doctor(
        &self,
        sender: Address,
        profile: &DoctorProfile,
    ) -> impl Future<Output = CallResult<()>> + Send;

    fn patient(&self, party: Address)
        -> impl Future<Output = CallResult<Option<PatientProfile>>> + Send;

    fn doctor(&self, party: Address)
        -> impl Future<Output = CallResult<Option<DoctorProfile>>> + Send;

    /// Fetches a doctor profile through the ledger's detail query.
    ///
    /// The ledger exposes this separately from [`LedgerService::doctor`]; the
    /// directory flows use it, dashboards use the mapping read.
    fn doctor_details(
        &self,
        party: Address,
    ) -> impl Future<Output = CallResult<Option<DoctorProfile>>> + Send;

    fn registered_patients(&self) -> impl Future<Output = CallResult<Vec<Address>>> + Send;

    fn registered_doctors(&self) -> impl Future<Output = CallResult<Vec<Address>>> + Send;

    /// Records a new pending consultation request from `sender` to `approver`.
    fn request_consultation(
        &self,
        sender: Address,
        approver: Address,
    ) -> impl Future<Output = CallResult<()>> + Send;

    /// Approves the pending request filed by `requester`; only the designated
    /// approver may resolve it.
    fn approve_consultation(
        &self,
        sender: Address,
        requester: Address,
    ) -> impl Future<Output = CallResult<()>> + Send;

    fn reject_consultation(
        &self,
        sender: Address,
        requester: Address,
    ) -> impl Future<Output = CallResult<()>> + Send;

    /// Fetches the request record stored under a derived identifier.
    ///
    /// An identifier nothing was ever stored under yields the default record
    /// (`exists = false`), not an error.
    fn request(&self, id: RequestId)
        -> impl Future<Output = CallResult<ConsultationRecord>> + Send;

    /// The approval boolean the ledger tracks independently of the request
    /// record.
    fn is_approved(
        &self,
        requester: Address,
        approver: Address,
    ) -> impl Future<Output = CallResult<bool>> + Send;

    fn send_prescription(
        &self,
        sender: Address,
        patient: Address,
        handle: &DocumentHandle,
    ) -> impl Future<Output = CallResult<()>> + Send;

    fn send_report(
        &self,
        sender: Address,
        doctor: Address,
        handle: &DocumentHandle,
    ) -> impl Future<Output = CallResult<()>> + Send;
}
