//! In-memory fakes shared by the unit tests.
//!
//! `MockLedger` models the contract's observable behaviour: request records
//! keyed by derived identifier, the independent approval set, and profile
//! registries. `MockStore` models the content store. Both push write events
//! into a (optionally shared) log so tests can assert call ordering across
//! the two services.

use crate::error::CallError;
use crate::ledger::{
    CallResult, ConsultationRecord, DoctorProfile, LedgerService, PatientProfile,
};
use crate::lifecycle::derive_request_id;
use medledger_content::{ContentError, ContentResult, ContentStore, OutboundDocument};
use medledger_types::{Address, DocumentHandle, RequestId};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, Mutex};

pub(crate) type SharedLog = Arc<Mutex<Vec<String>>>;

pub(crate) fn shared_log() -> SharedLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// A 20-byte address with every byte set to `byte`.
pub(crate) fn addr(byte: u8) -> Address {
    Address::from_bytes([byte; 20])
}

pub(crate) fn patient_profile(first_name: &str) -> PatientProfile {
    PatientProfile {
        first_name: first_name.to_owned(),
        last_name: "Lovelace".to_owned(),
        date_of_birth: "1990-01-01".to_owned(),
        email: format!("{}@example.org", first_name.to_ascii_lowercase()),
        blood_group: "O+".to_owned(),
        ..PatientProfile::default()
    }
}

pub(crate) fn doctor_profile(first_name: &str) -> DoctorProfile {
    DoctorProfile {
        first_name: first_name.to_owned(),
        last_name: "Hopper".to_owned(),
        specialization: "Cardiology".to_owned(),
        license_number: "MD-1234".to_owned(),
        ..DoctorProfile::default()
    }
}

#[derive(Default)]
struct LedgerState {
    patients: BTreeMap<Address, PatientProfile>,
    doctors: BTreeMap<Address, DoctorProfile>,
    records: BTreeMap<RequestId, ConsultationRecord>,
    approvals: BTreeSet<(Address, Address)>,
    failing: HashSet<&'static str>,
    sends_made: usize,
    fail_send_on: Option<usize>,
}

/// In-memory stand-in for the ledger gateway.
pub(crate) struct MockLedger {
    state: Mutex<LedgerState>,
    log: SharedLog,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::with_log(shared_log())
    }
}

impl MockLedger {
    pub(crate) fn with_log(log: SharedLog) -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
            log,
        }
    }

    pub(crate) fn add_patient(&self, party: Address, profile: PatientProfile) {
        self.state.lock().unwrap().patients.insert(party, profile);
    }

    pub(crate) fn add_doctor(&self, party: Address, profile: DoctorProfile) {
        self.state.lock().unwrap().doctors.insert(party, profile);
    }

    pub(crate) fn set_record(&self, id: RequestId, record: ConsultationRecord) {
        self.state.lock().unwrap().records.insert(id, record);
    }

    pub(crate) fn set_approved(&self, requester: Address, approver: Address) {
        self.state
            .lock()
            .unwrap()
            .approvals
            .insert((requester, approver));
    }

    /// Makes every subsequent call to `method` fail.
    pub(crate) fn fail_method(&self, method: &'static str) {
        self.state.lock().unwrap().failing.insert(method);
    }

    /// Makes the `n`-th (1-based) document-record call fail.
    pub(crate) fn fail_send_number(&self, n: usize) {
        self.state.lock().unwrap().fail_send_on = Some(n);
    }

    /// Number of logged write events for `method`.
    pub(crate) fn call_count(&self, method: &str) -> usize {
        let prefix = format!("{method}:");
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| *entry == method || entry.starts_with(&prefix))
            .count()
    }

    fn write(&self, event: String, method: &'static str) -> CallResult<()> {
        self.log.lock().unwrap().push(event);
        if self.state.lock().unwrap().failing.contains(method) {
            return Err(CallError::Rejected(format!("injected {method} failure")));
        }
        Ok(())
    }
}

impl LedgerService for MockLedger {
    async fn register_patient(
        &self,
        sender: Address,
        profile: &PatientProfile,
    ) -> CallResult<()> {
        self.write("register_patient".into(), "register_patient")?;
        self.state
            .lock()
            .unwrap()
            .patients
            .insert(sender, profile.clone());
        Ok(())
    }

    async fn register_doctor(&self, sender: Address, profile: &DoctorProfile) -> CallResult<()> {
        self.write("register_doctor".into(), "register_doctor")?;
        self.state
            .lock()
            .unwrap()
            .doctors
            .insert(sender, profile.clone());
        Ok(())
    }

    async fn patient(&self, party: Address) -> CallResult<Option<PatientProfile>> {
        Ok(self.state.lock().unwrap().patients.get(&party).cloned())
    }

    async fn doctor(&self, party: Address) -> CallResult<Option<DoctorProfile>> {
        Ok(self.state.lock().unwrap().doctors.get(&party).cloned())
    }

    async fn doctor_details(&self, party: Address) -> CallResult<Option<DoctorProfile>> {
        self.doctor(party).await
    }

    async fn registered_patients(&self) -> CallResult<Vec<Address>> {
        Ok(self.state.lock().unwrap().patients.keys().copied().collect())
    }

    async fn registered_doctors(&self) -> CallResult<Vec<Address>> {
        Ok(self.state.lock().unwrap().doctors.keys().copied().collect())
    }

    async fn request_consultation(&self, sender: Address, approver: Address) -> CallResult<()> {
        self.write("request_consultation".into(), "request_consultation")?;
        self.state.lock().unwrap().records.insert(
            derive_request_id(sender, approver),
            ConsultationRecord {
                exists: true,
                approved: false,
            },
        );
        Ok(())
    }

    async fn approve_consultation(&self, sender: Address, requester: Address) -> CallResult<()> {
        self.write("approve_consultation".into(), "approve_consultation")?;
        let mut state = self.state.lock().unwrap();
        state.records.insert(
            derive_request_id(requester, sender),
            ConsultationRecord {
                exists: true,
                approved: true,
            },
        );
        state.approvals.insert((requester, sender));
        Ok(())
    }

    async fn reject_consultation(&self, sender: Address, requester: Address) -> CallResult<()> {
        self.write("reject_consultation".into(), "reject_consultation")?;
        self.state
            .lock()
            .unwrap()
            .records
            .remove(&derive_request_id(requester, sender));
        Ok(())
    }

    async fn request(&self, id: RequestId) -> CallResult<ConsultationRecord> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .records
            .get(&id)
            .copied()
            .unwrap_or_default())
    }

    async fn is_approved(&self, requester: Address, approver: Address) -> CallResult<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .approvals
            .contains(&(requester, approver)))
    }

    async fn send_prescription(
        &self,
        _sender: Address,
        _patient: Address,
        handle: &DocumentHandle,
    ) -> CallResult<()> {
        self.record_send(format!("send_prescription:{handle}"), "send_prescription")
    }

    async fn send_report(
        &self,
        _sender: Address,
        _doctor: Address,
        handle: &DocumentHandle,
    ) -> CallResult<()> {
        self.record_send(format!("send_report:{handle}"), "send_report")
    }
}

impl MockLedger {
    fn record_send(&self, event: String, method: &'static str) -> CallResult<()> {
        self.log.lock().unwrap().push(event);
        let mut state = self.state.lock().unwrap();
        state.sends_made += 1;
        if state.failing.contains(method) || state.fail_send_on == Some(state.sends_made) {
            return Err(CallError::Rejected(format!("injected {method} failure")));
        }
        Ok(())
    }
}

/// In-memory stand-in for the content store. Handles are derived from the
/// filename (`h-<filename>`) so tests can pair uploads with record calls.
pub(crate) struct MockStore {
    log: SharedLog,
    uploads_made: Mutex<usize>,
    fail_upload_on: Mutex<Option<usize>>,
}

impl MockStore {
    pub(crate) fn with_log(log: SharedLog) -> Self {
        Self {
            log,
            uploads_made: Mutex::new(0),
            fail_upload_on: Mutex::new(None),
        }
    }

    /// Makes the `n`-th (1-based) upload fail.
    pub(crate) fn fail_upload_number(&self, n: usize) {
        *self.fail_upload_on.lock().unwrap() = Some(n);
    }
}

impl ContentStore for MockStore {
    async fn upload(&self, document: &OutboundDocument) -> ContentResult<DocumentHandle> {
        self.log
            .lock()
            .unwrap()
            .push(format!("upload:{}", document.filename()));

        let mut uploads = self.uploads_made.lock().unwrap();
        *uploads += 1;
        if *self.fail_upload_on.lock().unwrap() == Some(*uploads) {
            return Err(ContentError::Rejected("injected upload failure".into()));
        }

        Ok(DocumentHandle::new(format!("h-{}", document.filename()))
            .expect("filenames in tests are valid handles"))
    }
}
