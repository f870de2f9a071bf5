//! Registration and directory flows.
//!
//! Everything here is a sweep over the ledger's party registries combined
//! with per-pair lifecycle classification: the doctor directory a patient
//! browses, the pending-request inbox a doctor works through, and the
//! approved-counterparty lists that gate document delivery.
//!
//! Sweeps are tolerant of individual bad entries: a party whose detail fetch
//! fails, or whose profile is missing, is logged and skipped rather than
//! failing the whole listing. Only the registry enumeration itself is
//! load-bearing.

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::{Decision, DoctorProfile, LedgerService, PatientProfile};
use crate::lifecycle::{classify_pair, ConsultationStatus, RequestLifecycleClient};
use crate::poll::StatusSweep;
use medledger_types::{Address, Role};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One row of the doctor directory: a registered doctor plus the status of
/// the browsing patient's request to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorListing {
    pub party: Address,
    pub profile: DoctorProfile,
    pub status: ConsultationStatus,
}

/// One pending request in an approver's inbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxEntry {
    pub party: Address,
    pub profile: PatientProfile,
}

/// The approver's working list of pending requests.
///
/// Resolution is optimistic: the entry is removed before the ledger call, so
/// the list can be re-rendered immediately, and reinstated at its original
/// position if the call fails. This is the compensating-rollback path the
/// optimistic update requires.
#[derive(Debug, Default)]
pub struct ApproverInbox {
    entries: Vec<InboxEntry>,
}

impl ApproverInbox {
    pub fn new(entries: Vec<InboxEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[InboxEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Resolves the pending request from `requester` and removes it from the
    /// inbox.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidInput`] if no entry for `requester` is listed.
    /// - [`LedgerError::ResolutionFailed`] if the ledger call fails; the
    ///   entry is reinstated at its original position.
    pub async fn resolve<L: LedgerService>(
        &mut self,
        lifecycle: &RequestLifecycleClient<L>,
        requester: Address,
        decision: Decision,
    ) -> LedgerResult<()> {
        let position = self
            .entries
            .iter()
            .position(|entry| entry.party == requester)
            .ok_or_else(|| {
                LedgerError::InvalidInput(format!("no pending request from {requester}"))
            })?;

        // Optimistic removal; rolled back below on failure.
        let entry = self.entries.remove(position);

        if let Err(error) = lifecycle.resolve_request(requester, decision).await {
            self.entries.insert(position, entry);
            return Err(error);
        }
        Ok(())
    }
}

/// Directory and registration operations against the ledger.
#[derive(Debug)]
pub struct Registry<L> {
    ledger: Arc<L>,
}

impl<L> Clone for Registry<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
        }
    }
}

impl<L: LedgerService> Registry<L> {
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    /// Registers the sender as a patient.
    ///
    /// Re-registration is the only way to amend a profile; the ledger exposes
    /// no partial update.
    pub async fn register_patient(
        &self,
        sender: Address,
        profile: &PatientProfile,
    ) -> LedgerResult<()> {
        self.ledger
            .register_patient(sender, profile)
            .await
            .map_err(LedgerError::RegistrationFailed)?;
        tracing::info!(%sender, "patient registered");
        Ok(())
    }

    /// Registers the sender as a doctor.
    pub async fn register_doctor(
        &self,
        sender: Address,
        profile: &DoctorProfile,
    ) -> LedgerResult<()> {
        self.ledger
            .register_doctor(sender, profile)
            .await
            .map_err(LedgerError::RegistrationFailed)?;
        tracing::info!(%sender, "doctor registered");
        Ok(())
    }

    /// Fetches the session party's own patient profile.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NotRegistered`] if the party never registered.
    pub async fn patient_dashboard(&self, party: Address) -> LedgerResult<PatientProfile> {
        self.ledger
            .patient(party)
            .await
            .map_err(LedgerError::QueryFailed)?
            .ok_or(LedgerError::NotRegistered {
                party,
                role: Role::Patient,
            })
    }

    /// Fetches the session party's own doctor profile.
    pub async fn doctor_dashboard(&self, party: Address) -> LedgerResult<DoctorProfile> {
        self.ledger
            .doctor(party)
            .await
            .map_err(LedgerError::QueryFailed)?
            .ok_or(LedgerError::NotRegistered {
                party,
                role: Role::Doctor,
            })
    }

    /// The doctor directory as seen by `patient`: every registered doctor
    /// with profile and request status.
    ///
    /// A doctor whose details cannot be fetched is skipped; a doctor whose
    /// classification fails is listed as [`ConsultationStatus::Inactive`]
    /// (no actionable request can be shown for it either way).
    pub async fn doctor_directory(&self, patient: Address) -> LedgerResult<Vec<DoctorListing>> {
        let doctors = self
            .ledger
            .registered_doctors()
            .await
            .map_err(LedgerError::QueryFailed)?;

        let mut listings = Vec::with_capacity(doctors.len());
        for party in doctors {
            let profile = match self.ledger.doctor_details(party).await {
                Ok(Some(profile)) => profile,
                Ok(None) => {
                    tracing::warn!(%party, "registered doctor has no details; skipping");
                    continue;
                }
                Err(error) => {
                    tracing::warn!(%party, %error, "failed to fetch doctor details; skipping");
                    continue;
                }
            };

            let status = match classify_pair(self.ledger.as_ref(), patient, party).await {
                Ok(status) => status,
                Err(error) => {
                    tracing::warn!(%party, %error, "failed to classify request; listing as inactive");
                    ConsultationStatus::Inactive
                }
            };

            listings.push(DoctorListing {
                party,
                profile,
                status,
            });
        }
        Ok(listings)
    }

    /// The pending-request inbox for `doctor`: every registered patient whose
    /// request to this doctor is pending, with profile.
    pub async fn inbox(&self, doctor: Address) -> LedgerResult<ApproverInbox> {
        let patients = self
            .ledger
            .registered_patients()
            .await
            .map_err(LedgerError::QueryFailed)?;

        let mut entries = Vec::new();
        for party in patients {
            let status = match classify_pair(self.ledger.as_ref(), party, doctor).await {
                Ok(status) => status,
                Err(error) => {
                    tracing::warn!(%party, %error, "failed to classify request; skipping");
                    continue;
                }
            };
            if !status.is_pending() {
                continue;
            }

            match self.ledger.patient(party).await {
                Ok(Some(profile)) => entries.push(InboxEntry { party, profile }),
                Ok(None) => {
                    tracing::warn!(%party, "pending requester has no profile; skipping")
                }
                Err(error) => {
                    tracing::warn!(%party, %error, "failed to fetch requester profile; skipping")
                }
            }
        }
        Ok(ApproverInbox::new(entries))
    }

    /// Doctors that have approved `patient`: the valid recipients for its
    /// reports.
    pub async fn approved_doctors(
        &self,
        patient: Address,
    ) -> LedgerResult<Vec<(Address, DoctorProfile)>> {
        let doctors = self
            .ledger
            .registered_doctors()
            .await
            .map_err(LedgerError::QueryFailed)?;

        let mut approved = Vec::new();
        for party in doctors {
            match self.ledger.is_approved(patient, party).await {
                Ok(true) => {}
                Ok(false) => continue,
                Err(error) => {
                    tracing::warn!(%party, %error, "failed approval check; skipping");
                    continue;
                }
            }
            match self.ledger.doctor_details(party).await {
                Ok(Some(profile)) => approved.push((party, profile)),
                Ok(None) | Err(_) => {
                    tracing::warn!(%party, "approved doctor has no details; skipping")
                }
            }
        }
        Ok(approved)
    }

    /// Patients that `doctor` has approved: the valid recipients for its
    /// prescriptions.
    pub async fn approved_patients(
        &self,
        doctor: Address,
    ) -> LedgerResult<Vec<(Address, PatientProfile)>> {
        let patients = self
            .ledger
            .registered_patients()
            .await
            .map_err(LedgerError::QueryFailed)?;

        let mut approved = Vec::new();
        for party in patients {
            match self.ledger.is_approved(party, doctor).await {
                Ok(true) => {}
                Ok(false) => continue,
                Err(error) => {
                    tracing::warn!(%party, %error, "failed approval check; skipping");
                    continue;
                }
            }
            match self.ledger.patient(party).await {
                Ok(Some(profile)) => approved.push((party, profile)),
                Ok(None) | Err(_) => {
                    tracing::warn!(%party, "approved patient has no profile; skipping")
                }
            }
        }
        Ok(approved)
    }

    /// Classification sweep for a requester: the status of `patient`'s
    /// request to every registered doctor. This is what the directory view
    /// polls.
    ///
    /// A pair whose classification fails is omitted from the sweep; the
    /// poller keeps the previous snapshot for it.
    pub async fn requester_sweep(&self, patient: Address) -> LedgerResult<StatusSweep> {
        let doctors = self
            .ledger
            .registered_doctors()
            .await
            .map_err(LedgerError::QueryFailed)?;
        self.sweep_pairs(doctors.into_iter().map(|doctor| (patient, doctor, doctor)))
            .await
    }

    /// Classification sweep for an approver: the status of every registered
    /// patient's request to `doctor`. This is what the inbox view polls.
    pub async fn approver_sweep(&self, doctor: Address) -> LedgerResult<StatusSweep> {
        let patients = self
            .ledger
            .registered_patients()
            .await
            .map_err(LedgerError::QueryFailed)?;
        self.sweep_pairs(
            patients
                .into_iter()
                .map(|patient| (patient, doctor, patient)),
        )
        .await
    }

    /// Classifies `(requester, approver)` pairs, keying each result by the
    /// pair's counterparty.
    async fn sweep_pairs(
        &self,
        pairs: impl Iterator<Item = (Address, Address, Address)>,
    ) -> LedgerResult<StatusSweep> {
        let mut statuses = BTreeMap::new();
        for (requester, approver, counterparty) in pairs {
            match classify_pair(self.ledger.as_ref(), requester, approver).await {
                Ok(status) => {
                    statuses.insert(counterparty, status);
                }
                Err(error) => {
                    tracing::warn!(%counterparty, %error, "sweep classification failed; omitting")
                }
            }
        }
        Ok(StatusSweep { statuses })
    }
}
