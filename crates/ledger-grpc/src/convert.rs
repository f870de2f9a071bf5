//! Conversions between wire messages and core domain types.

use ledger_proto::pb;
use medledger_core::{ConsultationRecord, DoctorProfile, PatientProfile};
use medledger_types::Address;

pub(crate) fn register_patient_req(
    sender: Address,
    profile: &PatientProfile,
) -> pb::RegisterPatientReq {
    pb::RegisterPatientReq {
        sender: sender.to_string(),
        first_name: profile.first_name.clone(),
        last_name: profile.last_name.clone(),
        date_of_birth: profile.date_of_birth.clone(),
        email: profile.email.clone(),
        gender: profile.gender.clone(),
        home_address: profile.home_address.clone(),
        phone_number: profile.phone_number.clone(),
        blood_group: profile.blood_group.clone(),
        insurance_provider: profile.insurance_provider.clone(),
        policy_number: profile.policy_number.clone(),
    }
}

pub(crate) fn register_doctor_req(
    sender: Address,
    profile: &DoctorProfile,
) -> pb::RegisterDoctorReq {
    pb::RegisterDoctorReq {
        sender: sender.to_string(),
        first_name: profile.first_name.clone(),
        last_name: profile.last_name.clone(),
        specialization: profile.specialization.clone(),
        email: profile.email.clone(),
        phone_number: profile.phone_number.clone(),
        license_number: profile.license_number.clone(),
        experience_years: profile.experience_years.clone(),
        clinic_address: profile.clinic_address.clone(),
        date_of_birth: profile.date_of_birth.clone(),
    }
}

/// Maps a patient read to the domain: `None` when the party never registered.
pub(crate) fn patient_from_res(res: pb::GetPatientRes) -> Option<PatientProfile> {
    if !res.is_registered {
        return None;
    }
    Some(PatientProfile {
        first_name: res.first_name,
        last_name: res.last_name,
        date_of_birth: res.date_of_birth,
        email: res.email,
        gender: res.gender,
        home_address: res.home_address,
        phone_number: res.phone_number,
        blood_group: res.blood_group,
        insurance_provider: res.insurance_provider,
        policy_number: res.policy_number,
    })
}

pub(crate) fn doctor_from_res(res: pb::GetDoctorRes) -> Option<DoctorProfile> {
    if !res.is_registered {
        return None;
    }
    Some(DoctorProfile {
        first_name: res.first_name,
        last_name: res.last_name,
        specialization: res.specialization,
        email: res.email,
        phone_number: res.phone_number,
        license_number: res.license_number,
        experience_years: res.experience_years,
        clinic_address: res.clinic_address,
        date_of_birth: res.date_of_birth,
    })
}

pub(crate) fn record_from_res(res: pb::GetRequestRes) -> ConsultationRecord {
    ConsultationRecord {
        exists: res.exists,
        approved: res.approved,
    }
}

/// Parses a party list, skipping handles that fail to parse.
///
/// The registry is append-only and externally controlled; one malformed
/// entry must not take down a whole directory listing.
pub(crate) fn parties_from_res(res: pb::PartyListRes) -> Vec<Address> {
    res.parties
        .iter()
        .filter_map(|raw| match Address::parse(raw) {
            Ok(address) => Some(address),
            Err(error) => {
                tracing::warn!(raw, %error, "skipping malformed party handle");
                None
            }
        })
        .collect()
}
