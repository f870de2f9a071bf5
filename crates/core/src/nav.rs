//! Role-gated navigation.
//!
//! Which surfaces a party may use is a function of its role, and the mapping
//! is a static table over the closed [`Role`] enumeration, with no
//! string-typed dispatch anywhere.

use medledger_types::Role;

/// The interactive surfaces of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// The party's own profile.
    Dashboard,
    /// Registered doctors with per-doctor consultation status (patient side).
    DoctorDirectory,
    /// Pending consultation requests awaiting decision (doctor side).
    RequestInbox,
    /// Report delivery to an approved doctor (patient side).
    SendReports,
    /// Prescription delivery to an approved patient (doctor side).
    SendPrescriptions,
}

const PATIENT_VIEWS: &[View] = &[View::Dashboard, View::DoctorDirectory, View::SendReports];
const DOCTOR_VIEWS: &[View] = &[View::Dashboard, View::RequestInbox, View::SendPrescriptions];

/// Returns the views a role may use.
pub fn allowed_views(role: Role) -> &'static [View] {
    match role {
        Role::Patient => PATIENT_VIEWS,
        Role::Doctor => DOCTOR_VIEWS,
    }
}

/// Returns true if `role` may use `view`.
pub fn is_allowed(role: Role, view: View) -> bool {
    allowed_views(role).contains(&view)
}
