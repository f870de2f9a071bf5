//! Core value types for the MedLedger client.
//!
//! The ledger identifies every patient and doctor by an opaque party handle and
//! every consultation request by a digest of an ordered party pair. To keep
//! identifier handling deterministic and consistent across the codebase, this
//! crate provides *canonical* wrapper types: once constructed, a value is known
//! to be in canonical form and can be compared, hashed and displayed without
//! further normalisation.
//!
//! - [`Address`]: a 20-byte party handle; canonical text form is `0x` + 40
//!   lowercase hex characters.
//! - [`RequestId`]: a 32-byte request digest, displayed as 64 lowercase hex
//!   characters.
//! - [`DocumentHandle`]: an opaque, non-empty content-store token.
//! - [`Role`]: the closed patient/doctor enumeration.
//!
//! Parsing is the only entry point for externally supplied text (CLI input,
//! gateway responses); the constructors normalise where the wire format allows
//! more than one spelling of the same value, and reject everything else.

mod address;
mod handle;
mod request_id;
mod role;

pub use address::{Address, AddressError};
pub use handle::{DocumentHandle, HandleError};
pub use request_id::RequestId;
pub use role::{Role, RoleError};
