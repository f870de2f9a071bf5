//! # Ledger Proto
//!
//! Wire definitions shared by everything that talks to the ledger gateway.
//!
//! Contains:
//! - Protobuf-generated types (`pb` module)
//! - Generated tonic clients for the `Ledger` and `ContentStore` services
//!
//! The gateway and content store are external systems; this crate owns only
//! the client half of the wire contract.

// Re-export the generated protobuf module. The generated code will be placed
// into OUT_DIR at build time by the build script.
pub mod pb {
    tonic::include_proto!("ledger.v1");
}

pub use pb::*;
