//! # Ledger gRPC bindings
//!
//! Concrete gateway bindings for the core service seams: [`GrpcLedger`]
//! implements `medledger_core::LedgerService` and [`GrpcContentStore`]
//! implements `medledger_content::ContentStore`, both over the tonic clients
//! generated in `ledger-proto`.
//!
//! [`connect`] performs the gateway handshake: it dials the endpoint, asks
//! the gateway for its network id, resolves the deployed contract from the
//! configured deployments table (failing with `ContractNotDeployed` on a
//! miss), and from then on attaches the resolved contract address to every
//! request as `x-contract-address` metadata. The gateway owns signing and
//! transaction semantics; write calls carry the sender party in the message
//! body.

mod convert;
mod gateway;

pub use gateway::{connect, GrpcContentStore, GrpcLedger};
