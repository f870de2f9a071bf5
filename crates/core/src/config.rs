//! Client runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the
//! components that need it. The intent is to avoid reading process-wide
//! environment variables during operation, which can lead to inconsistent
//! behaviour in multi-threaded runtimes and test harnesses.

use crate::error::{LedgerError, LedgerResult};
use medledger_types::Address;
use std::collections::BTreeMap;
use std::time::Duration;

/// Client configuration resolved at startup.
///
/// The gateway process hosts both the ledger service and the content store,
/// so a single endpoint covers both. The deployments table maps a network id
/// to the contract deployed there; resolution happens during the gateway
/// handshake, not per call.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    gateway_addr: String,
    deployments: BTreeMap<u64, Address>,
    poll_interval: Duration,
}

impl ClientConfig {
    /// Create a new `ClientConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidInput`] if the gateway address is empty
    /// or the poll interval is zero.
    pub fn new(
        gateway_addr: impl Into<String>,
        deployments: BTreeMap<u64, Address>,
        poll_interval: Duration,
    ) -> LedgerResult<Self> {
        let gateway_addr = gateway_addr.into();
        if gateway_addr.trim().is_empty() {
            return Err(LedgerError::InvalidInput(
                "gateway address cannot be empty".into(),
            ));
        }
        if poll_interval.is_zero() {
            return Err(LedgerError::InvalidInput(
                "poll interval must be greater than zero".into(),
            ));
        }

        Ok(Self {
            gateway_addr,
            deployments,
            poll_interval,
        })
    }

    pub fn gateway_addr(&self) -> &str {
        &self.gateway_addr
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Resolves the contract deployed on `network_id`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::ContractNotDeployed`] when the table has no entry for
    /// the network.
    pub fn contract_address(&self, network_id: u64) -> LedgerResult<Address> {
        self.deployments
            .get(&network_id)
            .copied()
            .ok_or(LedgerError::ContractNotDeployed { network_id })
    }
}

/// Parses a deployments table from `network=address` entries separated by
/// commas, e.g. `1337=0xabc…,1=0xdef…`. Empty entries are ignored.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidInput`] on a malformed entry, naming the
/// offending fragment.
pub fn parse_deployments(input: &str) -> LedgerResult<BTreeMap<u64, Address>> {
    let mut deployments = BTreeMap::new();

    for entry in input.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let (network, address) = entry.split_once('=').ok_or_else(|| {
            LedgerError::InvalidInput(format!(
                "deployment entry '{entry}' is not in network=address form"
            ))
        })?;

        let network_id: u64 = network.trim().parse().map_err(|_| {
            LedgerError::InvalidInput(format!("deployment network id '{network}' is not a number"))
        })?;
        let address = Address::parse(address)
            .map_err(|e| LedgerError::InvalidInput(format!("deployment address: {e}")))?;

        deployments.insert(network_id, address);
    }

    Ok(deployments)
}
