//! Wallet session lifecycle.
//!
//! The signing provider (browser extension, keystore, remote signer) is an
//! external black box; this module owns only the session derived from it.
//! The session is an explicitly owned value with a create/clear lifecycle:
//! created on explicit user action, passed to the components that need it,
//! cleared on logout. Nothing here is process-global.

use crate::error::{CallError, LedgerError, LedgerResult};
use medledger_types::Address;
use std::future::Future;

/// The seam to the external signing provider.
///
/// Implementations surface whichever accounts the provider currently
/// authorises. Cryptographic signing itself stays behind the gateway; the
/// client only ever needs the authenticated party handle.
pub trait WalletProvider: Send + Sync {
    /// Requests the provider's authorised accounts.
    ///
    /// Called freshly on every connect so a changed provider state (account
    /// switch, revoked authorisation) is picked up rather than cached.
    fn request_accounts(&self) -> impl Future<Output = Result<Vec<Address>, CallError>> + Send;
}

/// An authenticated wallet session: the party all state-changing calls are
/// issued as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletSession {
    party: Address,
}

impl WalletSession {
    pub fn new(party: Address) -> Self {
        Self { party }
    }

    /// The authenticated party handle.
    pub fn party(&self) -> Address {
        self.party
    }
}

/// Owns the optional provider and the optional session derived from it.
///
/// `provider = None` models an environment with no signing provider installed;
/// connecting in that state fails with [`LedgerError::WalletUnavailable`] and
/// leaves the session unset.
#[derive(Debug)]
pub struct Wallet<P> {
    provider: Option<P>,
    session: Option<WalletSession>,
}

impl<P: WalletProvider> Wallet<P> {
    pub fn new(provider: Option<P>) -> Self {
        Self {
            provider,
            session: None,
        }
    }

    /// Connects to the provider and caches the resulting session.
    ///
    /// Always requests accounts to ensure a fresh connection; the first
    /// account becomes the session party.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::WalletUnavailable`] if no provider is present.
    /// - [`LedgerError::WalletNotConnected`] if the provider reports no
    ///   authorised accounts.
    /// - [`LedgerError::Connection`] if the provider call itself fails.
    pub async fn connect(&mut self) -> LedgerResult<WalletSession> {
        let provider = self.provider.as_ref().ok_or(LedgerError::WalletUnavailable)?;
        let accounts = provider
            .request_accounts()
            .await
            .map_err(LedgerError::Connection)?;
        let party = accounts
            .first()
            .copied()
            .ok_or(LedgerError::WalletNotConnected)?;

        let session = WalletSession::new(party);
        self.session = Some(session);
        tracing::info!(%party, "wallet connected");
        Ok(session)
    }

    /// The current session, if connected.
    ///
    /// # Errors
    ///
    /// [`LedgerError::WalletNotConnected`] when no session is active.
    pub fn session(&self) -> LedgerResult<WalletSession> {
        self.session.ok_or(LedgerError::WalletNotConnected)
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Clears the cached session.
    ///
    /// Providers do not support programmatic revocation; this is app-level
    /// clearing only, taken on logout.
    pub fn disconnect(&mut self) {
        self.session = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::addr;
    use std::sync::Mutex;

    struct StaticProvider {
        accounts: Vec<Address>,
        fail: bool,
        calls: Mutex<usize>,
    }

    impl StaticProvider {
        fn with_accounts(accounts: Vec<Address>) -> Self {
            Self {
                accounts,
                fail: false,
                calls: Mutex::new(0),
            }
        }
    }

    impl WalletProvider for StaticProvider {
        async fn request_accounts(&self) -> Result<Vec<Address>, CallError> {
            *self.calls.lock().unwrap() += 1;
            if self.fail {
                return Err(CallError::Transport("provider offline".into()));
            }
            Ok(self.accounts.clone())
        }
    }

    #[tokio::test]
    async fn connect_without_provider_fails_and_leaves_session_unset() {
        let mut wallet: Wallet<StaticProvider> = Wallet::new(None);

        let result = wallet.connect().await;
        assert!(matches!(result, Err(LedgerError::WalletUnavailable)));
        assert!(!wallet.is_connected());
        assert!(matches!(
            wallet.session(),
            Err(LedgerError::WalletNotConnected)
        ));
    }

    #[tokio::test]
    async fn connect_with_no_accounts_fails() {
        let mut wallet = Wallet::new(Some(StaticProvider::with_accounts(vec![])));

        let result = wallet.connect().await;
        assert!(matches!(result, Err(LedgerError::WalletNotConnected)));
        assert!(!wallet.is_connected());
    }

    #[tokio::test]
    async fn connect_uses_first_account_and_requests_freshly() {
        let provider = StaticProvider::with_accounts(vec![addr(0x01), addr(0x02)]);
        let mut wallet = Wallet::new(Some(provider));

        let session = wallet.connect().await.unwrap();
        assert_eq!(session.party(), addr(0x01));
        assert!(wallet.is_connected());

        wallet.connect().await.unwrap();
        assert_eq!(*wallet.provider.as_ref().unwrap().calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn connect_failure_surfaces_connection_error() {
        let mut provider = StaticProvider::with_accounts(vec![addr(0x01)]);
        provider.fail = true;
        let mut wallet = Wallet::new(Some(provider));

        let result = wallet.connect().await;
        assert!(matches!(result, Err(LedgerError::Connection(_))));
        assert!(!wallet.is_connected());
    }

    #[tokio::test]
    async fn disconnect_clears_the_session() {
        let mut wallet = Wallet::new(Some(StaticProvider::with_accounts(vec![addr(0x01)])));
        wallet.connect().await.unwrap();
        assert!(wallet.is_connected());

        wallet.disconnect();
        assert!(!wallet.is_connected());
        assert!(matches!(
            wallet.session(),
            Err(LedgerError::WalletNotConnected)
        ));
    }
}
