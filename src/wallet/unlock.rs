//! Wallet unlock service
//!
//! Resolves a wallet name (falling back to the account store's default
//! wallet), fetches the sealed blob, and opens it with the caller's password.
//! The decrypted wallet lives only as long as the caller's scope.

use crate::engine::AccountStore;
use crate::gateway::error::GatewayError;
use crate::wallet::{vault, Wallet};

/// Per-request wallet unlocking against an account store
pub struct WalletUnlocker<'a> {
    accounts: &'a dyn AccountStore,
}

impl<'a> WalletUnlocker<'a> {
    pub fn new(accounts: &'a dyn AccountStore) -> Self {
        Self { accounts }
    }

    /// Unlock a wallet by name, or the default wallet when no name is given
    pub fn unlock(
        &self,
        name: Option<&str>,
        password: Option<&str>,
    ) -> Result<Wallet, GatewayError> {
        let (name, password) = match name {
            Some(name) => (
                name.to_string(),
                password.unwrap_or_default().to_string(),
            ),
            None => {
                let default = self
                    .accounts
                    .default_wallet()
                    .ok_or(GatewayError::NoWalletSpecified)?;
                // An explicit password still wins over the stored one
                let password = password
                    .map(str::to_string)
                    .unwrap_or(default.password);
                (default.name, password)
            }
        };

        let blob = self
            .accounts
            .encrypted_wallet(&name)
            .ok_or(GatewayError::WalletNotFound)?;
        Ok(vault::open(&password, &blob)?)
    }
}
