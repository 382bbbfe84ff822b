//! Gateway error kinds
//!
//! Every user-input or wallet-crypto failure is caught at the operation
//! boundary and turned into a `{"success": false, "error": ...}` body.
//! Serialization failures are handled separately by the codec and abort the
//! response instead.

use crate::engine::EngineError;
use crate::wallet::VaultError;
use thiserror::Error;

/// Errors surfaced by gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Amount cannot be lower than or equal to 0")]
    InvalidAmount,
    #[error("You need to specify a receiving address for the transaction")]
    MissingRecipient,
    #[error("Wallet name is not given and there is no default wallet")]
    NoWalletSpecified,
    #[error("Wallet doesn't exist")]
    WalletNotFound,
    #[error("Wallet could not be unlocked")]
    WalletUnlockFailed,
    #[error("Cannot remove default wallet. First remove its default state!")]
    CannotRemoveDefaultWallet,
    #[error("Miner is already running")]
    AlreadyRunning,
    #[error("Miner is not running")]
    NotRunning,
    #[error("Engine unavailable: {0}")]
    Engine(String),
}

impl From<VaultError> for GatewayError {
    fn from(_: VaultError) -> Self {
        GatewayError::WalletUnlockFailed
    }
}

impl From<EngineError> for GatewayError {
    fn from(e: EngineError) -> Self {
        GatewayError::Engine(e.to_string())
    }
}
