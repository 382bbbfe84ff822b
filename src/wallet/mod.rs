//! Wallet handling: in-memory wallets, sealed storage, unlock service

pub mod unlock;
pub mod vault;
pub mod wallet;

pub use unlock::WalletUnlocker;
pub use vault::VaultError;
pub use wallet::{Wallet, WalletError};
