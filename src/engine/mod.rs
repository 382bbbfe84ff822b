//! Engine collaborator contracts
//!
//! The consensus, storage, and networking internals run as an independent
//! engine; the gateway only talks to it through these traits. Handlers hold
//! trait objects injected at construction, so tests can swap in fakes and no
//! process-wide singleton exists.

pub mod memory;

use crate::core::{Account, Block, Transaction};
use crate::wallet::Wallet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::MemoryEngine;

/// Whether the local chain copy is caught up with the network
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Syncing,
}

/// Whether the local miner is running
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MinerState {
    Running,
    Stopped,
}

/// A known peer of the node
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Peer {
    pub host: String,
    pub port: u16,
}

/// The account store's default wallet designation
#[derive(Clone, Debug)]
pub struct DefaultWallet {
    pub name: String,
    pub password: String,
}

/// Failure surfaced by a collaborator call
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    Unavailable(String),
}

/// Chain database and pending pool access
pub trait ChainView: Send + Sync {
    fn sync_state(&self) -> SyncState;
    fn current_length(&self) -> u64;
    fn known_length(&self) -> u64;
    fn block(&self, index: u64) -> Option<Block>;
    fn difficulty_at(&self, length: u64) -> f64;
    /// Snapshot of the pending pool contents
    fn pending_pool(&self) -> Vec<Transaction>;
    /// Single atomic append to the pending pool
    fn submit(&self, tx: Transaction) -> Result<(), EngineError>;
}

/// Account snapshots and the encrypted wallet store
pub trait AccountStore: Send + Sync {
    fn account(&self, address: &str) -> Account;
    /// Number of transactions the engine already knows as authored by `address`
    fn known_tx_count(&self, address: &str) -> u64;
    fn wallet_names(&self) -> Vec<String>;
    fn default_wallet(&self) -> Option<DefaultWallet>;
    fn set_default_wallet(&self, name: &str, password: &str) -> bool;
    fn clear_default_wallet(&self) -> bool;
    fn encrypted_wallet(&self, name: &str) -> Option<Vec<u8>>;
    /// Store a sealed blob under `name`; refuses to overwrite an existing one
    fn store_wallet(&self, name: &str, blob: Vec<u8>) -> bool;
    fn remove_wallet(&self, name: &str) -> bool;
}

/// Local miner control
pub trait MinerControl: Send + Sync {
    fn state(&self) -> MinerState;
    fn set_wallet(&self, wallet: Wallet);
    fn start(&self);
    fn stop(&self);
}

/// Node identity and peer table
pub trait NodeIdentity: Send + Sync {
    fn node_id(&self) -> String;
    fn peers(&self) -> Vec<Peer>;
}
