//! Aurum Gateway: the public HTTP/WebSocket surface of an aurum node
//!
//! This crate provides the request-facing side of a cryptocurrency node:
//! - Encrypted wallet storage (Argon2id + AES-256-GCM at rest)
//! - Spend transaction construction, signing (secp256k1), and submission
//! - Chain queries: balance with pool overlay, history, block ranges
//! - Sync-aware gating of chain-tip-dependent reads
//! - Miner control and node introspection
//! - WebSocket push notifications for new blocks, pool entries, and peers
//!
//! The engine behind the gateway is abstracted behind the traits in
//! [`engine`]; [`engine::MemoryEngine`] is the in-process implementation.
//!
//! # Example
//!
//! ```rust
//! use aurum_gateway::engine::MemoryEngine;
//! use aurum_gateway::wallet::{vault, Wallet};
//!
//! let wallet = Wallet::generate("alice");
//! println!("Address: {}", wallet.address());
//!
//! // Seal it for storage, open it again with the same password
//! let blob = vault::seal("hunter2", &wallet).unwrap();
//! let reopened = vault::open("hunter2", &blob).unwrap();
//! assert_eq!(reopened.address(), wallet.address());
//! ```

pub mod codec;
pub mod core;
pub mod crypto;
pub mod engine;
pub mod gateway;
pub mod wallet;

// Re-export commonly used types
pub use core::{Account, Block, Transaction, TxType};
pub use crypto::KeyPair;
pub use engine::{
    AccountStore, ChainView, EngineError, MemoryEngine, MinerControl, MinerState, NodeIdentity,
    SyncState,
};
pub use gateway::{create_router, GatewayError, GatewayState, NotificationHub};
pub use wallet::Wallet;
