//! Blocks as the gateway reads them from the engine
//!
//! The gateway never builds or validates blocks; it only reads them to answer
//! queries. Each block carries exactly one mint transaction, whose signer is
//! the block's miner.

use crate::core::{Transaction, TxType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An engine-owned block, read-only to the gateway
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: DateTime<Utc>,
    pub previous_hash: String,
    pub txs: Vec<Transaction>,
}

impl Block {
    /// The block's mint transaction
    pub fn mint_tx(&self) -> Option<&Transaction> {
        self.txs.iter().find(|tx| tx.tx_type == TxType::Mint)
    }

    /// Miner attribution: the address of the mint transaction's signer
    pub fn miner_address(&self) -> Option<String> {
        self.mint_tx().and_then(|tx| tx.owner_address())
    }
}
