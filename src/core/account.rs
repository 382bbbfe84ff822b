//! Account snapshots
//!
//! Engine-owned, read-only to the gateway. `tx_blocks` lists the indices of
//! blocks holding transactions the account sent or received; `mined_blocks`
//! the blocks it mined. The gateway composes the pending pool over the settled
//! `amount` to report an effective balance; it never mutates a snapshot.

use serde::{Deserialize, Serialize};

/// Settled state of a single address
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    pub address: String,
    pub amount: u64,
    pub tx_blocks: Vec<u64>,
    pub mined_blocks: Vec<u64>,
}

impl Account {
    /// A fresh account with no history
    pub fn empty(address: &str) -> Self {
        Self {
            address: address.to_string(),
            amount: 0,
            tx_blocks: Vec::new(),
            mined_blocks: Vec::new(),
        }
    }
}
