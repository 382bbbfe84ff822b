//! Read-side query services
//!
//! Balance with the pending pool applied, per-address history, paginated
//! block ranges with miner attribution, and the pending-pool listing. Every
//! read is a snapshot that may be stale by the time the response is sent.

use crate::core::{Block, Transaction, TxType};
use crate::engine::{AccountStore, ChainView};
use serde::Serialize;

/// Blocks returned when a range request gives no bounds
const DEFAULT_RANGE: u64 = 20;

/// A transaction annotated with its containing block index
#[derive(Debug, Serialize)]
pub struct TxRecord {
    #[serde(flatten)]
    pub tx: Transaction,
    pub block: u64,
}

/// Per-address history, bucketed into sent, received, and mined
#[derive(Debug, Default, Serialize)]
pub struct History {
    pub send: Vec<TxRecord>,
    pub recv: Vec<TxRecord>,
    pub mine: Vec<TxRecord>,
}

/// A block annotated with its miner's address
#[derive(Debug, Serialize)]
pub struct BlockView {
    #[serde(flatten)]
    pub block: Block,
    pub miner: String,
}

/// A paginated slice of the chain, blocks in descending index order
#[derive(Debug, Serialize)]
pub struct BlockRange {
    pub start: u64,
    pub end: u64,
    pub blocks: Vec<BlockView>,
}

/// A pending transaction with its sender address resolved
#[derive(Debug, Serialize)]
pub struct PoolEntry {
    #[serde(flatten)]
    pub tx: Transaction,
    pub from: String,
}

/// Settled balance with the pending pool applied as an overlay
pub fn balance(chain: &dyn ChainView, accounts: &dyn AccountStore, address: &str) -> u64 {
    let settled = accounts.account(address).amount;
    let mut effective = settled as i128;
    for tx in chain.pending_pool() {
        if tx.tx_type != TxType::Spend {
            continue;
        }
        if tx.owner_address().as_deref() == Some(address) {
            effective -= tx.amount as i128;
        }
        if tx.to == address {
            effective += tx.amount as i128;
        }
    }
    effective.max(0) as u64
}

/// Reconstruct an address's history from its recorded block indices
///
/// Most recent blocks first. A transaction signed by the address is "send"
/// (or "mine" when the block came from the mined list); a spend paying the
/// address is "recv".
pub fn history(chain: &dyn ChainView, accounts: &dyn AccountStore, address: &str) -> History {
    let account = accounts.account(address);
    let mut txs = History::default();

    for &index in account.tx_blocks.iter().rev() {
        let block = match chain.block(index) {
            Some(block) => block,
            None => continue,
        };
        for tx in block.txs {
            if tx.tx_type != TxType::Spend {
                continue;
            }
            if tx.owner_address().as_deref() == Some(address) {
                txs.send.push(TxRecord { tx, block: index });
            } else if tx.to == address {
                txs.recv.push(TxRecord { tx, block: index });
            }
        }
    }

    for &index in account.mined_blocks.iter().rev() {
        let block = match chain.block(index) {
            Some(block) => block,
            None => continue,
        };
        for tx in block.txs {
            if tx.tx_type == TxType::Mint && tx.owner_address().as_deref() == Some(address) {
                txs.mine.push(TxRecord { tx, block: index });
            }
        }
    }

    txs
}

/// Fetch a block range, defaulting to the last 20 blocks up to the tip
///
/// Stops early when a requested index is missing (the chain is shorter than
/// asked for); always allowed, even mid-sync.
pub fn block_range(chain: &dyn ChainView, start: Option<u64>, end: Option<u64>) -> BlockRange {
    let length = chain.current_length();
    let (start, end) = match (start, end) {
        (None, None) => (length.saturating_sub(DEFAULT_RANGE), length),
        (None, Some(end)) => (end.saturating_sub(DEFAULT_RANGE), end),
        (Some(start), None) => (start, start.saturating_add(DEFAULT_RANGE).min(length)),
        (Some(start), Some(end)) => (start, end),
    };

    let mut blocks = Vec::new();
    for index in start..=end {
        let block = match chain.block(index) {
            Some(block) => block,
            None => break,
        };
        let miner = block.miner_address().unwrap_or_default();
        blocks.push(BlockView { block, miner });
    }
    blocks.reverse();

    BlockRange { start, end, blocks }
}

/// Pending-pool snapshot with each transaction's sender resolved
pub fn pending_pool(chain: &dyn ChainView) -> Vec<PoolEntry> {
    chain
        .pending_pool()
        .into_iter()
        .map(|tx| {
            let from = tx.owner_address().unwrap_or_default();
            PoolEntry { tx, from }
        })
        .collect()
}
