//! In-memory engine
//!
//! A complete, self-contained implementation of the collaborator traits. The
//! binary runs on it, and tests inject it wherever a gateway needs an engine.
//! Background engine components report state changes through the notification
//! bus when one is attached.

use crate::core::{Account, Block, Transaction, TxType};
use crate::engine::{
    AccountStore, ChainView, DefaultWallet, EngineError, MinerControl, MinerState, NodeIdentity,
    Peer, SyncState,
};
use crate::gateway::websocket::{EventBus, GatewayEvent};
use crate::wallet::Wallet;
use rand::{thread_rng, Rng};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Default)]
struct EngineData {
    blocks: Vec<Block>,
    pool: Vec<Transaction>,
    accounts: HashMap<String, Account>,
    wallets: HashMap<String, Vec<u8>>,
    default_wallet: Option<DefaultWallet>,
    peers: Vec<Peer>,
    known_length: u64,
    difficulty: f64,
    syncing: bool,
    miner_running: bool,
    miner_wallet: Option<Wallet>,
}

/// Engine state behind a single lock, collaborator traits on top
pub struct MemoryEngine {
    node_id: String,
    inner: RwLock<EngineData>,
    bus: Option<Arc<dyn EventBus>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        let id: [u8; 16] = thread_rng().gen();
        Self {
            node_id: hex::encode(id),
            inner: RwLock::new(EngineData {
                difficulty: 1.0,
                ..EngineData::default()
            }),
            bus: None,
        }
    }

    /// Attach a notification bus; engine-side events are published to it
    pub fn with_bus(bus: Arc<dyn EventBus>) -> Self {
        Self {
            bus: Some(bus),
            ..Self::new()
        }
    }

    fn publish(&self, event: GatewayEvent) {
        if let Some(bus) = &self.bus {
            bus.publish(event);
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, EngineData> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, EngineData> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a block: settle its transactions into account snapshots, drop
    /// them from the pending pool, and announce the new tip.
    pub fn add_block(&self, block: Block) {
        {
            let mut data = self.write();
            for tx in &block.txs {
                let owner = match tx.owner_address() {
                    Some(owner) => owner,
                    None => continue,
                };
                match tx.tx_type {
                    TxType::Mint => {
                        let account = entry(&mut data.accounts, &owner);
                        account.amount += tx.amount;
                        account.mined_blocks.push(block.index);
                    }
                    TxType::Spend => {
                        let account = entry(&mut data.accounts, &owner);
                        account.amount = account.amount.saturating_sub(tx.amount);
                        account.tx_blocks.push(block.index);

                        let to = tx.to.clone();
                        let recipient = entry(&mut data.accounts, &to);
                        recipient.amount += tx.amount;
                        recipient.tx_blocks.push(block.index);
                    }
                }
            }
            data.pool.retain(|pending| !block.txs.contains(pending));
            let index = block.index;
            data.blocks.push(block);
            data.known_length = data.known_length.max(index);
        }
        self.publish(GatewayEvent::NewBlock);
    }

    pub fn set_syncing(&self, syncing: bool) {
        self.write().syncing = syncing;
    }

    pub fn set_known_length(&self, length: u64) {
        self.write().known_length = length;
    }

    pub fn set_difficulty(&self, difficulty: f64) {
        self.write().difficulty = difficulty;
    }

    pub fn add_peer(&self, peer: Peer) {
        self.write().peers.push(peer);
        self.publish(GatewayEvent::PeerUpdate);
    }

    /// Replace an account snapshot wholesale
    pub fn put_account(&self, account: Account) {
        self.write()
            .accounts
            .insert(account.address.clone(), account);
    }

    /// The wallet last handed to the miner, if any
    pub fn miner_wallet(&self) -> Option<Wallet> {
        self.read().miner_wallet.clone()
    }

    /// Idempotent engine shutdown: stop background work
    pub fn stop(&self) {
        let mut data = self.write();
        data.miner_running = false;
        log::info!("Engine stopped");
    }
}

fn entry<'a>(accounts: &'a mut HashMap<String, Account>, address: &str) -> &'a mut Account {
    accounts
        .entry(address.to_string())
        .or_insert_with(|| Account::empty(address))
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainView for MemoryEngine {
    fn sync_state(&self) -> SyncState {
        if self.read().syncing {
            SyncState::Syncing
        } else {
            SyncState::Idle
        }
    }

    fn current_length(&self) -> u64 {
        self.read().blocks.last().map(|b| b.index).unwrap_or(0)
    }

    fn known_length(&self) -> u64 {
        self.read().known_length
    }

    fn block(&self, index: u64) -> Option<Block> {
        self.read()
            .blocks
            .iter()
            .find(|b| b.index == index)
            .cloned()
    }

    fn difficulty_at(&self, _length: u64) -> f64 {
        self.read().difficulty
    }

    fn pending_pool(&self) -> Vec<Transaction> {
        self.read().pool.clone()
    }

    fn submit(&self, tx: Transaction) -> Result<(), EngineError> {
        self.write().pool.push(tx);
        self.publish(GatewayEvent::NewPoolTx);
        Ok(())
    }
}

impl AccountStore for MemoryEngine {
    fn account(&self, address: &str) -> Account {
        self.read()
            .accounts
            .get(address)
            .cloned()
            .unwrap_or_else(|| Account::empty(address))
    }

    fn known_tx_count(&self, address: &str) -> u64 {
        self.read()
            .blocks
            .iter()
            .flat_map(|b| &b.txs)
            .filter(|tx| tx.owner_address().as_deref() == Some(address))
            .count() as u64
    }

    fn wallet_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().wallets.keys().cloned().collect();
        names.sort();
        names
    }

    fn default_wallet(&self) -> Option<DefaultWallet> {
        self.read().default_wallet.clone()
    }

    fn set_default_wallet(&self, name: &str, password: &str) -> bool {
        let mut data = self.write();
        if !data.wallets.contains_key(name) {
            return false;
        }
        data.default_wallet = Some(DefaultWallet {
            name: name.to_string(),
            password: password.to_string(),
        });
        true
    }

    fn clear_default_wallet(&self) -> bool {
        self.write().default_wallet.take().is_some()
    }

    fn encrypted_wallet(&self, name: &str) -> Option<Vec<u8>> {
        self.read().wallets.get(name).cloned()
    }

    fn store_wallet(&self, name: &str, blob: Vec<u8>) -> bool {
        let mut data = self.write();
        if data.wallets.contains_key(name) {
            return false;
        }
        data.wallets.insert(name.to_string(), blob);
        true
    }

    fn remove_wallet(&self, name: &str) -> bool {
        self.write().wallets.remove(name).is_some()
    }
}

impl MinerControl for MemoryEngine {
    fn state(&self) -> MinerState {
        if self.read().miner_running {
            MinerState::Running
        } else {
            MinerState::Stopped
        }
    }

    fn set_wallet(&self, wallet: Wallet) {
        self.write().miner_wallet = Some(wallet);
    }

    fn start(&self) {
        self.write().miner_running = true;
        log::info!("Miner started");
    }

    fn stop(&self) {
        self.write().miner_running = false;
        log::info!("Miner stopped");
    }
}

impl NodeIdentity for MemoryEngine {
    fn node_id(&self) -> String {
        self.node_id.clone()
    }

    fn peers(&self) -> Vec<Peer> {
        self.read().peers.clone()
    }
}
