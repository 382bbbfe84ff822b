//! Sync-state gate for chain-tip-dependent reads
//!
//! Balance, history, and difficulty are only meaningful against a stable
//! chain tip; while the engine is syncing they answer with a notice carrying
//! the local and best-known chain lengths instead of a value computed against
//! a chain mid-reorganization. The wrapped read is not executed at all in
//! that case. Write paths and tip-independent reads never go through here.

use crate::engine::{ChainView, SyncState};
use serde::Serialize;

/// Result of a gated read: the value, or a syncing notice
///
/// The notice is a documented alternate result, not an error.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Gated<T> {
    Ready(T),
    Syncing(SyncingNotice),
}

impl<T> Gated<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Gated::Ready(_))
    }
}

/// "Cannot answer reliably right now", with the sync progress
#[derive(Clone, Debug, Serialize)]
pub struct SyncingNotice {
    pub syncing: bool,
    pub length: u64,
    pub known_length: u64,
}

/// Gate over one chain view
pub struct SyncGate<'a> {
    chain: &'a dyn ChainView,
}

impl<'a> SyncGate<'a> {
    pub fn new(chain: &'a dyn ChainView) -> Self {
        Self { chain }
    }

    /// Run `read` if the chain is idle, otherwise report sync progress
    pub fn guard<T>(&self, read: impl FnOnce() -> T) -> Gated<T> {
        match self.chain.sync_state() {
            SyncState::Idle => Gated::Ready(read()),
            SyncState::Syncing => Gated::Syncing(SyncingNotice {
                syncing: true,
                length: self.chain.current_length(),
                known_length: self.chain.known_length(),
            }),
        }
    }
}
