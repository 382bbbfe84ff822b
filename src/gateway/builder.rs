//! Transaction construction and submission
//!
//! Turns an unlocked wallet plus a send request into a signed spend
//! transaction and appends it to the engine's pending pool. The pool append
//! is the last step and the only durable side effect, so any earlier failure
//! leaves nothing behind. The builder never retries; the gateway does not
//! validate chain rules (balance, double-spend) — that is the engine's job.

use crate::core::{Transaction, TxType};
use crate::engine::{AccountStore, ChainView};
use crate::gateway::error::GatewayError;
use crate::wallet::Wallet;

/// Build a spend transaction, sign it, and push it into the pending pool
///
/// The sequence count is the engine's count of transactions already known to
/// be authored by the sender; a fresh address starts at 0. Two concurrent
/// sends from the same wallet can resolve the same count — ordering
/// enforcement belongs to the pool and consensus layers, not here.
pub fn build_and_submit(
    chain: &dyn ChainView,
    accounts: &dyn AccountStore,
    wallet: &Wallet,
    recipient: &str,
    amount: u64,
    message: &str,
) -> Result<Transaction, GatewayError> {
    if amount == 0 {
        return Err(GatewayError::InvalidAmount);
    }
    if recipient.is_empty() {
        return Err(GatewayError::MissingRecipient);
    }

    let mut tx = Transaction {
        tx_type: TxType::Spend,
        amount,
        to: recipient.to_string(),
        message: message.to_string(),
        count: accounts.known_tx_count(&wallet.address()),
        pubkeys: vec![wallet.public_key()],
        signatures: vec![],
    };

    let signature = wallet
        .sign(&tx.signing_digest())
        .map_err(|e| GatewayError::Engine(e.to_string()))?;
    tx.signatures.push(signature.into());

    chain.submit(tx.clone())?;
    log::info!(
        "Submitted spend of {} to {} (count {})",
        tx.amount,
        tx.to,
        tx.count
    );
    Ok(tx)
}
