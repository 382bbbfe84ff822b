//! Request handlers for the gateway surface
//!
//! Each handler runs on its own task, holds no per-request state beyond its
//! arguments, and talks to the engine only through the injected collaborator
//! traits. User-correctable failures become `{"success": false, "error"}`
//! bodies; only codec failures abort the response.

use axum::body::{Body, Bytes};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Notify;

use crate::codec;
use crate::engine::{AccountStore, ChainView, MinerControl, MinerState, NodeIdentity};
use crate::gateway::builder;
use crate::gateway::error::GatewayError;
use crate::gateway::gate::SyncGate;
use crate::gateway::queries;
use crate::gateway::websocket::NotificationHub;
use crate::wallet::{vault, Wallet, WalletUnlocker};

/// Shared gateway state: injected collaborators plus the notification hub
#[derive(Clone)]
pub struct GatewayState {
    pub chain: Arc<dyn ChainView>,
    pub accounts: Arc<dyn AccountStore>,
    pub miner: Arc<dyn MinerControl>,
    pub identity: Arc<dyn NodeIdentity>,
    pub hub: Arc<NotificationHub>,
    pub shutdown: Arc<Notify>,
}

impl GatewayState {
    fn unlocker(&self) -> WalletUnlocker<'_> {
        WalletUnlocker::new(self.accounts.as_ref())
    }

    fn gate(&self) -> SyncGate<'_> {
        SyncGate::new(self.chain.as_ref())
    }

    /// Explicit address, or the default wallet's address
    fn resolve_address(&self, address: Option<String>) -> Result<String, GatewayError> {
        match address {
            Some(address) => Ok(address),
            None => Ok(self.unlocker().unlock(None, None)?.address()),
        }
    }
}

/// Structured failure body for user-correctable errors
fn failure(err: &GatewayError) -> Response {
    codec::json_response(&json!({ "success": false, "error": err.to_string() }))
}

// ============================================================================
// Request parameters
// ============================================================================

#[derive(Deserialize)]
pub struct WalletParams {
    pub wallet_name: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct DefaultWalletParams {
    pub wallet_name: Option<String>,
    pub password: Option<String>,
    pub delete: Option<String>,
}

#[derive(Deserialize)]
pub struct SendParams {
    // Signed so a negative amount reaches the handler and gets the
    // structured InvalidAmount body instead of a bare extractor 400
    #[serde(default)]
    pub amount: i64,
    pub address: Option<String>,
    #[serde(default)]
    pub message: String,
    pub wallet_name: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct AddressParams {
    pub address: Option<String>,
}

#[derive(Deserialize)]
pub struct RangeParams {
    pub start: Option<u64>,
    pub end: Option<u64>,
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Serialize)]
pub struct WalletInfoResponse {
    pub name: String,
    pub pubkey: String,
    pub privkey: String,
    pub address: String,
    pub balance: u64,
}

#[derive(Serialize)]
pub struct WalletListResponse {
    pub wallets: Vec<String>,
    pub default_wallet: String,
}

#[derive(Serialize)]
pub struct BlockCountResponse {
    pub length: u64,
    pub known_length: u64,
}

#[derive(Serialize)]
pub struct DifficultyResponse {
    pub difficulty: f64,
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub balance: u64,
}

#[derive(Serialize)]
pub struct MinerStatusResponse {
    pub running: bool,
}

// ============================================================================
// Wallet management
// ============================================================================

/// POST /upload_wallet - store a sealed wallet blob under a name
pub async fn upload_wallet(
    State(state): State<GatewayState>,
    Query(params): Query<WalletParams>,
    body: Bytes,
) -> Response {
    let name = match params.wallet_name {
        Some(name) => name,
        None => return failure(&GatewayError::NoWalletSpecified),
    };
    let success = state.accounts.store_wallet(&name, body.to_vec());
    codec::json_response(&json!({ "success": success, "wallet_name": name }))
}

/// GET /download_wallet - fetch the sealed blob as an attachment
pub async fn download_wallet(
    State(state): State<GatewayState>,
    Query(params): Query<WalletParams>,
) -> Response {
    let name = match params.wallet_name {
        Some(name) => name,
        None => return failure(&GatewayError::NoWalletSpecified),
    };
    let blob = match state.accounts.encrypted_wallet(&name) {
        Some(blob) => blob,
        None => return failure(&GatewayError::WalletNotFound),
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", name),
        )
        .body(Body::from(blob))
        .unwrap_or_else(|_| failure(&GatewayError::WalletNotFound))
}

/// GET /info_wallet - unlock a wallet and report keys, address, and balance
pub async fn info_wallet(
    State(state): State<GatewayState>,
    Query(params): Query<WalletParams>,
) -> Response {
    let wallet = match state
        .unlocker()
        .unlock(params.wallet_name.as_deref(), params.password.as_deref())
    {
        Ok(wallet) => wallet,
        Err(e) => return failure(&e),
    };

    let balance = queries::balance(
        state.chain.as_ref(),
        state.accounts.as_ref(),
        &wallet.address(),
    );
    codec::json_response(&WalletInfoResponse {
        name: wallet.name.clone(),
        pubkey: wallet.public_key(),
        privkey: wallet.private_key(),
        address: wallet.address(),
        balance,
    })
}

/// GET /remove_wallet - delete a stored wallet after verifying its password
pub async fn remove_wallet(
    State(state): State<GatewayState>,
    Query(params): Query<WalletParams>,
) -> Response {
    let name = match params.wallet_name.as_deref() {
        Some(name) => name,
        None => return failure(&GatewayError::NoWalletSpecified),
    };
    if state
        .accounts
        .default_wallet()
        .is_some_and(|default| default.name == name)
    {
        return failure(&GatewayError::CannotRemoveDefaultWallet);
    }

    // The password must actually open the wallet before we drop it
    if let Err(e) = state
        .unlocker()
        .unlock(Some(name), params.password.as_deref())
    {
        return failure(&e);
    }

    let success = state.accounts.remove_wallet(name);
    codec::json_response(&json!({
        "success": success,
        "message": "Successfully removed wallet",
    }))
}

/// GET /new_wallet - generate a key pair server-side and store it sealed
pub async fn new_wallet(
    State(state): State<GatewayState>,
    Query(params): Query<WalletParams>,
) -> Response {
    let name = match params.wallet_name {
        Some(name) => name,
        None => return failure(&GatewayError::NoWalletSpecified),
    };
    let password = match params.password {
        Some(password) => password,
        None => {
            return codec::json_response(&json!({
                "success": false,
                "error": "Password missing!",
            }))
        }
    };

    let wallet = Wallet::generate(&name);
    let blob = match vault::seal(&password, &wallet) {
        Ok(blob) => blob,
        Err(e) => return failure(&GatewayError::Engine(e.to_string())),
    };
    let success = state.accounts.store_wallet(&name, blob);
    codec::json_response(&json!({ "name": name, "success": success }))
}

/// GET /wallets - list stored wallet names and the default designation
pub async fn wallets(State(state): State<GatewayState>) -> Response {
    let default_wallet = state
        .accounts
        .default_wallet()
        .map(|d| d.name)
        .unwrap_or_default();
    codec::json_response(&WalletListResponse {
        wallets: state.accounts.wallet_names(),
        default_wallet,
    })
}

/// GET /set_default_wallet - designate (or clear, with `delete`) the default
pub async fn set_default_wallet(
    State(state): State<GatewayState>,
    Query(params): Query<DefaultWalletParams>,
) -> Response {
    if params.delete.is_some() {
        let success = state.accounts.clear_default_wallet();
        return codec::json_response(&json!({ "success": success }));
    }

    let name = match params.wallet_name.as_deref() {
        Some(name) => name,
        None => return failure(&GatewayError::NoWalletSpecified),
    };
    let password = params.password.unwrap_or_default();

    // The designation is only recorded if the password opens the wallet
    if let Err(e) = state.unlocker().unlock(Some(name), Some(&password)) {
        return failure(&e);
    }
    let success = state.accounts.set_default_wallet(name, &password);
    codec::json_response(&json!({ "success": success }))
}

// ============================================================================
// Chain queries
// ============================================================================

/// GET /balance - effective balance with the pending pool applied; gated
pub async fn balance(
    State(state): State<GatewayState>,
    Query(params): Query<AddressParams>,
) -> Response {
    let address = match state.resolve_address(params.address) {
        Ok(address) => address,
        Err(e) => return failure(&e),
    };
    let gated = state.gate().guard(|| BalanceResponse {
        balance: queries::balance(state.chain.as_ref(), state.accounts.as_ref(), &address),
    });
    codec::json_response(&gated)
}

/// GET /history - per-address send/recv/mine history; gated
pub async fn history(
    State(state): State<GatewayState>,
    Query(params): Query<AddressParams>,
) -> Response {
    let address = match state.resolve_address(params.address) {
        Ok(address) => address,
        Err(e) => return failure(&e),
    };
    let gated = state
        .gate()
        .guard(|| queries::history(state.chain.as_ref(), state.accounts.as_ref(), &address));
    codec::json_response(&gated)
}

/// GET /block - paginated block range with miner attribution; never gated
pub async fn block(
    State(state): State<GatewayState>,
    Query(params): Query<RangeParams>,
) -> Response {
    let range = queries::block_range(state.chain.as_ref(), params.start, params.end);
    codec::json_response(&range)
}

/// GET /blockcount - local and best-known chain length
pub async fn blockcount(State(state): State<GatewayState>) -> Response {
    codec::json_response(&BlockCountResponse {
        length: state.chain.current_length(),
        known_length: state.chain.known_length(),
    })
}

/// GET /txs - pending pool with resolved sender addresses
pub async fn txs(State(state): State<GatewayState>) -> Response {
    codec::json_response(&queries::pending_pool(state.chain.as_ref()))
}

/// GET /difficulty - difficulty at the current tip; gated
pub async fn difficulty(State(state): State<GatewayState>) -> Response {
    let gated = state.gate().guard(|| DifficultyResponse {
        difficulty: state
            .chain
            .difficulty_at(state.chain.current_length()),
    });
    codec::json_response(&gated)
}

// ============================================================================
// Transactions
// ============================================================================

/// GET /send - build, sign, and submit a spend transaction; never gated
pub async fn send(State(state): State<GatewayState>, Query(params): Query<SendParams>) -> Response {
    // Precondition order is fixed: amount, recipient, then wallet resolution
    if params.amount <= 0 {
        return failure(&GatewayError::InvalidAmount);
    }
    let recipient = match params.address {
        Some(address) => address,
        None => return failure(&GatewayError::MissingRecipient),
    };
    let wallet = match state
        .unlocker()
        .unlock(params.wallet_name.as_deref(), params.password.as_deref())
    {
        Ok(wallet) => wallet,
        Err(e) => return failure(&e),
    };

    match builder::build_and_submit(
        state.chain.as_ref(),
        state.accounts.as_ref(),
        &wallet,
        &recipient,
        params.amount as u64,
        &params.message,
    ) {
        Ok(tx) => codec::json_response(&json!({
            "success": true,
            "message": format!("Tx amount:{} to:{} added to the pool", tx.amount, tx.to),
        })),
        Err(e) => failure(&e),
    }
}

// ============================================================================
// Node introspection and control
// ============================================================================

/// GET /node_id - local node identity
pub async fn node_id(State(state): State<GatewayState>) -> Response {
    codec::json_response(&state.identity.node_id())
}

/// GET /peers - known peer table
pub async fn peers(State(state): State<GatewayState>) -> Response {
    codec::json_response(&state.identity.peers())
}

/// GET /stop - signal shutdown; in-flight requests are not drained
pub async fn stop(State(state): State<GatewayState>) -> Response {
    log::info!("Shutdown requested");
    state.miner.stop();
    state.shutdown.notify_waiters();
    codec::json_response(&"Shutting down")
}

// ============================================================================
// Miner control
// ============================================================================

/// GET /start_miner - hand an unlocked wallet to the miner and start it
pub async fn start_miner(
    State(state): State<GatewayState>,
    Query(params): Query<WalletParams>,
) -> Response {
    let wallet = match state
        .unlocker()
        .unlock(params.wallet_name.as_deref(), params.password.as_deref())
    {
        Ok(wallet) => wallet,
        Err(e) => return failure(&e),
    };

    if state.miner.state() == MinerState::Running {
        return failure(&GatewayError::AlreadyRunning);
    }
    state.miner.set_wallet(wallet);
    state.miner.start();
    codec::json_response(&"Running miner")
}

/// GET /stop_miner - stop a running miner
pub async fn stop_miner(State(state): State<GatewayState>) -> Response {
    if state.miner.state() != MinerState::Running {
        return failure(&GatewayError::NotRunning);
    }
    state.miner.stop();
    codec::json_response(&"Closed miner")
}

/// GET /status_miner - whether the miner is running
pub async fn status_miner(State(state): State<GatewayState>) -> Response {
    codec::json_response(&MinerStatusResponse {
        running: state.miner.state() == MinerState::Running,
    })
}
