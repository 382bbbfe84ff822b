//! End-to-end handler tests against an in-memory engine

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::response::Response;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::Notify;

use aurum_gateway::engine::{
    AccountStore, ChainView, MemoryEngine, MinerControl, MinerState, NodeIdentity,
};
use aurum_gateway::gateway::handlers::{
    self, AddressParams, DefaultWalletParams, GatewayState, RangeParams, SendParams, WalletParams,
};
use aurum_gateway::gateway::NotificationHub;
use aurum_gateway::wallet::{vault, Wallet};
use aurum_gateway::{Block, Transaction, TxType};

fn state_with(engine: Arc<MemoryEngine>) -> GatewayState {
    GatewayState {
        chain: engine.clone(),
        accounts: engine.clone(),
        miner: engine.clone(),
        identity: engine,
        hub: Arc::new(NotificationHub::new()),
        shutdown: Arc::new(Notify::new()),
    }
}

async fn body_json(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn wallet_params(name: &str, password: &str) -> Query<WalletParams> {
    Query(WalletParams {
        wallet_name: Some(name.to_string()),
        password: Some(password.to_string()),
    })
}

fn no_wallet_params() -> Query<WalletParams> {
    Query(WalletParams {
        wallet_name: None,
        password: None,
    })
}

fn mint_block(index: u64, miner: &Wallet) -> Block {
    Block {
        index,
        timestamp: Utc::now(),
        previous_hash: String::new(),
        txs: vec![Transaction {
            tx_type: TxType::Mint,
            amount: 50,
            to: miner.address(),
            message: String::new(),
            count: 0,
            pubkeys: vec![miner.public_key()],
            signatures: vec![],
        }],
    }
}

fn store_sealed(engine: &MemoryEngine, name: &str, password: &str) -> Wallet {
    let wallet = Wallet::generate(name);
    let blob = vault::seal(password, &wallet).unwrap();
    assert!(engine.store_wallet(name, blob));
    wallet
}

#[tokio::test]
async fn send_checks_amount_before_anything_else() {
    let engine = Arc::new(MemoryEngine::new());
    let state = state_with(engine.clone());

    let resp = handlers::send(
        State(state),
        Query(SendParams {
            amount: 0,
            address: None,
            message: String::new(),
            wallet_name: None,
            password: None,
        }),
    )
    .await;

    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Amount cannot be lower than or equal to 0");
    assert!(engine.pending_pool().is_empty());
}

#[tokio::test]
async fn send_rejects_a_negative_amount_with_a_structured_body() {
    let engine = Arc::new(MemoryEngine::new());
    let state = state_with(engine.clone());

    let resp = handlers::send(
        State(state),
        Query(SendParams {
            amount: -1,
            address: Some("recipient-address".to_string()),
            message: String::new(),
            wallet_name: None,
            password: None,
        }),
    )
    .await;

    assert_eq!(resp.status(), axum::http::StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Amount cannot be lower than or equal to 0");
    assert!(engine.pending_pool().is_empty());
}

#[tokio::test]
async fn send_requires_a_recipient_before_wallet_resolution() {
    let engine = Arc::new(MemoryEngine::new());
    let state = state_with(engine.clone());

    // No wallet exists either, but the recipient error must win
    let resp = handlers::send(
        State(state),
        Query(SendParams {
            amount: 10,
            address: None,
            message: String::new(),
            wallet_name: None,
            password: None,
        }),
    )
    .await;

    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "You need to specify a receiving address for the transaction"
    );
}

#[tokio::test]
async fn send_submits_a_signed_tx_to_the_pool() {
    let engine = Arc::new(MemoryEngine::new());
    store_sealed(&engine, "alice", "pw");
    let state = state_with(engine.clone());

    let resp = handlers::send(
        State(state),
        Query(SendParams {
            amount: 25,
            address: Some("recipient-address".to_string()),
            message: "hi".to_string(),
            wallet_name: Some("alice".to_string()),
            password: Some("pw".to_string()),
        }),
    )
    .await;

    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(
        body["message"],
        "Tx amount:25 to:recipient-address added to the pool"
    );

    let pool = engine.pending_pool();
    assert_eq!(pool.len(), 1);
    assert!(pool[0].verify_signatures());
    assert_eq!(pool[0].to, "recipient-address");
}

#[tokio::test]
async fn send_with_wrong_password_leaves_the_pool_empty() {
    let engine = Arc::new(MemoryEngine::new());
    store_sealed(&engine, "alice", "pw");
    let state = state_with(engine.clone());

    let resp = handlers::send(
        State(state),
        Query(SendParams {
            amount: 25,
            address: Some("recipient-address".to_string()),
            message: String::new(),
            wallet_name: Some("alice".to_string()),
            password: Some("wrong".to_string()),
        }),
    )
    .await;

    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Wallet could not be unlocked");
    assert!(engine.pending_pool().is_empty());
}

#[tokio::test]
async fn syncing_gates_balance_history_and_difficulty() {
    let engine = Arc::new(MemoryEngine::new());
    let miner = Wallet::generate("miner");
    engine.add_block(mint_block(0, &miner));
    engine.set_syncing(true);
    engine.set_known_length(50);
    let state = state_with(engine);

    let addr = Query(AddressParams {
        address: Some(miner.address()),
    });

    let balance = body_json(
        handlers::balance(
            State(state.clone()),
            Query(AddressParams {
                address: Some(miner.address()),
            }),
        )
        .await,
    )
    .await;
    assert_eq!(balance["syncing"], true);
    assert_eq!(balance["length"], 0);
    assert_eq!(balance["known_length"], 50);

    let history = body_json(handlers::history(State(state.clone()), addr).await).await;
    assert_eq!(history["syncing"], true);

    let difficulty = body_json(handlers::difficulty(State(state)).await).await;
    assert_eq!(difficulty["syncing"], true);
}

#[tokio::test]
async fn syncing_never_blocks_blocks_send_or_blockcount() {
    let engine = Arc::new(MemoryEngine::new());
    let miner = Wallet::generate("miner");
    engine.add_block(mint_block(0, &miner));
    engine.set_syncing(true);
    store_sealed(&engine, "alice", "pw");
    let state = state_with(engine.clone());

    let range = body_json(
        handlers::block(
            State(state.clone()),
            Query(RangeParams {
                start: Some(0),
                end: Some(0),
            }),
        )
        .await,
    )
    .await;
    assert_eq!(range["blocks"].as_array().unwrap().len(), 1);

    let count = body_json(handlers::blockcount(State(state.clone())).await).await;
    assert_eq!(count["length"], 0);

    let resp = handlers::send(
        State(state),
        Query(SendParams {
            amount: 5,
            address: Some("addr".to_string()),
            message: String::new(),
            wallet_name: Some("alice".to_string()),
            password: Some("pw".to_string()),
        }),
    )
    .await;
    assert_eq!(body_json(resp).await["success"], true);
    assert_eq!(engine.pending_pool().len(), 1);
}

#[tokio::test]
async fn balance_reflects_pending_spends() {
    let engine = Arc::new(MemoryEngine::new());
    store_sealed(&engine, "miner", "pw");
    let blob = engine.encrypted_wallet("miner").unwrap();
    let miner = vault::open("pw", &blob).unwrap();
    engine.add_block(mint_block(0, &miner));
    engine.add_block(mint_block(1, &miner));
    let state = state_with(engine);

    let before = body_json(
        handlers::balance(
            State(state.clone()),
            Query(AddressParams {
                address: Some(miner.address()),
            }),
        )
        .await,
    )
    .await;
    assert_eq!(before["balance"], 100);

    handlers::send(
        State(state.clone()),
        Query(SendParams {
            amount: 30,
            address: Some("somewhere".to_string()),
            message: String::new(),
            wallet_name: Some("miner".to_string()),
            password: Some("pw".to_string()),
        }),
    )
    .await;

    let after = body_json(
        handlers::balance(
            State(state),
            Query(AddressParams {
                address: Some(miner.address()),
            }),
        )
        .await,
    )
    .await;
    assert_eq!(after["balance"], 70);
}

#[tokio::test]
async fn new_wallet_stores_an_openable_sealed_blob() {
    let engine = Arc::new(MemoryEngine::new());
    let state = state_with(engine.clone());

    let body = body_json(
        handlers::new_wallet(State(state.clone()), wallet_params("alice", "pw")).await,
    )
    .await;
    assert_eq!(body["success"], true);
    assert_eq!(body["name"], "alice");

    let blob = engine.encrypted_wallet("alice").unwrap();
    let wallet = vault::open("pw", &blob).unwrap();
    assert_eq!(wallet.name, "alice");
    assert!(vault::open("wrong", &blob).is_err());

    // Same name again is refused
    let again = body_json(
        handlers::new_wallet(State(state), wallet_params("alice", "pw2")).await,
    )
    .await;
    assert_eq!(again["success"], false);
}

#[tokio::test]
async fn new_wallet_requires_name_and_password() {
    let state = state_with(Arc::new(MemoryEngine::new()));

    let body = body_json(handlers::new_wallet(State(state.clone()), no_wallet_params()).await).await;
    assert_eq!(body["success"], false);

    let body = body_json(
        handlers::new_wallet(
            State(state),
            Query(WalletParams {
                wallet_name: Some("alice".to_string()),
                password: None,
            }),
        )
        .await,
    )
    .await;
    assert_eq!(body["error"], "Password missing!");
}

#[tokio::test]
async fn info_wallet_reports_keys_address_and_balance() {
    let engine = Arc::new(MemoryEngine::new());
    let wallet = store_sealed(&engine, "alice", "pw");
    engine.add_block(mint_block(0, &wallet));
    let state = state_with(engine);

    let body =
        body_json(handlers::info_wallet(State(state), wallet_params("alice", "pw")).await).await;
    assert_eq!(body["name"], "alice");
    assert_eq!(body["address"], wallet.address());
    assert_eq!(body["pubkey"], wallet.public_key());
    assert_eq!(body["privkey"], wallet.private_key());
    assert_eq!(body["balance"], 50);
}

#[tokio::test]
async fn download_wallet_returns_the_stored_blob_as_attachment() {
    let engine = Arc::new(MemoryEngine::new());
    store_sealed(&engine, "alice", "pw");
    let blob = engine.encrypted_wallet("alice").unwrap();
    let state = state_with(engine);

    let resp = handlers::download_wallet(State(state), wallet_params("alice", "pw")).await;
    let disposition = resp
        .headers()
        .get(axum::http::header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(disposition, "attachment; filename=\"alice\"");

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(bytes.as_ref(), blob.as_slice());
}

#[tokio::test]
async fn upload_then_unlock_roundtrip() {
    let engine = Arc::new(MemoryEngine::new());
    let wallet = Wallet::generate("imported");
    let blob = vault::seal("pw", &wallet).unwrap();
    let state = state_with(engine);

    let body = body_json(
        handlers::upload_wallet(
            State(state.clone()),
            wallet_params("imported", ""),
            Bytes::from(blob),
        )
        .await,
    )
    .await;
    assert_eq!(body["success"], true);
    assert_eq!(body["wallet_name"], "imported");

    let info = body_json(
        handlers::info_wallet(State(state), wallet_params("imported", "pw")).await,
    )
    .await;
    assert_eq!(info["address"], wallet.address());
}

#[tokio::test]
async fn removing_the_default_wallet_is_refused() {
    let engine = Arc::new(MemoryEngine::new());
    store_sealed(&engine, "alice", "pw");
    assert!(engine.set_default_wallet("alice", "pw"));
    let state = state_with(engine.clone());

    let body = body_json(
        handlers::remove_wallet(State(state.clone()), wallet_params("alice", "pw")).await,
    )
    .await;
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "Cannot remove default wallet. First remove its default state!"
    );
    // The store is unchanged
    assert!(engine.encrypted_wallet("alice").is_some());

    // Clearing the default designation makes removal possible
    let cleared = body_json(
        handlers::set_default_wallet(
            State(state.clone()),
            Query(DefaultWalletParams {
                wallet_name: None,
                password: None,
                delete: Some("1".to_string()),
            }),
        )
        .await,
    )
    .await;
    assert_eq!(cleared["success"], true);

    let removed =
        body_json(handlers::remove_wallet(State(state), wallet_params("alice", "pw")).await).await;
    assert_eq!(removed["success"], true);
    assert!(engine.encrypted_wallet("alice").is_none());
}

#[tokio::test]
async fn remove_wallet_verifies_the_password() {
    let engine = Arc::new(MemoryEngine::new());
    store_sealed(&engine, "alice", "pw");
    let state = state_with(engine.clone());

    let body = body_json(
        handlers::remove_wallet(State(state), wallet_params("alice", "wrong")).await,
    )
    .await;
    assert_eq!(body["success"], false);
    assert!(engine.encrypted_wallet("alice").is_some());
}

#[tokio::test]
async fn set_default_wallet_verifies_the_password() {
    let engine = Arc::new(MemoryEngine::new());
    store_sealed(&engine, "alice", "pw");
    let state = state_with(engine.clone());

    let rejected = body_json(
        handlers::set_default_wallet(
            State(state.clone()),
            Query(DefaultWalletParams {
                wallet_name: Some("alice".to_string()),
                password: Some("wrong".to_string()),
                delete: None,
            }),
        )
        .await,
    )
    .await;
    assert_eq!(rejected["success"], false);
    assert!(engine.default_wallet().is_none());

    let accepted = body_json(
        handlers::set_default_wallet(
            State(state),
            Query(DefaultWalletParams {
                wallet_name: Some("alice".to_string()),
                password: Some("pw".to_string()),
                delete: None,
            }),
        )
        .await,
    )
    .await;
    assert_eq!(accepted["success"], true);
    assert_eq!(engine.default_wallet().unwrap().name, "alice");
}

#[tokio::test]
async fn default_wallet_backs_send_and_balance() {
    let engine = Arc::new(MemoryEngine::new());
    let wallet = store_sealed(&engine, "alice", "pw");
    engine.set_default_wallet("alice", "pw");
    engine.add_block(mint_block(0, &wallet));
    let state = state_with(engine.clone());

    // No explicit address: falls back to the default wallet's address
    let balance = body_json(
        handlers::balance(State(state.clone()), Query(AddressParams { address: None })).await,
    )
    .await;
    assert_eq!(balance["balance"], 50);

    // No wallet name or password: the stored default unlocks the send
    let resp = handlers::send(
        State(state),
        Query(SendParams {
            amount: 10,
            address: Some("addr".to_string()),
            message: String::new(),
            wallet_name: None,
            password: None,
        }),
    )
    .await;
    assert_eq!(body_json(resp).await["success"], true);
    assert_eq!(engine.pending_pool().len(), 1);
}

#[tokio::test]
async fn wallets_lists_names_and_default() {
    let engine = Arc::new(MemoryEngine::new());
    store_sealed(&engine, "bob", "pw");
    store_sealed(&engine, "alice", "pw");
    engine.set_default_wallet("bob", "pw");
    let state = state_with(engine);

    let body = body_json(handlers::wallets(State(state)).await).await;
    assert_eq!(body["wallets"], serde_json::json!(["alice", "bob"]));
    assert_eq!(body["default_wallet"], "bob");
}

#[tokio::test]
async fn miner_start_needs_a_wallet_and_refuses_double_start() {
    let engine = Arc::new(MemoryEngine::new());
    let state = state_with(engine.clone());

    // No wallet resolvable at all
    let body = body_json(handlers::start_miner(State(state.clone()), no_wallet_params()).await).await;
    assert_eq!(body["success"], false);
    assert_eq!(engine.state(), MinerState::Stopped);

    store_sealed(&engine, "alice", "pw");
    let body = body_json(
        handlers::start_miner(State(state.clone()), wallet_params("alice", "pw")).await,
    )
    .await;
    assert_eq!(body, serde_json::json!("Running miner"));
    assert_eq!(engine.state(), MinerState::Running);
    assert_eq!(engine.miner_wallet().unwrap().name, "alice");

    let again = body_json(
        handlers::start_miner(State(state.clone()), wallet_params("alice", "pw")).await,
    )
    .await;
    assert_eq!(again["error"], "Miner is already running");

    let status = body_json(handlers::status_miner(State(state.clone())).await).await;
    assert_eq!(status["running"], true);

    let stopped = body_json(handlers::stop_miner(State(state.clone())).await).await;
    assert_eq!(stopped, serde_json::json!("Closed miner"));

    let again = body_json(handlers::stop_miner(State(state)).await).await;
    assert_eq!(again["error"], "Miner is not running");
}

#[tokio::test]
async fn stop_wakes_the_shutdown_listener() {
    let engine = Arc::new(MemoryEngine::new());
    let state = state_with(engine);
    let shutdown = state.shutdown.clone();

    let waiter = tokio::spawn(async move { shutdown.notified().await });
    tokio::task::yield_now().await;

    let body = body_json(handlers::stop(State(state)).await).await;
    assert_eq!(body, serde_json::json!("Shutting down"));
    waiter.await.unwrap();
}

#[tokio::test]
async fn node_id_and_peers_are_exposed() {
    let engine = Arc::new(MemoryEngine::new());
    engine.add_peer(aurum_gateway::engine::Peer {
        host: "10.0.0.1".to_string(),
        port: 7001,
    });
    let state = state_with(engine.clone());

    let id = body_json(handlers::node_id(State(state.clone())).await).await;
    assert_eq!(id, serde_json::json!(engine.node_id()));

    let peers = body_json(handlers::peers(State(state)).await).await;
    assert_eq!(peers[0]["host"], "10.0.0.1");
    assert_eq!(peers[0]["port"], 7001);
}
