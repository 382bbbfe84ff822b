//! HTTP route configuration

use crate::gateway::handlers::{self, GatewayState};
use crate::gateway::websocket::ws_handler;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Create the gateway router with all routes
pub fn create_router(state: GatewayState) -> Router {
    // Configure CORS for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Every operation answers on GET and POST alike, parameters in the
    // query string either way
    Router::new()
        // WebSocket for push notifications
        .route("/ws", get(ws_handler))
        // Wallet management
        .route("/upload_wallet", post(handlers::upload_wallet))
        .route(
            "/download_wallet",
            get(handlers::download_wallet).post(handlers::download_wallet),
        )
        .route(
            "/info_wallet",
            get(handlers::info_wallet).post(handlers::info_wallet),
        )
        .route(
            "/new_wallet",
            get(handlers::new_wallet).post(handlers::new_wallet),
        )
        .route(
            "/remove_wallet",
            get(handlers::remove_wallet).post(handlers::remove_wallet),
        )
        .route("/wallets", get(handlers::wallets).post(handlers::wallets))
        .route(
            "/set_default_wallet",
            get(handlers::set_default_wallet).post(handlers::set_default_wallet),
        )
        // Chain queries
        .route("/balance", get(handlers::balance).post(handlers::balance))
        .route("/history", get(handlers::history).post(handlers::history))
        .route("/block", get(handlers::block).post(handlers::block))
        .route(
            "/blockcount",
            get(handlers::blockcount).post(handlers::blockcount),
        )
        .route("/txs", get(handlers::txs).post(handlers::txs))
        .route(
            "/difficulty",
            get(handlers::difficulty).post(handlers::difficulty),
        )
        // Transactions
        .route("/send", get(handlers::send).post(handlers::send))
        // Node introspection and control
        .route("/node_id", get(handlers::node_id).post(handlers::node_id))
        .route("/peers", get(handlers::peers).post(handlers::peers))
        .route("/stop", get(handlers::stop).post(handlers::stop))
        // Miner control
        .route(
            "/start_miner",
            get(handlers::start_miner).post(handlers::start_miner),
        )
        .route(
            "/stop_miner",
            get(handlers::stop_miner).post(handlers::stop_miner),
        )
        .route(
            "/status_miner",
            get(handlers::status_miner).post(handlers::status_miner),
        )
        // Add state and middleware
        .with_state(state)
        .layer(cors)
}
