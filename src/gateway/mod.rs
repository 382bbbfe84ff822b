//! Public HTTP/WebSocket gateway
//!
//! The request-facing surface of the node: wallet management, chain queries,
//! transaction submission, miner control, and push notifications. All engine
//! access goes through the collaborator traits in [`crate::engine`].

pub mod builder;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod queries;
pub mod routes;
pub mod websocket;

pub use error::GatewayError;
pub use gate::{Gated, SyncGate};
pub use handlers::GatewayState;
pub use routes::create_router;
pub use websocket::{EventBus, GatewayEvent, NotificationHub};
