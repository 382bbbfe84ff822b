//! Push-notification hub
//!
//! A process-wide broadcast channel carrying bare event kinds to every
//! connected WebSocket client. Delivery is best-effort: a disconnected client
//! simply misses events, there is no replay. Engine-side components publish
//! through the `EventBus` trait rather than calling into request handling.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::gateway::handlers::GatewayState;

/// Events buffered per subscriber before the slowest client starts lagging
const BROADCAST_CAPACITY: usize = 100;

/// Event kinds pushed to clients; no payload beyond the kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayEvent {
    NewBlock,
    NewPoolTx,
    PeerUpdate,
}

/// Publishing side of the notification fan-out
pub trait EventBus: Send + Sync {
    fn publish(&self, event: GatewayEvent);
}

/// Broadcast hub shared by all connected clients
#[derive(Debug)]
pub struct NotificationHub {
    sender: broadcast::Sender<GatewayEvent>,
}

impl NotificationHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { sender }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.sender.subscribe()
    }

    /// Number of currently connected subscribers
    pub fn client_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventBus for NotificationHub {
    fn publish(&self, event: GatewayEvent) {
        // No subscribers is not an error
        let _ = self.sender.send(event);
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct EventFrame {
    event: GatewayEvent,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<GatewayState>,
) -> impl IntoResponse {
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| push_events(socket, hub))
}

/// Forward hub events to one client until either side closes
async fn push_events(socket: WebSocket, hub: Arc<NotificationHub>) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = hub.subscribe();
    log::debug!("WebSocket client connected");

    let mut send_task = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            let frame = match serde_json::to_string(&EventFrame { event }) {
                Ok(frame) => frame,
                Err(e) => {
                    log::error!("Failed to encode event frame: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) | Err(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    log::debug!("WebSocket client disconnected");
}
