use std::sync::atomic::{AtomicU32, AtomicU64};
use std::time::Instant;

use dashmap::DashMap;
use sqlx::SqlitePool;
use tokio::sync::{mpsc, Mutex};

use duel_core::protocol::ServerMessage;
use duel_core::SimilarityIndex;

/// Handle to push messages to a connected WebSocket client.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    pub conn_id: u64,
    pub tx: mpsc::UnboundedSender<ServerMessage>,
    /// The pair most recently offered to this session. Votes that don't
    /// match it are treated as stale and ignored. `None` until the first
    /// pair is served.
    pub offered_pair: Option<(String, String)>,
    /// Messages received in the current second window.
    pub message_count: u32,
    pub rate_limit_window: Instant,
}

/// Shared application state.
pub struct AppState {
    pub db: SqlitePool,
    /// The phrase universe, fixed at startup.
    pub phrases: Vec<String>,
    /// Offline-computed similarity scores; may be unavailable.
    pub similarity: SimilarityIndex,
    pub connections: DashMap<u64, ConnectionHandle>,
    pub next_conn_id: AtomicU64,
    pub connection_count: AtomicU32,
    pub max_connections: u32,
    /// Serializes the read-update-write sequence of vote processing so two
    /// concurrent votes cannot interleave and lose an update, and so each
    /// leaderboard broadcast reflects a consistent store state.
    pub vote_lock: Mutex<()>,
}

/// Send a message to every connected session. A dead channel just means
/// that session is mid-disconnect and its copy is discarded.
pub fn broadcast(state: &AppState, msg: ServerMessage) {
    for conn in state.connections.iter() {
        let _ = conn.tx.send(msg.clone());
    }
}
