use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::state::AppState;
use crate::ws;

// ── Health ──────────────────────────────────────────────────────────────

pub async fn health() -> &'static str {
    "ok"
}

// ── Leaderboard ─────────────────────────────────────────────────────────

/// REST view of the same top-200 standings the hub broadcasts; used by the
/// static leaderboard page.
pub async fn leaderboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<(String, i32)>>, StatusCode> {
    let rows = crate::db::top_n(&state.db, ws::LEADERBOARD_SIZE)
        .await
        .map_err(|err| {
            tracing::error!(%err, "failed to read leaderboard");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(rows))
}

// ── WebSocket upgrade ───────────────────────────────────────────────────

pub async fn ws_upgrade(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, StatusCode> {
    // Reserve the slot here so a burst of simultaneous upgrades cannot
    // overshoot the cap; the socket handler releases it on disconnect.
    let reserved = state.connection_count.fetch_add(1, Ordering::Relaxed);
    if reserved >= state.max_connections {
        state.connection_count.fetch_sub(1, Ordering::Relaxed);
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    // No authentication: a session is just its transport connection.
    let conn_id = state.next_conn_id.fetch_add(1, Ordering::Relaxed);

    Ok(ws.on_upgrade(move |socket| ws::handle_socket(state, socket, conn_id)))
}
