use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::ws::{Message, WebSocket};
use tokio::sync::mpsc;

use duel_core::elo::update_elo;
use duel_core::pairing;
use duel_core::protocol::{ClientMessage, ServerMessage};

use crate::db;
use crate::state::*;

/// Leaderboard entries carried in every broadcast.
pub const LEADERBOARD_SIZE: i64 = 200;

/// Top-level WebSocket handler -- spawned per connection. The connection
/// slot was already reserved at upgrade time; this task releases it on exit.
pub async fn handle_socket(state: Arc<AppState>, mut socket: WebSocket, conn_id: u64) {
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Register connection handle.
    state.connections.insert(
        conn_id,
        ConnectionHandle {
            conn_id,
            tx: tx.clone(),
            offered_pair: None,
            message_count: 0,
            rate_limit_window: Instant::now(),
        },
    );

    tracing::debug!(conn_id, "session connected");

    loop {
        tokio::select! {
            // Outbound: forward queued ServerMessage to the WebSocket.
            Some(msg) = rx.recv() => {
                if let Ok(json) = serde_json::to_string(&msg) {
                    if socket.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
            }
            // Inbound: read from the WebSocket.
            maybe_msg = socket.recv() => {
                match maybe_msg {
                    Some(Ok(Message::Text(text))) => {
                        // Rate limiting: max 20 messages per second.
                        {
                            let mut conn = match state.connections.get_mut(&conn_id) {
                                Some(c) => c,
                                None => break,
                            };
                            let now = Instant::now();
                            if now.duration_since(conn.rate_limit_window) > Duration::from_secs(1) {
                                conn.rate_limit_window = now;
                                conn.message_count = 0;
                            }
                            conn.message_count += 1;
                            if conn.message_count > 20 {
                                let _ = conn.tx.send(ServerMessage::Error {
                                    message: "Rate limited".into(),
                                });
                                continue;
                            }
                        }

                        let client_msg: ClientMessage = match serde_json::from_str(&text) {
                            Ok(m) => m,
                            Err(e) => {
                                let _ = tx.send(ServerMessage::Error {
                                    message: format!("Invalid message: {}", e),
                                });
                                continue;
                            }
                        };

                        handle_message(&state, conn_id, &tx, client_msg).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    _ => continue,
                }
            }
        }
    }

    // Disconnected: drop the handle; any in-flight reply is discarded but
    // committed rating writes stay and show up in the next broadcast.
    state.connections.remove(&conn_id);
    state.connection_count.fetch_sub(1, Ordering::Relaxed);
    tracing::debug!(conn_id, "session disconnected");
}

/// Dispatch a single client message.
async fn handle_message(
    state: &Arc<AppState>,
    conn_id: u64,
    tx: &mpsc::UnboundedSender<ServerMessage>,
    msg: ClientMessage,
) {
    match msg {
        ClientMessage::RequestPair => {
            send_fresh_pair(state, conn_id, tx);
        }

        ClientMessage::Vote { winner, loser } => {
            if vote_matches_offer(state, conn_id, &winner, &loser) {
                // Broadcasting happens inside apply_vote, under the vote
                // lock; a skipped (unknown-phrase) vote is already logged.
                if let Err(err) = apply_vote(state, &winner, &loser).await {
                    tracing::error!(%err, %winner, %loser, "failed to persist vote");
                }
            } else {
                tracing::warn!(
                    conn_id,
                    %winner,
                    %loser,
                    "vote does not match the pair offered to this session, ignoring"
                );
            }

            // The voter always gets a fresh pair, even when the vote was
            // skipped.
            send_fresh_pair(state, conn_id, tx);
        }

        ClientMessage::RequestLeaderboard => {
            match db::top_n(&state.db, LEADERBOARD_SIZE).await {
                Ok(leaderboard) => {
                    let _ = tx.send(ServerMessage::LeaderboardUpdate { leaderboard });
                }
                Err(err) => {
                    tracing::error!(%err, "failed to read leaderboard");
                    let _ = tx.send(ServerMessage::Error {
                        message: "Leaderboard unavailable".into(),
                    });
                }
            }
        }

        ClientMessage::Ping => {
            let _ = tx.send(ServerMessage::Pong);
        }
    }
}

/// Apply one vote: read both ratings, run the Elo update, persist both rows,
/// broadcast the fresh top-N standings to every session, and return them --
/// all under the vote lock, so concurrent votes serialize and sessions
/// receive the broadcasts in vote order (a later vote can never be overtaken
/// by an older snapshot).
///
/// Returns `Ok(None)` when either phrase is unknown to the store; the vote
/// is skipped and the caller carries on.
pub async fn apply_vote(
    state: &AppState,
    winner: &str,
    loser: &str,
) -> Result<Option<Vec<(String, i32)>>, sqlx::Error> {
    if winner == loser {
        tracing::warn!(phrase = %winner, "vote names the same phrase on both sides, skipping");
        return Ok(None);
    }

    let _guard = state.vote_lock.lock().await;

    let winner_elo = db::get_rating(&state.db, winner).await?;
    let loser_elo = db::get_rating(&state.db, loser).await?;

    let (Some(winner_elo), Some(loser_elo)) = (winner_elo, loser_elo) else {
        tracing::warn!(%winner, %loser, "vote references unknown phrase, skipping rating update");
        return Ok(None);
    };

    let (new_winner_elo, new_loser_elo) = update_elo(winner_elo, loser_elo);
    db::set_rating(&state.db, winner, new_winner_elo).await?;
    db::set_rating(&state.db, loser, new_loser_elo).await?;

    tracing::debug!(
        %winner,
        %loser,
        winner_elo = new_winner_elo,
        loser_elo = new_loser_elo,
        "vote recorded"
    );

    // Standings computed after both writes and enqueued to every session
    // before the lock drops, so each broadcast reflects a store state that
    // existed at one instant and broadcasts go out in vote order.
    let leaderboard = db::top_n(&state.db, LEADERBOARD_SIZE).await?;
    broadcast(
        state,
        ServerMessage::LeaderboardUpdate {
            leaderboard: leaderboard.clone(),
        },
    );
    Ok(Some(leaderboard))
}

/// A vote is valid only when it names exactly the pair last offered to this
/// session, in either order. A session that was never offered a pair has
/// nothing to vote on, so its votes are rejected too.
fn vote_matches_offer(state: &AppState, conn_id: u64, winner: &str, loser: &str) -> bool {
    match state.connections.get(&conn_id).and_then(|c| c.offered_pair.clone()) {
        None => false,
        Some((a, b)) => (winner == a && loser == b) || (winner == b && loser == a),
    }
}

/// Select a new pair, record it as this session's offered pair, and send it
/// to the requester only.
fn send_fresh_pair(state: &AppState, conn_id: u64, tx: &mpsc::UnboundedSender<ServerMessage>) {
    let pair = {
        let mut rng = rand::rng();
        pairing::select_pair(&state.phrases, &state.similarity, &mut rng)
    };

    match pair {
        Ok((phrase1, phrase2)) => {
            if let Some(mut conn) = state.connections.get_mut(&conn_id) {
                conn.offered_pair = Some((phrase1.clone(), phrase2.clone()));
            }
            let _ = tx.send(ServerMessage::NewPair { phrase1, phrase2 });
        }
        // Startup refuses to run with fewer than two phrases, so this only
        // fires if the server was forced up in a broken state.
        Err(err) => {
            tracing::error!(%err, "cannot select a pair");
            let _ = tx.send(ServerMessage::Error {
                message: "Not enough phrases to serve a duel".into(),
            });
        }
    }
}
