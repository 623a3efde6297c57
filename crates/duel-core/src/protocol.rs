use serde::{Deserialize, Serialize};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Ask for the next duel.
    RequestPair,
    /// Record the outcome of the duel this session was last shown.
    Vote { winner: String, loser: String },
    /// Ask for the current top-200 standings (reply goes to this session only).
    RequestLeaderboard,
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    NewPair {
        phrase1: String,
        phrase2: String,
    },
    /// Current standings, rating descending. Serialized as
    /// `[[phrase, elo], ...]` pairs.
    LeaderboardUpdate {
        leaderboard: Vec<(String, i32)>,
    },
    Error {
        message: String,
    },
    Pong,
}
