pub mod db;
pub mod routes;
pub mod state;
pub mod ws;

use std::sync::atomic::{AtomicU32, AtomicU64};
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use dashmap::DashMap;
use sqlx::sqlite::SqlitePoolOptions;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use duel_core::elo::INITIAL_ELO;
use duel_core::SimilarityIndex;

use crate::state::AppState;

/// Process-scoped configuration, loaded once by the binary (or built
/// directly by tests) and injected here rather than read from globals.
pub struct ServerConfig {
    pub db_url: String,
    pub phrases: Vec<String>,
    pub similarity: SimilarityIndex,
    pub max_connections: u32,
}

/// Build a fully configured Router + shared state.
///
/// Panics when fewer than two phrases are configured: there is nothing to
/// duel, so refusing to start beats failing on the first request.
pub async fn build_app(config: ServerConfig) -> (Router, Arc<AppState>) {
    assert!(
        config.phrases.len() >= 2,
        "need at least two phrases to serve duels, got {}",
        config.phrases.len()
    );

    // One connection: all access is serialized by the vote lock anyway, and
    // an in-memory database must not be split across pool connections.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&config.db_url)
        .await
        .expect("Failed to connect to SQLite");

    db::init_db(&pool)
        .await
        .expect("Failed to initialize database");

    // Lazily create rating rows for phrases new since the last run.
    db::seed_ratings(&pool, &config.phrases, INITIAL_ELO)
        .await
        .expect("Failed to seed ratings");

    tracing::info!(
        phrases = config.phrases.len(),
        similarity_available = config.similarity.is_available(),
        "phrase universe loaded"
    );

    let state = Arc::new(AppState {
        db: pool,
        phrases: config.phrases,
        similarity: config.similarity,
        connections: DashMap::new(),
        next_conn_id: AtomicU64::new(1),
        connection_count: AtomicU32::new(0),
        max_connections: config.max_connections,
        vote_lock: Mutex::new(()),
    });

    let app = Router::new()
        .route("/health", get(routes::health))
        .route("/leaderboard", get(routes::leaderboard))
        .route("/ws", get(routes::ws_upgrade))
        .layer(CorsLayer::permissive())
        .with_state(state.clone());

    (app, state)
}
