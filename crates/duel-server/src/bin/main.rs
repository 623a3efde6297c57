use std::path::Path;

use tracing_subscriber::EnvFilter;

use duel_core::phrases::load_phrases;
use duel_core::SimilarityIndex;
use duel_server::ServerConfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let db_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:elo_scores.db?mode=rwc".to_string());
    let phrases_path =
        std::env::var("PHRASES_PATH").unwrap_or_else(|_| "phrases.txt".to_string());
    let similarity_path =
        std::env::var("SIMILARITY_PATH").unwrap_or_else(|_| "similarity_matrix.json".to_string());

    let phrases = load_phrases(Path::new(&phrases_path)).expect("Failed to read phrase list");
    let similarity = SimilarityIndex::load(Path::new(&similarity_path));

    let (app, _state) = duel_server::build_app(ServerConfig {
        db_url,
        phrases,
        similarity,
        max_connections: 100,
    })
    .await;

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("0.0.0.0:{}", port);

    println!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    axum::serve(listener, app).await.expect("Server error");
}
