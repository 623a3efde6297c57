use sqlx::{Row, SqlitePool};

/// Create the ratings table if it doesn't exist.
pub async fn init_db(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS ratings (
            phrase TEXT PRIMARY KEY,
            elo INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Insert a row at `initial_elo` for every phrase not already present.
/// Idempotent: existing ratings are never overwritten.
pub async fn seed_ratings(
    pool: &SqlitePool,
    phrases: &[String],
    initial_elo: i32,
) -> Result<(), sqlx::Error> {
    for phrase in phrases {
        sqlx::query("INSERT OR IGNORE INTO ratings (phrase, elo) VALUES (?1, ?2)")
            .bind(phrase)
            .bind(initial_elo)
            .execute(pool)
            .await?;
    }
    Ok(())
}

/// Get a phrase's rating, if the phrase is known.
pub async fn get_rating(pool: &SqlitePool, phrase: &str) -> Result<Option<i32>, sqlx::Error> {
    let row = sqlx::query("SELECT elo FROM ratings WHERE phrase = ?1")
        .bind(phrase)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| r.get::<i32, _>("elo")))
}

pub async fn set_rating(pool: &SqlitePool, phrase: &str, elo: i32) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE ratings SET elo = ?1 WHERE phrase = ?2")
        .bind(elo)
        .bind(phrase)
        .execute(pool)
        .await?;

    Ok(())
}

/// Top phrases by rating descending. Ties break on phrase text ascending so
/// the ordering is deterministic.
pub async fn top_n(pool: &SqlitePool, limit: i64) -> Result<Vec<(String, i32)>, sqlx::Error> {
    let rows = sqlx::query("SELECT phrase, elo FROM ratings ORDER BY elo DESC, phrase ASC LIMIT ?1")
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|r| (r.get::<String, _>("phrase"), r.get::<i32, _>("elo")))
        .collect())
}
