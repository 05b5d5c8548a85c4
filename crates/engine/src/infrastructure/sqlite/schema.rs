//! Board layout schema bootstrap.

use sqlx::SqlitePool;

use crate::infrastructure::ports::RepoError;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS boards (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL UNIQUE,
        width INTEGER NOT NULL CHECK (width >= 0),
        height INTEGER NOT NULL CHECK (height >= 0),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS cities (
        id TEXT PRIMARY KEY NOT NULL,
        board_id TEXT NOT NULL REFERENCES boards (id),
        name TEXT NOT NULL,
        x INTEGER NOT NULL DEFAULT 0,
        y INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS cities_board_id ON cities (board_id)",
    r#"
    CREATE TABLE IF NOT EXISTS city_spaces (
        id TEXT PRIMARY KEY NOT NULL,
        city_id TEXT NOT NULL REFERENCES cities (id),
        "order" INTEGER NOT NULL,
        space_type INTEGER NOT NULL CHECK (space_type IN (1, 2)),
        required_privilege INTEGER NOT NULL CHECK (required_privilege BETWEEN 1 AND 4),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE (city_id, "order")
    )
    "#,
];

/// Create the boards, cities and city_spaces tables if they are missing.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), RepoError> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| RepoError::database("ensure_schema", e))?;
    }

    tracing::info!("SQLite schema initialized (boards, cities, city_spaces)");
    Ok(())
}
