//! SQLite database implementations.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::infrastructure::ports::RepoError;

mod board_repo;
mod helpers;
mod schema;


pub use board_repo::SqliteBoardCrudRepo;
pub use schema::ensure_schema;

/// Open a connection pool for `database_url` (e.g. `sqlite:cityroute.db?mode=rwc`).
///
/// Foreign keys are enforced on every connection.
pub async fn connect(database_url: &str) -> Result<SqlitePool, RepoError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| RepoError::database("connect", e))?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| RepoError::database("connect", e))
}

/// Open a single-connection in-memory database.
///
/// The pool never recycles its connection, since closing it would drop
/// the database.
pub async fn connect_in_memory() -> Result<SqlitePool, RepoError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(|e| RepoError::database("connect", e))?
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(|e| RepoError::database("connect", e))
}
