//! Storage layer for Tally: `SeaORM` entities, schema bootstrap, and the
//! ledger engine that executes every account and transaction operation.

pub mod engine;
pub mod entities;
pub mod schema;

pub use engine::{LedgerEngine, LedgerError};
pub use schema::{init_schema, reset_state};

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::debug;

use tally_shared::config::DatabaseConfig;

/// Establishes a connection pool sized from configuration.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the URL is invalid.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections);
    debug!(url = %config.url, "Connecting to database");
    Database::connect(options).await
}
