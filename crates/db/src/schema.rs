//! Schema bootstrap for the ledger tables.
//!
//! The service creates its two tables at startup when they are absent; there
//! is no migration history to replay. The DDL is written per backend because
//! auto-increment and timestamp column spellings differ between SQLite and
//! Postgres. Balances carry a CHECK constraint so a negative value can never
//! be committed even if a write slips past the engine's own guard.

use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, DbErr};

const SQLITE_SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS t_accounts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    second_name TEXT NOT NULL,
    registered_at TEXT NOT NULL,
    balance BIGINT NOT NULL,
    CHECK (balance >= 0)
);

CREATE TABLE IF NOT EXISTS t_transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    sender_id BIGINT,
    recipient_id BIGINT,
    transaction_time TEXT NOT NULL,
    sum BIGINT NOT NULL,
    type SMALLINT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sender ON t_transactions (sender_id);
CREATE INDEX IF NOT EXISTS idx_recipient ON t_transactions (recipient_id);
";

const POSTGRES_SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS t_accounts (
    id BIGSERIAL PRIMARY KEY,
    first_name VARCHAR(128) NOT NULL,
    second_name VARCHAR(128) NOT NULL,
    registered_at TIMESTAMPTZ NOT NULL,
    balance BIGINT NOT NULL,
    CHECK (balance >= 0)
);

CREATE TABLE IF NOT EXISTS t_transactions (
    id BIGSERIAL PRIMARY KEY,
    sender_id BIGINT,
    recipient_id BIGINT,
    transaction_time TIMESTAMPTZ NOT NULL,
    sum BIGINT NOT NULL,
    type SMALLINT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sender ON t_transactions (sender_id);
CREATE INDEX IF NOT EXISTS idx_recipient ON t_transactions (recipient_id);
";

/// Creates the ledger tables and indexes if they do not exist.
///
/// # Errors
///
/// Returns an error if the DDL cannot be executed.
pub async fn init_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let schema = match db.get_database_backend() {
        DbBackend::Sqlite => SQLITE_SCHEMA,
        _ => POSTGRES_SCHEMA,
    };
    db.execute_unprepared(schema).await?;
    Ok(())
}

/// Empties both ledger tables without dropping them. Intended for tests and
/// throwaway environments, never wired to a network surface.
///
/// # Errors
///
/// Returns an error if either delete fails.
pub async fn reset_state(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute_unprepared("DELETE FROM t_transactions; DELETE FROM t_accounts;")
        .await?;
    Ok(())
}
