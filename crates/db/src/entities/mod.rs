//! `SeaORM` entity definitions for the ledger tables.

pub mod accounts;
pub mod transactions;

pub use transactions::TransactionKind;
