//! Shared types and configuration for Tally.
//!
//! This crate provides common types used across all other crates:
//! - Fixed-point money amounts (no floating point anywhere)
//! - Typed IDs for type-safe entity references
//! - Configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
pub use types::{AccountId, Money, MoneyError, TransactionId};
