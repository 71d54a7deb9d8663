//! Core domain logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies:
//!
//! - `requests` - Validated request types, the precondition layer in front
//!   of the ledger engine
//! - `clock` - The injected time source that stamps accounts and
//!   transactions

pub mod clock;
pub mod requests;

#[cfg(test)]
mod request_props;

pub use clock::{Clock, FixedClock, SystemClock};
pub use requests::{
    AccountInfo, CloseAccount, CreateAccount, Deposit, Transfer, TransactionsInfo, ValidationError,
    Withdrawal,
};
