//! Validated request types for the ledger engine.
//!
//! Construction of a request fails immediately, before any store access,
//! when a local field constraint is violated: non-positive sums, equal
//! transfer endpoints, a negative initial balance, or an amount that cannot
//! be represented at the fixed-point scale. Requests that carry no such
//! constraints are plain data.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use tally_shared::{AccountId, Money, MoneyError};

/// Validation failures detected before any store access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A request carried a zero or negative sum.
    #[error("The sum in any request must always be greater than zero.")]
    NonPositiveSum,
    /// An account would be created with a negative balance.
    #[error("An account must have non-negative balance.")]
    NegativeInitialBalance,
    /// A transfer names the same account on both sides.
    #[error("Transfers from clients to themselves are forbidden.")]
    SelfTransfer,
    /// An amount could not be represented at the fixed-point scale.
    #[error(transparent)]
    Amount(#[from] MoneyError),
}

fn positive_sum(value: Decimal) -> Result<Money, ValidationError> {
    let sum = Money::from_decimal(value)?;
    if sum.is_positive() {
        Ok(sum)
    } else {
        Err(ValidationError::NonPositiveSum)
    }
}

/// Request to open a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAccount {
    first_name: String,
    second_name: String,
    initial_balance: Money,
}

impl CreateAccount {
    /// Validates and builds the request.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NegativeInitialBalance`] when the starting
    /// balance is below zero, or an amount error when it cannot be
    /// represented exactly.
    pub fn new(
        first_name: String,
        second_name: String,
        initial_balance: Decimal,
    ) -> Result<Self, ValidationError> {
        let initial_balance = Money::from_decimal(initial_balance)?;
        if initial_balance.is_negative() {
            return Err(ValidationError::NegativeInitialBalance);
        }
        Ok(Self {
            first_name,
            second_name,
            initial_balance,
        })
    }

    /// Holder's first name.
    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Holder's second name.
    #[must_use]
    pub fn second_name(&self) -> &str {
        &self.second_name
    }

    /// Opening balance, zero or more.
    #[must_use]
    pub const fn initial_balance(&self) -> Money {
        self.initial_balance
    }
}

/// Request to close (hard-delete) an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseAccount {
    /// Account to remove.
    pub account_id: AccountId,
}

/// Request to read one account's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountInfo {
    /// Account to look up.
    pub account_id: AccountId,
}

/// Request to list the transactions an account took part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionsInfo {
    /// Account whose history is requested.
    pub account_id: AccountId,
    /// Inclusive lower time bound; unbounded when absent.
    pub start_period: Option<DateTime<Utc>>,
    /// Inclusive upper time bound; unbounded when absent.
    pub end_period: Option<DateTime<Utc>>,
    /// Maximum number of records to return; unbounded when absent.
    pub limit: Option<u64>,
}

impl TransactionsInfo {
    /// Builds an unfiltered history request for one account.
    #[must_use]
    pub const fn all(account_id: AccountId) -> Self {
        Self {
            account_id,
            start_period: None,
            end_period: None,
            limit: None,
        }
    }
}

/// Request to add funds to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deposit {
    account_id: AccountId,
    sum: Money,
}

impl Deposit {
    /// Validates and builds the request.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonPositiveSum`] unless the sum is
    /// strictly positive.
    pub fn new(account_id: AccountId, sum: Decimal) -> Result<Self, ValidationError> {
        Ok(Self {
            account_id,
            sum: positive_sum(sum)?,
        })
    }

    /// Receiving account.
    #[must_use]
    pub const fn account_id(&self) -> AccountId {
        self.account_id
    }

    /// Amount to add, strictly positive.
    #[must_use]
    pub const fn sum(&self) -> Money {
        self.sum
    }
}

/// Request to remove funds from an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Withdrawal {
    account_id: AccountId,
    sum: Money,
}

impl Withdrawal {
    /// Validates and builds the request.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonPositiveSum`] unless the sum is
    /// strictly positive.
    pub fn new(account_id: AccountId, sum: Decimal) -> Result<Self, ValidationError> {
        Ok(Self {
            account_id,
            sum: positive_sum(sum)?,
        })
    }

    /// Paying account.
    #[must_use]
    pub const fn account_id(&self) -> AccountId {
        self.account_id
    }

    /// Amount to remove, strictly positive.
    #[must_use]
    pub const fn sum(&self) -> Money {
        self.sum
    }
}

/// Request to move funds between two distinct accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    from: AccountId,
    to: AccountId,
    sum: Money,
}

impl Transfer {
    /// Validates and builds the request.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonPositiveSum`] unless the sum is
    /// strictly positive, or [`ValidationError::SelfTransfer`] when both
    /// endpoints are the same account.
    pub fn new(from: AccountId, to: AccountId, sum: Decimal) -> Result<Self, ValidationError> {
        let sum = positive_sum(sum)?;
        if from == to {
            return Err(ValidationError::SelfTransfer);
        }
        Ok(Self { from, to, sum })
    }

    /// Paying account.
    #[must_use]
    pub const fn from(&self) -> AccountId {
        self.from
    }

    /// Receiving account.
    #[must_use]
    pub const fn to(&self) -> AccountId {
        self.to
    }

    /// Amount to move, strictly positive.
    #[must_use]
    pub const fn sum(&self) -> Money {
        self.sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_create_account_accepts_zero_balance() {
        let req = CreateAccount::new("A".into(), "B".into(), dec!(0)).unwrap();
        assert_eq!(req.initial_balance(), Money::ZERO);
        assert_eq!(req.first_name(), "A");
        assert_eq!(req.second_name(), "B");
    }

    #[test]
    fn test_create_account_rejects_negative_balance() {
        assert_eq!(
            CreateAccount::new("Client".into(), "Unborn".into(), dec!(-200)),
            Err(ValidationError::NegativeInitialBalance)
        );
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-0.5))]
    fn test_deposit_rejects_non_positive_sum(#[case] sum: Decimal) {
        assert_eq!(
            Deposit::new(AccountId::new(1), sum),
            Err(ValidationError::NonPositiveSum)
        );
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-40))]
    fn test_withdrawal_rejects_non_positive_sum(#[case] sum: Decimal) {
        assert_eq!(
            Withdrawal::new(AccountId::new(1), sum),
            Err(ValidationError::NonPositiveSum)
        );
    }

    #[test]
    fn test_transfer_rejects_self_transfer() {
        assert_eq!(
            Transfer::new(AccountId::new(3), AccountId::new(3), dec!(10)),
            Err(ValidationError::SelfTransfer)
        );
    }

    #[test]
    fn test_transfer_checks_sum_before_endpoints() {
        // Mirrors the precedence of the field checks: a request that is
        // wrong in both ways reports the sum problem.
        assert_eq!(
            Transfer::new(AccountId::new(3), AccountId::new(3), dec!(0)),
            Err(ValidationError::NonPositiveSum)
        );
    }

    #[test]
    fn test_too_precise_amount_is_a_validation_error() {
        let err = Deposit::new(AccountId::new(1), dec!(0.00001)).unwrap_err();
        assert!(matches!(err, ValidationError::Amount(MoneyError::TooPrecise(_))));
    }

    #[test]
    fn test_valid_transfer() {
        let req = Transfer::new(AccountId::new(1), AccountId::new(2), dec!(40)).unwrap();
        assert_eq!(req.from(), AccountId::new(1));
        assert_eq!(req.to(), AccountId::new(2));
        assert_eq!(req.sum(), Money::from_minor(400_000));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ValidationError::NonPositiveSum.to_string(),
            "The sum in any request must always be greater than zero."
        );
        assert_eq!(
            ValidationError::NegativeInitialBalance.to_string(),
            "An account must have non-negative balance."
        );
        assert_eq!(
            ValidationError::SelfTransfer.to_string(),
            "Transfers from clients to themselves are forbidden."
        );
    }
}
