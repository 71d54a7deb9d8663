//! Property-based tests for request validation rules.

use proptest::prelude::*;
use rust_decimal::Decimal;

use tally_shared::AccountId;

use crate::requests::{CreateAccount, Deposit, Transfer, ValidationError, Withdrawal};

/// Strategy for a strictly positive representable sum.
fn positive_sum() -> impl Strategy<Value = Decimal> {
    // 0.0001 up to 100,000,000.0000 in minor units.
    (1i64..1_000_000_000_000i64).prop_map(|minor| Decimal::new(minor, 4))
}

/// Strategy for a zero or negative sum.
fn non_positive_sum() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000_000i64).prop_map(|minor| Decimal::new(-minor, 4))
}

/// Strategy for a pair of distinct account ids.
fn distinct_ids() -> impl Strategy<Value = (AccountId, AccountId)> {
    (1i64..10_000i64, 1i64..10_000i64)
        .prop_filter("endpoints must differ", |(a, b)| a != b)
        .prop_map(|(a, b)| (AccountId::new(a), AccountId::new(b)))
}

proptest! {
    /// Any non-positive sum is rejected by every money-moving request.
    #[test]
    fn prop_non_positive_sums_rejected(sum in non_positive_sum(), (from, to) in distinct_ids()) {
        prop_assert_eq!(
            Deposit::new(from, sum).unwrap_err(),
            ValidationError::NonPositiveSum
        );
        prop_assert_eq!(
            Withdrawal::new(from, sum).unwrap_err(),
            ValidationError::NonPositiveSum
        );
        prop_assert_eq!(
            Transfer::new(from, to, sum).unwrap_err(),
            ValidationError::NonPositiveSum
        );
    }

    /// Any positive representable sum is accepted and survives unchanged.
    #[test]
    fn prop_positive_sums_accepted(sum in positive_sum(), (from, to) in distinct_ids()) {
        let transfer = Transfer::new(from, to, sum).unwrap();
        prop_assert_eq!(transfer.sum().to_decimal().normalize(), sum.normalize());
        prop_assert!(Deposit::new(from, sum).is_ok());
        prop_assert!(Withdrawal::new(from, sum).is_ok());
    }

    /// A transfer to the same account never validates, whatever the sum.
    #[test]
    fn prop_self_transfer_rejected(sum in positive_sum(), id in 1i64..10_000i64) {
        let id = AccountId::new(id);
        prop_assert_eq!(
            Transfer::new(id, id, sum).unwrap_err(),
            ValidationError::SelfTransfer
        );
    }

    /// Negative initial balances are rejected; non-negative ones accepted.
    #[test]
    fn prop_initial_balance_sign(minor in 1i64..1_000_000_000_000i64) {
        let negative = Decimal::new(-minor, 4);
        prop_assert_eq!(
            CreateAccount::new("A".into(), "B".into(), negative).unwrap_err(),
            ValidationError::NegativeInitialBalance
        );

        let non_negative = Decimal::new(minor, 4);
        let req = CreateAccount::new("A".into(), "B".into(), non_negative).unwrap();
        prop_assert_eq!(req.initial_balance().minor(), minor);
    }
}
