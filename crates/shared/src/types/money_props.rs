//! Property-based tests for money conversion laws.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::money::{Money, MoneyError};

/// Strategy for minor-unit counts comfortably inside the decimal range.
fn any_minor() -> impl Strategy<Value = i64> {
    -1_000_000_000_000i64..1_000_000_000_000i64
}

proptest! {
    /// Minor units survive a round trip through `Decimal` unchanged.
    #[test]
    fn prop_minor_decimal_round_trip(minor in any_minor()) {
        let money = Money::from_minor(minor);
        let back = Money::from_decimal(money.to_decimal());
        prop_assert_eq!(back, Ok(money));
    }

    /// Display output parses back to the same amount.
    #[test]
    fn prop_display_round_trip(minor in any_minor()) {
        let money = Money::from_minor(minor);
        let parsed: Decimal = money.to_string().parse().unwrap();
        prop_assert_eq!(Money::from_decimal(parsed), Ok(money));
    }

    /// Addition agrees with plain i64 addition on minor units.
    #[test]
    fn prop_checked_add_matches_minor_sum(a in any_minor(), b in any_minor()) {
        let sum = Money::from_minor(a).checked_add(Money::from_minor(b));
        prop_assert_eq!(sum, a.checked_add(b).map(Money::from_minor));
    }

    /// A nonzero fifth decimal place is always rejected, never rounded.
    #[test]
    fn prop_excess_precision_rejected(units in 0i64..1_000_000i64, last in 1i64..10i64) {
        let mantissa = i128::from(units) * 100_000 + i128::from(last);
        let value = Decimal::from_i128_with_scale(mantissa, 5);
        let result = Money::from_decimal(value);
        prop_assert_eq!(result, Err(MoneyError::TooPrecise(value)));
    }
}
