//! Monetary values.
//!
//! Amounts and balances are exact decimals. On the wire they are JSON
//! numbers; values are capped at [`MAX_MONEY`] so that the float
//! representation round-trips exactly.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Maximum number of fractional digits accepted in an [`Amount`].
pub const MAX_SCALE: u32 = 2;

/// Upper bound for any amount or balance (one trillion).
pub const MAX_MONEY: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// A strictly positive monetary amount with at most [`MAX_SCALE`] decimals.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Amount(Decimal);

impl Amount {
    /// Validate and wrap a decimal value.
    pub fn new(value: Decimal) -> Result<Self, TypeError> {
        if value <= Decimal::ZERO {
            return Err(TypeError::NonPositiveAmount(value.to_string()));
        }
        if value.normalize().scale() > MAX_SCALE {
            return Err(TypeError::TooPrecise {
                value: value.to_string(),
                max_scale: MAX_SCALE,
            });
        }
        if value > MAX_MONEY {
            return Err(TypeError::Overflow);
        }
        Ok(Self(value))
    }

    /// The underlying decimal.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Amount {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value =
            Decimal::from_str(s.trim()).map_err(|e| TypeError::InvalidDecimal(e.to_string()))?;
        Self::new(value)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = TypeError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// A non-negative wallet balance.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Balance(Decimal);

impl Balance {
    /// The zero balance every new wallet starts with.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Validate and wrap a decimal value.
    pub fn new(value: Decimal) -> Result<Self, TypeError> {
        if value < Decimal::ZERO {
            return Err(TypeError::NegativeBalance(value.to_string()));
        }
        if value > MAX_MONEY {
            return Err(TypeError::Overflow);
        }
        Ok(Self(value))
    }

    /// The underlying decimal.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Returns `true` if the balance is at least `required`.
    pub fn covers(&self, required: Decimal) -> bool {
        self.0 >= required
    }

    /// Add an amount, failing if the result would exceed [`MAX_MONEY`].
    pub fn credit(&self, amount: Amount) -> Result<Self, TypeError> {
        let next = self.0.checked_add(amount.0).ok_or(TypeError::Overflow)?;
        Self::new(next)
    }

    /// Subtract an amount. Returns `None` when the balance does not cover it.
    pub fn debit(&self, amount: Amount) -> Option<Self> {
        if !self.covers(amount.0) {
            return None;
        }
        Some(Self(self.0 - amount.0))
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl From<Balance> for Decimal {
    fn from(balance: Balance) -> Self {
        balance.0
    }
}

impl FromStr for Balance {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value =
            Decimal::from_str(s.trim()).map_err(|e| TypeError::InvalidDecimal(e.to_string()))?;
        Self::new(value)
    }
}

/// A non-negative running sum across many amounts, such as a campaign's
/// raised total. Unlike [`Balance`] it is not capped at [`MAX_MONEY`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Total(Decimal);

impl Total {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, TypeError> {
        if value < Decimal::ZERO {
            return Err(TypeError::NegativeBalance(value.to_string()));
        }
        Ok(Self(value))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn covers(&self, required: Decimal) -> bool {
        self.0 >= required
    }

    /// Add an amount. Fails only when the decimal representation overflows.
    pub fn add(&self, amount: Amount) -> Result<Self, TypeError> {
        self.0.checked_add(amount.0).map(Self).ok_or(TypeError::Overflow)
    }

    /// Sum a sequence of amounts.
    pub fn sum<I>(amounts: I) -> Result<Self, TypeError>
    where
        I: IntoIterator<Item = Amount>,
    {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |total, amount| total.add(amount))
    }
}

impl From<Total> for Decimal {
    fn from(total: Total) -> Self {
        total.0
    }
}

macro_rules! money_impls {
    ($name:ident) => {
        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:.2})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:.2}", self.0)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                rust_decimal::serde::float::serialize(&self.0, serializer)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = <Decimal as Deserialize>::deserialize(deserializer)?;
                Self::new(value).map_err(serde::de::Error::custom)
            }
        }
    };
}

money_impls!(Amount);
money_impls!(Balance);
money_impls!(Total);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn amount_rejects_zero_and_negative() {
        assert!(matches!(Amount::new(dec!(0)), Err(TypeError::NonPositiveAmount(_))));
        assert!(matches!(Amount::new(dec!(-5)), Err(TypeError::NonPositiveAmount(_))));
    }

    #[test]
    fn amount_rejects_sub_cent_precision() {
        assert!(matches!(Amount::new(dec!(1.001)), Err(TypeError::TooPrecise { .. })));
        // Trailing zeros are not extra precision.
        assert!(Amount::new(dec!(1.500)).is_ok());
    }

    #[test]
    fn amount_rejects_values_above_cap() {
        assert_eq!(MAX_MONEY, dec!(1_000_000_000_000));
        assert!(Amount::new(MAX_MONEY).is_ok());
        assert!(matches!(Amount::new(MAX_MONEY + dec!(1)), Err(TypeError::Overflow)));
    }

    #[test]
    fn amount_parses_from_str() {
        let a: Amount = "40.00".parse().unwrap();
        assert_eq!(a.as_decimal(), dec!(40));
        assert!("abc".parse::<Amount>().is_err());
    }

    #[test]
    fn display_uses_two_decimals() {
        assert_eq!(Balance::new(dec!(30)).unwrap().to_string(), "30.00");
        assert_eq!(Amount::new(dec!(40.5)).unwrap().to_string(), "40.50");
    }

    #[test]
    fn balance_credit_and_debit() {
        let b = Balance::new(dec!(100.00)).unwrap();
        let forty = Amount::new(dec!(40.00)).unwrap();
        let after = b.debit(forty).unwrap();
        assert_eq!(after.as_decimal(), dec!(60.00));
        assert_eq!(after.credit(forty).unwrap(), b);
    }

    #[test]
    fn balance_debit_refuses_overdraft() {
        let b = Balance::new(dec!(30.00)).unwrap();
        assert!(b.debit(Amount::new(dec!(40.00)).unwrap()).is_none());
    }

    #[test]
    fn balance_credit_overflow_is_an_error() {
        let b = Balance::new(MAX_MONEY).unwrap();
        assert_eq!(b.credit(Amount::new(dec!(0.01)).unwrap()), Err(TypeError::Overflow));
    }

    #[test]
    fn negative_balance_rejected() {
        assert!(matches!(Balance::new(dec!(-0.01)), Err(TypeError::NegativeBalance(_))));
        assert_eq!(Balance::new(dec!(0)).unwrap(), Balance::ZERO);
    }

    #[test]
    fn serde_uses_json_numbers() {
        let a = Amount::new(dec!(40.10)).unwrap();
        assert_eq!(serde_json::to_string(&a).unwrap(), "40.1");
        let back: Amount = serde_json::from_str("40.1").unwrap();
        assert_eq!(back, a);
        let from_int: Amount = serde_json::from_str("40").unwrap();
        assert_eq!(from_int.as_decimal(), dec!(40));
        let from_str: Balance = serde_json::from_str("\"12.34\"").unwrap();
        assert_eq!(from_str.as_decimal(), dec!(12.34));
    }

    #[test]
    fn serde_rejects_invalid_amounts() {
        assert!(serde_json::from_str::<Amount>("0").is_err());
        assert!(serde_json::from_str::<Amount>("-3").is_err());
        assert!(serde_json::from_str::<Balance>("-3").is_err());
    }

    #[test]
    fn total_is_not_capped() {
        let big = Amount::new(MAX_MONEY).unwrap();
        let total = Total::sum([big, big, big]).unwrap();
        assert_eq!(total.as_decimal(), dec!(3_000_000_000_000));
        assert!(total.covers(MAX_MONEY));
        assert_eq!(total.to_string(), "3000000000000.00");
    }

    #[test]
    fn total_serde_accepts_values_above_cap() {
        let total: Total = serde_json::from_str("1500000000000").unwrap();
        assert_eq!(total.as_decimal(), dec!(1_500_000_000_000));
        assert!(serde_json::from_str::<Total>("-1").is_err());
        assert!(serde_json::from_str::<Balance>("1500000000000").is_err());
    }

    proptest! {
        #[test]
        fn debit_never_goes_negative(start in 0u64..1_000_000, take in 1u64..2_000_000) {
            let balance = Balance::new(Decimal::new(start as i64, 2)).unwrap();
            let amount = Amount::new(Decimal::new(take as i64, 2)).unwrap();
            match balance.debit(amount) {
                Some(next) => {
                    prop_assert!(take <= start);
                    prop_assert!(next.as_decimal() >= Decimal::ZERO);
                }
                None => prop_assert!(take > start),
            }
        }

        #[test]
        fn credit_then_debit_restores(start in 0u64..1_000_000, add in 1u64..1_000_000) {
            let balance = Balance::new(Decimal::new(start as i64, 2)).unwrap();
            let amount = Amount::new(Decimal::new(add as i64, 2)).unwrap();
            let restored = balance.credit(amount).unwrap().debit(amount).unwrap();
            prop_assert_eq!(restored, balance);
        }
    }
}
