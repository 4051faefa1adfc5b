//! Exact currency amounts.
//!
//! Amounts are held as a count of minor units (centavos) so that balance arithmetic,
//! both here and in the SQL the ledger issues, never drifts. User input arrives as
//! text and goes through [`Money::parse`], which is where amount validation lives.

use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of fractional digits in the currency.
pub const MINOR_DIGITS: u32 = 2;

/// Symbol used when amounts are rendered for people.
pub const CURRENCY_SYMBOL: &str = "₱";

const MINOR_PER_MAJOR: i64 = 100;

/// A currency amount in minor units.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw minor-unit count.
    #[must_use]
    pub const fn from_minor(minor_units: i64) -> Self {
        Self(minor_units)
    }

    /// Builds an amount from whole currency units.
    #[must_use]
    pub const fn from_major(major_units: i64) -> Self {
        Self(major_units * MINOR_PER_MAJOR)
    }

    /// The raw minor-unit count, as stored in balance columns.
    #[must_use]
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Whether the amount is strictly greater than zero.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Sum of two amounts, or `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(sum) => Some(Self(sum)),
            None => None,
        }
    }

    /// Difference of two amounts, or `None` on overflow.
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(diff) => Some(Self(diff)),
            None => None,
        }
    }

    /// The amount as a decimal number of major units.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, MINOR_DIGITS)
    }

    /// Converts a decimal amount, rejecting anything finer than one minor unit.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if the value has more than two decimal places or
    /// does not fit in the minor-unit range.
    pub fn from_decimal(value: Decimal) -> Result<Self> {
        let value = value.normalize();
        if value.scale() > MINOR_DIGITS {
            return Err(Error::validation(
                "Amounts can have at most two decimal places.",
            ));
        }

        value
            .checked_mul(Decimal::from(MINOR_PER_MAJOR))
            .and_then(|minor| minor.to_i64())
            .map(Self)
            .ok_or_else(|| Error::validation("Amount is too large."))
    }

    /// Parses a user-entered amount that must be strictly positive.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if the input is empty, is not a number, is zero or
    /// negative, or has more than two decimal places.
    pub fn parse(input: &str) -> Result<Self> {
        let amount = Self::parse_non_negative(input)?;
        if !amount.is_positive() {
            return Err(Error::validation("Amount must be greater than zero."));
        }

        Ok(amount)
    }

    /// Parses a user-entered amount that may be zero, such as an opening balance.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if the input is empty, is not a number, is negative,
    /// or has more than two decimal places.
    pub fn parse_non_negative(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::validation("Please enter an amount."));
        }

        let value = Decimal::from_str(trimmed)
            .map_err(|_| Error::validation("Please enter a valid amount."))?;
        let amount = Self::from_decimal(value)?;
        if amount.0 < 0 {
            return Err(Error::validation("Amount cannot be negative."));
        }

        Ok(amount)
    }

    /// Renders the amount with the currency symbol, e.g. `₱250.00`.
    #[must_use]
    pub fn display_with_symbol(self) -> String {
        format!("{CURRENCY_SYMBOL}{self}")
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl FromStr for Money {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::ErrorCategory;

    #[test]
    fn test_parse_valid_amounts() {
        assert_eq!(Money::parse("250").unwrap(), Money::from_minor(25_000));
        assert_eq!(Money::parse("250.5").unwrap(), Money::from_minor(25_050));
        assert_eq!(Money::parse(" 0.01 ").unwrap(), Money::from_minor(1));
        assert_eq!(Money::parse("1000.00").unwrap(), Money::from_major(1000));
        // Trailing zeros past the second place carry no extra precision
        assert_eq!(Money::parse("1.500").unwrap(), Money::from_minor(150));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        for input in ["", "   ", "abc", "12,50", "0", "0.00", "-5", "1.005", "NaN", "inf"] {
            let err = Money::parse(input).unwrap_err();
            assert_eq!(
                err.category(),
                ErrorCategory::Validation,
                "input {input:?} should be a validation error"
            );
        }
    }

    #[test]
    fn test_parse_non_negative_accepts_zero() {
        assert_eq!(Money::parse_non_negative("0").unwrap(), Money::ZERO);
        assert_eq!(Money::parse_non_negative("12.30").unwrap(), Money::from_minor(1_230));
        assert!(Money::parse_non_negative("-0.01").is_err());
        assert!(Money::parse_non_negative("").is_err());
    }

    #[test]
    fn test_display_always_has_two_decimals() {
        assert_eq!(Money::from_major(750).to_string(), "750.00");
        assert_eq!(Money::from_minor(5).to_string(), "0.05");
        assert_eq!(Money::ZERO.to_string(), "0.00");
        assert_eq!(Money::from_minor(12_345).display_with_symbol(), "₱123.45");
    }

    #[test]
    fn test_arithmetic_is_exact() {
        let a = Money::parse("0.10").unwrap();
        let b = Money::parse("0.20").unwrap();
        assert_eq!(a.checked_add(b).unwrap(), Money::parse("0.30").unwrap());
        assert_eq!(
            Money::from_major(1000).checked_sub(Money::parse("250").unwrap()),
            Some(Money::from_major(750))
        );
        assert_eq!(Money::from_minor(i64::MAX).checked_add(Money::from_minor(1)), None);
    }
}
