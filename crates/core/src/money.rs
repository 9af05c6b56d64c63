//! Minor-unit money: integer cents, no floating point.
//!
//! All amount arithmetic stays in signed 64-bit minor units; conversion to and
//! from display decimals happens only at this codec boundary, rounding half-up
//! at two decimal places.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// An amount of money in minor currency units (e.g. cents).
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, rhs: Money) -> DomainResult<Money> {
        self.0
            .checked_add(rhs.0)
            .map(Money)
            .ok_or_else(|| DomainError::invariant("money addition overflow"))
    }

    pub fn checked_sub(self, rhs: Money) -> DomainResult<Money> {
        self.0
            .checked_sub(rhs.0)
            .map(Money)
            .ok_or_else(|| DomainError::invariant("money subtraction overflow"))
    }

    /// Line total: unit amount times quantity, widened to i128 internally.
    pub fn checked_mul_quantity(self, quantity: u64) -> DomainResult<Money> {
        let total = (self.0 as i128) * (quantity as i128);
        i64::try_from(total)
            .map(Money)
            .map_err(|_| DomainError::invariant("money multiplication overflow"))
    }

    /// Saturating sum, for report aggregation over untrusted input sizes.
    pub fn saturating_add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }

    pub fn saturating_mul_quantity(self, quantity: u64) -> Money {
        let total = (self.0 as i128) * (quantity as i128);
        let clamped = total.clamp(i64::MIN as i128, i64::MAX as i128);
        Money(clamped as i64)
    }

    pub fn saturating_sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }

    /// Parse a decimal string (e.g. `"12.34"`, `"-0.5"`) into minor units,
    /// rounding half-up at two decimal places.
    pub fn parse_decimal(input: &str) -> DomainResult<Money> {
        let trimmed = input.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (whole, frac) = match unsigned.split_once('.') {
            Some((w, f)) => (w, f),
            None => (unsigned, ""),
        };

        let malformed = || DomainError::validation(format!("not a decimal amount: {input:?}"));

        if whole.is_empty() && frac.is_empty() {
            return Err(malformed());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        let units: i128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| malformed())?
        };

        let mut cents = units
            .checked_mul(100)
            .ok_or_else(|| DomainError::validation("amount out of range"))?;

        let mut digits = frac.bytes().map(|b| (b - b'0') as i128);
        cents += digits.next().unwrap_or(0) * 10;
        cents += digits.next().unwrap_or(0);
        // Half-up on the third decimal digit.
        if digits.next().is_some_and(|d| d >= 5) {
            cents += 1;
        }

        let signed = if negative { -cents } else { cents };
        i64::try_from(signed)
            .map(Money)
            .map_err(|_| DomainError::validation("amount out of range"))
    }

    /// Render as a decimal string with exactly two fraction digits.
    pub fn to_decimal_string(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl ValueObject for Money {}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_decimals() {
        assert_eq!(Money::parse_decimal("12.34").unwrap(), Money::from_minor(1234));
        assert_eq!(Money::parse_decimal("0.05").unwrap(), Money::from_minor(5));
        assert_eq!(Money::parse_decimal("7").unwrap(), Money::from_minor(700));
        assert_eq!(Money::parse_decimal(".5").unwrap(), Money::from_minor(50));
        assert_eq!(Money::parse_decimal("-3.10").unwrap(), Money::from_minor(-310));
    }

    #[test]
    fn rounds_half_up_at_two_places() {
        assert_eq!(Money::parse_decimal("12.344").unwrap(), Money::from_minor(1234));
        assert_eq!(Money::parse_decimal("12.345").unwrap(), Money::from_minor(1235));
        assert_eq!(Money::parse_decimal("12.349").unwrap(), Money::from_minor(1235));
        assert_eq!(Money::parse_decimal("0.005").unwrap(), Money::from_minor(1));
    }

    #[test]
    fn rejects_malformed_amounts() {
        for bad in ["", ".", "12,34", "1.2.3", "abc", "--1"] {
            assert!(Money::parse_decimal(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn renders_two_fraction_digits() {
        assert_eq!(Money::from_minor(1234).to_decimal_string(), "12.34");
        assert_eq!(Money::from_minor(5).to_decimal_string(), "0.05");
        assert_eq!(Money::from_minor(-310).to_decimal_string(), "-3.10");
        assert_eq!(Money::ZERO.to_decimal_string(), "0.00");
    }

    #[test]
    fn decimal_round_trip() {
        for minor in [0_i64, 1, 99, 100, 12_345, -12_345, i64::MAX / 100] {
            let money = Money::from_minor(minor);
            assert_eq!(Money::parse_decimal(&money.to_decimal_string()).unwrap(), money);
        }
    }

    #[test]
    fn checked_arithmetic_reports_overflow() {
        let max = Money::from_minor(i64::MAX);
        assert!(max.checked_add(Money::from_minor(1)).is_err());
        assert!(max.checked_mul_quantity(2).is_err());
        assert_eq!(max.saturating_add(Money::from_minor(1)), max);
    }

    #[test]
    fn line_total_uses_wide_intermediate() {
        let price = Money::from_minor(1_000);
        assert_eq!(price.checked_mul_quantity(4).unwrap(), Money::from_minor(4_000));
    }
}
