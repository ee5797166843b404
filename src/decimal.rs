//! Monetary amount with exactly two decimal places.
//!
//! Uses `rust_decimal` internally with scale enforcement so the serialized
//! form of field 54 never depends on floating-point formatting or locale.

use crate::error::{PixError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::str::FromStr;

/// A non-negative amount that always serializes with two fraction digits.
///
/// The `Display` output is the canonical value of the Transaction Amount
/// field, and its character count is that field's length prefix.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use pix_payload::Amount;
///
/// let amount = Amount::from_str("15,5").unwrap();
/// assert_eq!(amount.to_string(), "15.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// The number of decimal places to maintain.
    pub const SCALE: u32 = 2;

    /// EMV caps the Transaction Amount field at 13 characters.
    pub const MAX_LEN: usize = 13;

    /// Zero value.
    pub const ZERO: Self = Amount(Decimal::ZERO);

    /// Creates an `Amount` from a `Decimal`, rounding half away from zero to
    /// two places.
    ///
    /// Fails with `Validation` for negative values or values whose canonical
    /// form exceeds [`Amount::MAX_LEN`].
    pub fn new(value: Decimal) -> Result<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(PixError::validation(
                "amount",
                format!("{} is negative", value),
            ));
        }

        let mut normalized =
            value.round_dp_with_strategy(Self::SCALE, RoundingStrategy::MidpointAwayFromZero);
        normalized.rescale(Self::SCALE);
        normalized.set_sign_positive(true);

        let amount = Amount(normalized);
        let len = amount.to_string().len();
        if len > Self::MAX_LEN {
            return Err(PixError::validation(
                "amount",
                format!("{} characters exceeds maximum of {}", len, Self::MAX_LEN),
            ));
        }
        Ok(amount)
    }

    /// Creates an amount from integer cents.
    pub fn from_cents(cents: u64) -> Result<Self> {
        Self::new(Decimal::from_i128_with_scale(i128::from(cents), Self::SCALE))
    }

    /// Returns the underlying decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Returns `true` if this value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl FromStr for Amount {
    type Err = PixError;

    /// Accepts `.` or `,` as the decimal separator.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PixError::validation("amount", "must not be empty"));
        }
        let decimal = Decimal::from_str(&trimmed.replace(',', "."))
            .map_err(|e| PixError::validation("amount", format!("{:?} is not numeric: {}", s, e)))?;
        Amount::new(decimal)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
