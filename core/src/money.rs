//! Store prices and discounts.
//!
//! Prices are held as whole cents so that discount arithmetic never drifts.
//! A store entry keeps only its current (discounted) price and its discount,
//! so the undiscounted price is recovered with [`find_original_price`]
//! whenever the discount changes.
//!
//! # Examples
//!
//! ```
//! use closetly_core::{Discount, Price, discounted_price, find_original_price};
//!
//! let shelf = Price::parse("$20.00").unwrap();
//! let original = find_original_price(shelf, Discount::NONE).unwrap();
//! let half_off = discounted_price(original, Discount::new(50).unwrap()).unwrap();
//! assert_eq!(half_off.to_string(), "$10.00");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

/// An amount of money in cents, between zero and [`Price::MAX_CENTS`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct Price(i64);

impl Price {
    /// Largest representable price: ten billion dollars.
    pub const MAX_CENTS: i64 = 1_000_000_000_000;

    /// Builds a price from whole cents, rejecting negative or oversized
    /// amounts.
    pub fn new(cents: i64) -> Result<Self, ValidationError> {
        if !(0..=Self::MAX_CENTS).contains(&cents) {
            return Err(ValidationError::InvalidPrice(cents.to_string()));
        }
        Ok(Self(cents))
    }

    /// Builds a price from whole cents, clamping into the valid range.
    pub fn from_cents(cents: i64) -> Self {
        Self(cents.clamp(0, Self::MAX_CENTS))
    }

    /// Returns the price in cents.
    pub fn cents(self) -> i64 {
        self.0
    }

    /// Parses a dollar amount such as `12`, `12.5`, `12.50` or `$12.50`.
    ///
    /// At most two fractional digits are accepted; negative amounts are
    /// rejected.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidPrice(raw.trim().to_string());
        let trimmed = raw.trim();
        let digits = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();
        if digits.is_empty() {
            return Err(invalid());
        }

        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };
        if fraction.len() > 2
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
            || (whole.is_empty() && fraction.is_empty())
        {
            return Err(invalid());
        }

        let dollars: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };
        let total = dollars
            .checked_mul(100)
            .and_then(|d| d.checked_add(cents))
            .ok_or_else(invalid)?;
        Self::new(total).map_err(|_| invalid())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Price {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<i64> for Price {
    type Error = ValidationError;

    fn try_from(cents: i64) -> Result<Self, Self::Error> {
        Self::new(cents)
    }
}

impl From<Price> for i64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

/// A whole-percent discount in `0..=99`.
///
/// 100% is not representable: a free item's original price could never be
/// recovered from its stored price.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Discount(u8);

impl Discount {
    /// No discount.
    pub const NONE: Self = Self(0);

    /// Largest accepted discount, in percent.
    pub const MAX_PERCENT: u8 = 99;

    pub fn new(percent: u8) -> Result<Self, ValidationError> {
        if percent > Self::MAX_PERCENT {
            return Err(ValidationError::InvalidDiscount(percent.to_string()));
        }
        Ok(Self(percent))
    }

    /// Parses `"50"` or `"50%"`.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        let digits = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
        let percent: u8 = digits
            .parse()
            .map_err(|_| ValidationError::InvalidDiscount(trimmed.to_string()))?;
        Self::new(percent)
    }

    pub fn percent(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Discount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl FromStr for Discount {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<u8> for Discount {
    type Error = ValidationError;

    fn try_from(percent: u8) -> Result<Self, Self::Error> {
        Self::new(percent)
    }
}

impl From<Discount> for u8 {
    fn from(discount: Discount) -> Self {
        discount.0
    }
}

/// Divides with round-half-up; both operands are non-negative.
fn div_round(numerator: i128, denominator: i128) -> i128 {
    (numerator + denominator / 2) / denominator
}

fn checked_price(cents: i128) -> Result<Price, ValidationError> {
    i64::try_from(cents)
        .map_err(|_| ValidationError::InvalidPrice(cents.to_string()))
        .and_then(Price::new)
}

/// Recovers the undiscounted price from a shelf price and its discount.
///
/// Fails if the recovered price would exceed [`Price::MAX_CENTS`].
pub fn find_original_price(price: Price, discount: Discount) -> Result<Price, ValidationError> {
    let remaining = 100 - i128::from(discount.percent());
    checked_price(div_round(i128::from(price.cents()) * 100, remaining))
}

/// Applies `discount` to an undiscounted price, rounding to the cent.
pub fn discounted_price(original: Price, discount: Discount) -> Result<Price, ValidationError> {
    let remaining = 100 - i128::from(discount.percent());
    checked_price(div_round(i128::from(original.cents()) * remaining, 100))
}
