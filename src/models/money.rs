//! Money type for representing currency amounts
//!
//! Internally stores amounts in cents (i64) to avoid floating-point drift when
//! summing transactions. On the wire an amount is a plain decimal number of
//! dollars (`12.5`), which is what the finance backend sends. Records keep
//! that number as sent; `Money` is the view used for arithmetic.
//!
//! Arithmetic saturates at the bounds of the cent range instead of
//! overflowing.

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Largest dollar magnitude that converts to cents without leaving `i64`
const MAX_CENTS: f64 = i64::MAX as f64;

/// A monetary amount stored as cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Money(i64);

impl Money {
    /// Create a Money amount from cents
    ///
    /// # Examples
    /// ```
    /// use finance_store::models::Money;
    /// let amount = Money::from_cents(1050); // $10.50
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a Money amount from a dollar value, rounding to the nearest cent
    ///
    /// # Examples
    /// ```
    /// use finance_store::models::Money;
    /// assert_eq!(Money::from_dollars(10.5).unwrap().cents(), 1050);
    /// ```
    ///
    /// # Errors
    ///
    /// Fails for NaN, infinities and amounts whose cents do not fit in `i64`.
    pub fn from_dollars(dollars: f64) -> Result<Self, MoneyError> {
        if !dollars.is_finite() {
            return Err(MoneyError::NotFinite);
        }
        let cents = (dollars * 100.0).round();
        if cents < -MAX_CENTS || cents >= MAX_CENTS {
            return Err(MoneyError::OutOfRange(dollars));
        }
        Ok(Self(cents as i64))
    }

    /// Read a JSON number of dollars
    ///
    /// Integers convert exactly; fractional amounts round to the nearest cent.
    pub fn from_number(number: &Number) -> Result<Self, MoneyError> {
        if let Some(dollars) = number.as_i64() {
            return dollars
                .checked_mul(100)
                .map(Self)
                .ok_or(MoneyError::OutOfRange(dollars as f64));
        }
        match number.as_f64() {
            Some(dollars) => Self::from_dollars(dollars),
            None => Err(MoneyError::NotFinite),
        }
    }

    /// The amount as a JSON number of dollars
    pub fn to_number(self) -> Number {
        Number::from_f64(self.as_dollars()).unwrap_or_else(|| Number::from(self.dollars()))
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in cents
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Get the amount as a dollar value
    pub fn as_dollars(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Get the whole dollars portion (truncated toward zero)
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Get the cents portion (0-99)
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Get the absolute value
    pub const fn abs(&self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// Format with a currency symbol
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        if self.is_negative() {
            format!(
                "-{}{}.{:02}",
                symbol,
                self.dollars().abs(),
                self.cents_part()
            )
        } else {
            format!("{}{}.{:02}", symbol, self.dollars(), self.cents_part())
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with_symbol("$"))
    }
}

impl TryFrom<f64> for Money {
    type Error = MoneyError;

    fn try_from(dollars: f64) -> Result<Self, Self::Error> {
        Self::from_dollars(dollars)
    }
}

impl From<Money> for f64 {
    fn from(money: Money) -> Self {
        money.as_dollars()
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// A dollar amount that cannot be held as cents
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoneyError {
    NotFinite,
    OutOfRange(f64),
}

impl fmt::Display for MoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyError::NotFinite => write!(f, "Money amount must be a finite number"),
            MoneyError::OutOfRange(dollars) => {
                write!(f, "Money amount {} is out of range", dollars)
            }
        }
    }
}

impl std::error::Error for MoneyError {}
