//! Exact monetary amounts in integer minor units.
//!
//! Prices, fees and totals are never held in binary floating point. A `Money`
//! is a non-negative count of cents, parsed from and displayed as a decimal with
//! two fraction digits (`"25.99"` is 2599 cents).

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Non-negative amount in the smallest currency unit (cents).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl ValueObject for Money {}

const MINOR_PER_MAJOR: u64 = 100;

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Whole currency units, e.g. `from_major(5)` is 5.00.
    pub const fn from_major(units: u64) -> Self {
        Self(units * MINOR_PER_MAJOR)
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_mul(self, quantity: u32) -> Option<Money> {
        self.0.checked_mul(u64::from(quantity)).map(Money)
    }

    /// Difference clamped at zero.
    pub fn saturating_sub(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0))
    }

    /// Parse a user-entered amount, reporting failures against `field`.
    pub fn parse_field(field: &'static str, input: &str) -> DomainResult<Money> {
        parse_amount(input.trim()).map_err(|msg| DomainError::validation(field, msg))
    }
}

fn parse_amount(s: &str) -> Result<Money, &'static str> {
    if s.is_empty() {
        return Err("amount is required");
    }
    if s.starts_with('-') {
        return Err("amount cannot be negative");
    }

    let (whole, fraction) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err("amount must be a decimal number");
    }
    if s.contains('.') && fraction.is_empty() {
        return Err("amount must be a decimal number");
    }
    if fraction.len() > 2 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err("amount supports at most two decimal places");
    }

    let whole: u64 = whole.parse().map_err(|_| "amount is too large")?;
    let mut minor: u64 = 0;
    for (i, digit) in fraction.bytes().enumerate() {
        let scale = if i == 0 { 10 } else { 1 };
        minor += u64::from(digit - b'0') * scale;
    }

    whole
        .checked_mul(MINOR_PER_MAJOR)
        .and_then(|c| c.checked_add(minor))
        .map(Money)
        .ok_or("amount is too large")
}

impl FromStr for Money {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse_field("amount", s)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / MINOR_PER_MAJOR, self.0 % MINOR_PER_MAJOR)
    }
}
