// 💰 Money - amounts as integer cents
//
// All amounts (expenses, budgets, limits, projections) go through this type so
// that sums are exact and an inserted amount reads back to the cent.

use crate::error::{Result, TrackerError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest single expense accepted (one trillion units)
    pub const MAX_EXPENSE: Money = Money(100_000_000_000_000);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Whole units, e.g. `Money::from_units(5000)` is 5000.00
    pub const fn from_units(units: i64) -> Self {
        Money(units * 100)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Rounded to whole units, for short human-readable messages
    pub fn whole_units(self) -> i64 {
        let abs = self.0.unsigned_abs();
        // u64::MAX / 100 + 1 still fits in i64
        let rounded = (abs / 100 + u64::from(abs % 100 >= 50)) as i64;
        if self.0 < 0 {
            -rounded
        } else {
            rounded
        }
    }

    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// `max(0, self - other)`
    pub fn saturating_excess_over(self, other: Money) -> Money {
        if self.0 > other.0 {
            Money(self.0.saturating_sub(other.0))
        } else {
            Money::ZERO
        }
    }

    /// Parse user input as an expense amount (see `expense_amount`)
    pub fn parse_positive(raw: &str) -> Result<Money> {
        raw.parse::<Money>()?.expense_amount()
    }

    /// `self` if it is a valid expense amount: above zero, at most `MAX_EXPENSE`
    pub fn expense_amount(self) -> Result<Money> {
        if !self.is_positive() {
            return Err(TrackerError::InvalidAmount(format!("{} must be greater than zero", self)));
        }
        if self > Money::MAX_EXPENSE {
            return Err(TrackerError::InvalidAmount(format!(
                "{} is above the maximum of {}",
                self,
                Money::MAX_EXPENSE
            )));
        }
        Ok(self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

// Operators saturate at the i64 range; use `checked_add` where the result
// decides something.
impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl FromStr for Money {
    type Err = TrackerError;

    /// Decimal string with `.` or `,` separator, optional sign, at most two
    /// fractional digits. `"5000.0"` (how older settings were written) is fine.
    fn from_str(s: &str) -> Result<Money> {
        let invalid = |why: &str| TrackerError::InvalidAmount(format!("{:?}: {}", s, why));

        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        if digits.is_empty() {
            return Err(invalid("empty amount"));
        }

        let normalized = digits.replace(',', ".");
        let (units_str, frac_str) = match normalized.split_once('.') {
            Some((u, f)) => (u, f),
            None => (normalized.as_str(), ""),
        };

        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("not a number"));
        }
        if !frac_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("not a number"));
        }

        let frac_cents: i64 = match frac_str.len() {
            0 => 0,
            1 => frac_str.parse::<i64>().map_err(|_| invalid("not a number"))? * 10,
            2 => frac_str.parse::<i64>().map_err(|_| invalid("not a number"))?,
            _ => return Err(invalid("more than two decimals")),
        };

        let units: i64 = units_str.parse().map_err(|_| invalid("too large"))?;
        let cents = units
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac_cents))
            .ok_or_else(|| invalid("too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}
