// 🧾 Expense Model - expenses, categories and calendar months
//
// An expense is immutable once stored: it can only be created (after the
// policy check approves it) or deleted by id.

use crate::error::{Result, TrackerError};
use crate::money::Money;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Storage and display format of expense dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// CATEGORY
// ============================================================================

/// Expense category: the fixed list offered by the entry form, plus free text
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Food,
    Travel,
    Shopping,
    Bills,
    Medical,
    Trip,
    Dress,
    Cosmetics,
    JunkFood,
    Other,
    /// Any name outside the fixed list. Build through `parse` or `canonical`
    /// so that a builtin name never ends up here.
    Custom(String),
}

impl Category {
    /// The fixed list, in form order
    pub const BUILTIN: [Category; 10] = [
        Category::Food,
        Category::Travel,
        Category::Shopping,
        Category::Bills,
        Category::Medical,
        Category::Trip,
        Category::Dress,
        Category::Cosmetics,
        Category::JunkFood,
        Category::Other,
    ];

    pub fn name(&self) -> &str {
        match self {
            Category::Food => "Food",
            Category::Travel => "Travel",
            Category::Shopping => "Shopping",
            Category::Bills => "Bills",
            Category::Medical => "Medical",
            Category::Trip => "Trip",
            Category::Dress => "Dress",
            Category::Cosmetics => "Cosmetics",
            Category::JunkFood => "JunkFood",
            Category::Other => "Other",
            Category::Custom(name) => name,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Category::Custom(_))
    }

    /// Trimmed, with builtin names folded back into their variant, so
    /// `Custom("JunkFood")` and `Custom(" Food")` compare equal to the
    /// builtins the store will match them against. Blank names fail.
    pub fn canonical(&self) -> Result<Category> {
        self.name().parse()
    }
}

impl FromStr for Category {
    type Err = TrackerError;

    /// Exact (case-sensitive) match against the fixed list, else `Custom`.
    /// Blank names are rejected.
    fn from_str(s: &str) -> Result<Category> {
        let name = s.trim();
        if name.is_empty() {
            return Err(TrackerError::InvalidCategory("category must not be empty".to_string()));
        }

        Ok(Category::BUILTIN
            .iter()
            .find(|c| c.name() == name)
            .cloned()
            .unwrap_or_else(|| Category::Custom(name.to_string())))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Category {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// YEAR-MONTH
// ============================================================================

/// A calendar month; the unit every aggregate is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Month must be 1-12 and the year representable as a calendar date
    pub fn new(year: i32, month: u32) -> Result<YearMonth> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(TrackerError::InvalidDate(format!("{}-{:02} is not a calendar month", year, month)));
        }
        Ok(YearMonth { year, month })
    }

    pub fn of(date: NaiveDate) -> YearMonth {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn days_in_month(&self) -> u32 {
        let next = self.next();
        match (self.first_day(), next.first_day()) {
            (Some(first), Some(next_first)) => (next_first - first).num_days() as u32,
            // December of the last representable year
            _ => 31,
        }
    }

    pub fn next(&self) -> YearMonth {
        if self.month == 12 {
            YearMonth { year: self.year + 1, month: 1 }
        } else {
            YearMonth { year: self.year, month: self.month + 1 }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    /// `YYYY-MM`, the same key SQLite's `strftime('%Y-%m', date)` produces
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<YearMonth> {
        let invalid = || TrackerError::InvalidDate(format!("{:?} is not YYYY-MM", s));
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        YearMonth::new(year, month)
    }
}

/// Parse an ISO `YYYY-MM-DD` date, rejecting anything that is not a real day
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|e| TrackerError::InvalidDate(format!("{:?}: {} (expected YYYY-MM-DD)", raw, e)))
}

// ============================================================================
// EXPENSE
// ============================================================================

/// A stored expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Store-assigned, monotonic
    pub id: i64,
    pub amount: Money,
    pub category: Category,
    pub description: Option<String>,
    pub date: NaiveDate,
}

impl Expense {
    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

/// A validated expense that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    pub amount: Money,
    pub category: Category,
    pub description: Option<String>,
    pub date: NaiveDate,
}

impl NewExpense {
    /// Validates the amount, a non-blank category (stored in canonical form)
    /// and a real calendar date. Blank descriptions become `None`.
    pub fn new(amount: Money, category: Category, description: Option<&str>, date: &str) -> Result<NewExpense> {
        let amount = amount.expense_amount()?;
        let category = category.canonical()?;
        let date = parse_date(date)?;
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Ok(NewExpense {
            amount,
            category,
            description,
            date,
        })
    }
}
