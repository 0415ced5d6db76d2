// 🗄️ Record Store - expenses + key/value settings in SQLite
//
// The policy engine only talks to the `RecordStore` trait. `SqliteStore` is the
// shipped implementation; every call is one atomic SQLite statement.

use crate::error::{Result, TrackerError};
use crate::expense::{Category, Expense, NewExpense, YearMonth, DATE_FORMAT};
use crate::money::Money;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::{debug, info};

// ============================================================================
// QUERY FILTER
// ============================================================================

/// Optional filters for `query_expenses`; `None` fields do not filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    /// Inclusive
    pub from_date: Option<NaiveDate>,
    /// Inclusive
    pub to_date: Option<NaiveDate>,
    pub category: Option<Category>,
}

impl ExpenseFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn month(month: YearMonth) -> Self {
        let from_date = month.first_day();
        let to_date = month.next().first_day().and_then(|d| d.pred_opt());
        ExpenseFilter {
            from_date,
            to_date,
            category: None,
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }
}

// ============================================================================
// STORE CONTRACT
// ============================================================================

/// Everything the core needs from persistence
pub trait RecordStore {
    fn insert_expense(&self, expense: &NewExpense) -> Result<i64>;

    /// Returns false when no expense had that id
    fn delete_expense(&self, id: i64) -> Result<bool>;

    /// Ordered by id (insertion order)
    fn query_expenses(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>>;

    /// Month-to-date sum, optionally for one category. Zero when nothing matches.
    fn sum_expenses(&self, month: YearMonth, category: Option<&Category>) -> Result<Money>;

    /// Per-category sums for a month, largest first
    fn category_totals(&self, month: YearMonth) -> Result<Vec<(Category, Money)>>;

    /// Sums of the most recent `limit` months that have expenses, newest first
    fn monthly_totals(&self, limit: usize) -> Result<Vec<(YearMonth, Money)>>;

    fn get_setting(&self, key: &str) -> Result<Option<String>>;

    fn set_setting(&self, key: &str, value: &str) -> Result<()>;

    fn remove_setting(&self, key: &str) -> Result<()>;

    /// All settings whose key starts with `prefix`, in store enumeration order
    fn settings_with_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>>;
}

// ============================================================================
// SQLITE IMPLEMENTATION
// ============================================================================

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a database file and make sure the schema exists
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        // Crash recovery for file-backed stores
        conn.pragma_update(None, "journal_mode", "WAL")?;
        setup_database(&conn)?;
        info!(path = %path.as_ref().display(), "record store opened");
        Ok(SqliteStore { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        setup_database(&conn)?;
        Ok(SqliteStore { conn })
    }

}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // ==========================================================================
    // Expenses Table
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount_cents INTEGER NOT NULL CHECK (amount_cents > 0),
            category TEXT NOT NULL,
            description TEXT,
            date TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Settings Table (flat key/value)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date)",
        [],
    )?;

    Ok(())
}

fn row_to_expense(row: &Row<'_>) -> rusqlite::Result<(i64, i64, String, Option<String>, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn expense_from_columns(
    (id, cents, category, description, date): (i64, i64, String, Option<String>, String),
) -> Result<Expense> {
    let category = category
        .parse::<Category>()
        .map_err(|_| TrackerError::StoreUnavailable(format!("expense {} has an empty category", id)))?;
    let date = NaiveDate::parse_from_str(&date, DATE_FORMAT).map_err(|_| {
        TrackerError::StoreUnavailable(format!("expense {} has an unreadable date {:?}", id, date))
    })?;

    Ok(Expense {
        id,
        amount: Money::from_cents(cents),
        category,
        description,
        date,
    })
}

impl RecordStore for SqliteStore {
    fn insert_expense(&self, expense: &NewExpense) -> Result<i64> {
        // a blank name could never be read back
        if expense.category.name().trim().is_empty() {
            return Err(TrackerError::InvalidCategory("category must not be empty".to_string()));
        }
        self.conn.execute(
            "INSERT INTO expenses (amount_cents, category, description, date)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                expense.amount.cents(),
                expense.category.name(),
                expense.description,
                expense.date.format(DATE_FORMAT).to_string(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        info!(id, amount = %expense.amount, category = %expense.category, "expense inserted");
        Ok(id)
    }

    fn delete_expense(&self, id: i64) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM expenses WHERE id = ?1", params![id])?;

        if removed > 0 {
            info!(id, "expense deleted");
        } else {
            debug!(id, "delete requested for unknown expense");
        }
        Ok(removed > 0)
    }

    fn query_expenses(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>> {
        let mut sql = String::from(
            "SELECT id, amount_cents, category, description, date FROM expenses WHERE 1=1",
        );
        let mut args: Vec<String> = Vec::new();

        if let Some(from) = filter.from_date {
            sql.push_str(" AND date >= ?");
            args.push(from.format(DATE_FORMAT).to_string());
        }
        if let Some(to) = filter.to_date {
            sql.push_str(" AND date <= ?");
            args.push(to.format(DATE_FORMAT).to_string());
        }
        if let Some(category) = &filter.category {
            sql.push_str(" AND category = ?");
            args.push(category.name().to_string());
        }
        sql.push_str(" ORDER BY id");

        debug!(?filter, "querying expenses");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(args.iter()), row_to_expense)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(expense_from_columns).collect()
    }

    fn sum_expenses(&self, month: YearMonth, category: Option<&Category>) -> Result<Money> {
        let key = month.to_string();
        let total: Option<i64> = match category {
            Some(category) => self.conn.query_row(
                "SELECT SUM(amount_cents) FROM expenses
                 WHERE strftime('%Y-%m', date) = ?1 AND category = ?2",
                params![key, category.name()],
                |row| row.get(0),
            )?,
            None => self.conn.query_row(
                "SELECT SUM(amount_cents) FROM expenses WHERE strftime('%Y-%m', date) = ?1",
                params![key],
                |row| row.get(0),
            )?,
        };

        let total = Money::from_cents(total.unwrap_or(0));
        debug!(month = %key, category = ?category.map(Category::name), %total, "month sum");
        Ok(total)
    }

    fn category_totals(&self, month: YearMonth) -> Result<Vec<(Category, Money)>> {
        let mut stmt = self.conn.prepare(
            "SELECT category, SUM(amount_cents) AS total
             FROM expenses
             WHERE strftime('%Y-%m', date) = ?1
             GROUP BY category
             ORDER BY total DESC",
        )?;

        let rows = stmt
            .query_map(params![month.to_string()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(name, cents)| -> Result<(Category, Money)> {
                Ok((name.parse()?, Money::from_cents(cents)))
            })
            .collect()
    }

    fn monthly_totals(&self, limit: usize) -> Result<Vec<(YearMonth, Money)>> {
        let mut stmt = self.conn.prepare(
            "SELECT strftime('%Y-%m', date) AS month, SUM(amount_cents)
             FROM expenses
             GROUP BY month
             ORDER BY month DESC
             LIMIT ?1",
        )?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(month, cents)| -> Result<(YearMonth, Money)> {
                Ok((month.parse()?, Money::from_cents(cents)))
            })
            .collect()
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let value: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.flatten())
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        debug!(key, value, "setting stored");
        Ok(())
    }

    fn remove_setting(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn settings_with_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        // substr instead of LIKE: `_` is a LIKE wildcard and category names are free text
        let mut stmt = self.conn.prepare(
            "SELECT key, value FROM settings
             WHERE substr(key, 1, length(?1)) = ?1 AND value IS NOT NULL
             ORDER BY rowid",
        )?;

        let rows = stmt
            .query_map(params![prefix], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}
