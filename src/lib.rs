// Expense Tracker - Core Library
// Exposes all modules for use in the CLI, the TUI, and tests

pub mod config;
pub mod db;
pub mod error;
pub mod expense;
pub mod export;
pub mod money;
pub mod policy;  // Budget / limit enforcement, projection, advice
pub mod reports; // Budget bar, category pie, trend data

// Re-export commonly used types
pub use config::{AppConfig, DatabaseConfig};
pub use db::{setup_database, ExpenseFilter, RecordStore, SqliteStore};
pub use error::{Result, TrackerError};
pub use expense::{parse_date, Category, Expense, NewExpense, YearMonth, DATE_FORMAT};
pub use export::{export_expenses, ExportFormat};
pub use money::Money;
pub use policy::{
    Confirm, Decision, Decline, PolicyConfig, PolicyEngine, Proceed, Prompt, RejectReason,
    Submission, Suggestion,
};
pub use reports::{budget_status, category_breakdown, monthly_trend, BudgetStatus, CategoryShare};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
