// ⚠️ Tracker Errors - one error type for the whole library
//
// Every failure is terminal for the current user action and is surfaced to
// the caller as-is. Nothing in the library retries.

use thiserror::Error;

/// Library-wide result alias
pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Error, Debug, PartialEq)]
pub enum TrackerError {
    /// Amount is non-positive, non-numeric, or has more than two decimals
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Date fails calendar validation or has no year/month
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    /// A stored setting could not be interpreted (e.g. `limit_Food = "abc"`)
    #[error("Setting \"{key}\" holds an unreadable value \"{value}\"")]
    CorruptSetting { key: String, value: String },

    /// Underlying store read/write failed
    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Export failed: {0}")]
    Export(String),
}

impl From<rusqlite::Error> for TrackerError {
    fn from(err: rusqlite::Error) -> Self {
        TrackerError::StoreUnavailable(err.to_string())
    }
}

impl From<csv::Error> for TrackerError {
    fn from(err: csv::Error) -> Self {
        TrackerError::Export(err.to_string())
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Export(err.to_string())
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        TrackerError::Export(err.to_string())
    }
}

impl TrackerError {
    /// True for the input-validation kinds that must fail before any query
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TrackerError::InvalidAmount(_)
                | TrackerError::InvalidDate(_)
                | TrackerError::InvalidCategory(_)
        )
    }
}
