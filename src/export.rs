// 📤 Export - expense lists to CSV / JSON files

use crate::error::{Result, TrackerError};
use crate::expense::Expense;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Guess from the file extension; anything unknown is CSV
    pub fn from_path(path: &Path) -> ExportFormat {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
            _ => ExportFormat::Csv,
        }
    }
}

/// Flat row with the column names of the exported sheet
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "ID")]
    id: i64,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "Category")]
    category: &'a str,
    #[serde(rename = "Description")]
    description: &'a str,
    #[serde(rename = "Date")]
    date: String,
}

impl<'a> From<&'a Expense> for ExportRow<'a> {
    fn from(expense: &'a Expense) -> Self {
        ExportRow {
            id: expense.id,
            amount: expense.amount.to_string(),
            category: expense.category.name(),
            description: expense.description.as_deref().unwrap_or(""),
            date: expense.date_string(),
        }
    }
}

pub fn write_csv<W: Write>(writer: W, expenses: &[Expense]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for expense in expenses {
        wtr.serialize(ExportRow::from(expense))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(writer: W, expenses: &[Expense]) -> Result<()> {
    serde_json::to_writer_pretty(writer, expenses)?;
    Ok(())
}

/// Write `expenses` to `path`. Refuses an empty list.
pub fn export_expenses(expenses: &[Expense], path: &Path, format: ExportFormat) -> Result<usize> {
    if expenses.is_empty() {
        return Err(TrackerError::Export("no expenses to export".to_string()));
    }

    let file = BufWriter::new(File::create(path)?);
    match format {
        ExportFormat::Csv => write_csv(file, expenses)?,
        ExportFormat::Json => write_json(file, expenses)?,
    }

    info!(path = %path.display(), rows = expenses.len(), ?format, "expenses exported");
    Ok(expenses.len())
}
