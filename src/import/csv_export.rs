use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tracing::info;

use super::CSV_COLUMNS;
use crate::auth::Session;
use crate::models::{Expense, MonthKey};
use crate::store::{ExpenseFilter, Store};

/// Write expenses as CSV with a header row, in the order given.
pub(crate) fn write_expenses<W: Write>(writer: W, expenses: &[Expense]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_COLUMNS)
        .context("Failed to write CSV header")?;
    for e in expenses {
        let id = e.id.as_ref().map(|id| id.as_str()).unwrap_or("");
        let dt = e.date.format("%Y-%m-%d").to_string();
        let amount = e.amount.to_string();
        wtr.write_record([
            id,
            dt.as_str(),
            e.category.as_str(),
            e.description.as_str(),
            amount.as_str(),
            e.payment.as_str(),
        ])
        .context("Failed to write CSV record")?;
    }
    wtr.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Export the owner's expenses, optionally limited to one month. Returns the row count.
pub(crate) fn export_file(
    store: &dyn Store,
    session: &Session,
    path: &Path,
    month: Option<MonthKey>,
) -> Result<usize> {
    let filter = ExpenseFilter {
        month,
        category: None,
    };
    let expenses = store.load_expenses(session.owner(), &filter)?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_expenses(file, &expenses)?;
    info!(rows = expenses.len(), path = %path.display(), "exported expenses to CSV");
    Ok(expenses.len())
}
