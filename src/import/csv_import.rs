use anyhow::{anyhow, bail, Context, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::info;

use super::CSV_COLUMNS;
use crate::auth::Session;
use crate::error::ValidationError;
use crate::models::{money, parse_date, Expense, UserId};
use crate::store::Store;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ImportSummary {
    pub(crate) imported: usize,
    /// Categories that did not exist for the owner before this import.
    pub(crate) new_categories: Vec<String>,
}

/// Header positions of the columns an import needs.
struct ColumnMap {
    dt: usize,
    category: usize,
    description: usize,
    amount: usize,
    payment: usize,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let index: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().trim_start_matches('\u{feff}').to_lowercase(), i))
            .collect();
        let required = &CSV_COLUMNS[1..];
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|c| !index.contains_key(*c))
            .collect();
        if !missing.is_empty() {
            bail!(
                "CSV must have columns: {} (missing: {})",
                required.join(", "),
                missing.join(", ")
            );
        }
        let col = |name: &str| index.get(name).copied().unwrap_or_default();
        Ok(Self {
            dt: col("dt"),
            category: col("category"),
            description: col("description"),
            amount: col("amount"),
            payment: col("payment"),
        })
    }
}

fn parse_row(
    record: &csv::StringRecord,
    columns: &ColumnMap,
    owner: &UserId,
) -> Result<Expense, ValidationError> {
    let field = |i: usize| record.get(i).unwrap_or("").trim();

    let date = parse_date(field(columns.dt))?;
    let raw_amount = field(columns.amount);
    if raw_amount.is_empty() {
        return Err(ValidationError::InvalidAmount(String::new()));
    }
    let amount = money::parse_non_negative(raw_amount)?;
    Ok(Expense::new(owner.clone(), date, field(columns.category), amount)?
        .with_description(field(columns.description))
        .with_payment(field(columns.payment)))
}

/// Parse every row, failing on the first bad one.
pub(crate) fn parse_records<R: Read>(reader: R, owner: &UserId) -> Result<Vec<Expense>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers().context("Failed to read CSV header")?.clone();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut expenses = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let row = i + 1;
        let record = result.with_context(|| format!("Row {row}: failed to read CSV record"))?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let expense = parse_row(&record, &columns, owner).map_err(|e| anyhow!("Row {row}: {e}"))?;
        expenses.push(expense);
    }
    Ok(expenses)
}

/// Import expenses for the session owner from any CSV source.
pub(crate) fn import_reader<R: Read>(
    store: &mut dyn Store,
    session: &Session,
    reader: R,
) -> Result<ImportSummary> {
    let expenses = parse_records(reader, session.owner())?;
    let imported = store
        .insert_expenses(&expenses)
        .context("Failed to save imported expenses")?;

    let mut known = store.list_categories(session.owner())?;
    let mut new_categories = Vec::new();
    for expense in &expenses {
        if known.contains(&expense.category) {
            continue;
        }
        store.add_category(session.owner(), &expense.category)?;
        known.push(expense.category.clone());
        new_categories.push(expense.category.clone());
    }

    info!(
        imported,
        new_categories = new_categories.len(),
        "imported expenses from CSV"
    );
    Ok(ImportSummary {
        imported,
        new_categories,
    })
}

pub(crate) fn import_file(
    store: &mut dyn Store,
    session: &Session,
    path: &Path,
) -> Result<ImportSummary> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
    import_reader(store, session, file)
        .with_context(|| format!("Import from {} failed", path.display()))
}

#[cfg(test)]
#[path = "csv_import_tests.rs"]
mod tests;
