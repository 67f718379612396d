mod schema;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use super::{ExpenseFilter, Store};
use crate::error::StoreError;
use crate::models::{Budget, Expense, ExpenseId, MonthKey, User, UserId, UserRecord};

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
                StoreError::ConstraintViolation(err.to_string())
            }
            _ => StoreError::ConnectionFailure(err.to_string()),
        }
    }
}

pub(crate) struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut store = Self { conn };
        store.migrate().context("Database migration failed")?;
        Ok(store)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            info!(version = schema::CURRENT_VERSION, "created database schema");
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                debug!(from_version, "applying migration");
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
            info!(
                from = current,
                to = schema::CURRENT_VERSION,
                "migrated database schema"
            );
        }

        Ok(())
    }
}

/// Rowid behind an id handed out by this store. Anything else cannot exist here.
fn rowid(id: &str) -> Option<i64> {
    id.parse().ok()
}

fn parse_stored_date(s: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| StoreError::Corrupt(format!("expense date '{s}'")))
}

fn parse_stored_amount(s: &str) -> Result<Decimal, StoreError> {
    Decimal::from_str(s).map_err(|_| StoreError::Corrupt(format!("amount '{s}'")))
}

const INSERT_EXPENSE: &str = "INSERT INTO expenses (user_id, dt, category, description, amount, payment)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

fn insert_expense_row(conn: &Connection, expense: &Expense) -> Result<i64, StoreError> {
    let owner = rowid(expense.owner_id.as_str()).ok_or_else(|| {
        StoreError::ConstraintViolation(format!("unknown owner {}", expense.owner_id))
    })?;
    conn.execute(
        INSERT_EXPENSE,
        params![
            owner,
            expense.date.format("%Y-%m-%d").to_string(),
            expense.category,
            expense.description,
            expense.amount.to_string(),
            expense.payment,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Columns as stored, before validation.
struct ExpenseRow {
    id: i64,
    user_id: i64,
    dt: String,
    category: String,
    description: String,
    amount: String,
    payment: String,
}

impl TryFrom<ExpenseRow> for Expense {
    type Error = StoreError;

    fn try_from(row: ExpenseRow) -> Result<Self, Self::Error> {
        Ok(Expense {
            id: Some(ExpenseId::new(row.id.to_string())),
            owner_id: UserId::new(row.user_id.to_string()),
            date: parse_stored_date(&row.dt)?,
            category: row.category,
            description: row.description,
            amount: parse_stored_amount(&row.amount)?,
            payment: row.payment,
        })
    }
}

impl Store for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    // ── Users ─────────────────────────────────────────────────

    fn create_user(
        &mut self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserId, StoreError> {
        self.conn.execute(
            "INSERT INTO users (name, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![name, email, password_hash, Utc::now().to_rfc3339()],
        )?;
        Ok(UserId::new(self.conn.last_insert_rowid().to_string()))
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let record = self
            .conn
            .query_row(
                "SELECT id, name, email, password_hash FROM users WHERE email = ?1",
                params![email],
                |row| {
                    Ok(UserRecord {
                        user: User {
                            id: UserId::new(row.get::<_, i64>(0)?.to_string()),
                            name: row.get(1)?,
                            email: row.get(2)?,
                        },
                        password_hash: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    // ── Categories ────────────────────────────────────────────

    fn list_categories(&self, owner: &UserId) -> Result<Vec<String>, StoreError> {
        let Some(owner) = rowid(owner.as_str()) else {
            return Ok(Vec::new());
        };
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM categories WHERE user_id = ?1 ORDER BY id")?;
        let rows = stmt.query_map(params![owner], |row| row.get(0))?;
        Ok(rows.collect::<std::result::Result<Vec<String>, _>>()?)
    }

    fn add_category(&mut self, owner: &UserId, name: &str) -> Result<bool, StoreError> {
        let owner_key = rowid(owner.as_str())
            .ok_or_else(|| StoreError::ConstraintViolation(format!("unknown owner {owner}")))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::ConstraintViolation(
                "category name must not be empty".into(),
            ));
        }
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO categories (user_id, name) VALUES (?1, ?2)",
            params![owner_key, name],
        )?;
        Ok(inserted > 0)
    }

    // ── Expenses ──────────────────────────────────────────────

    fn insert_expense(&mut self, expense: &Expense) -> Result<ExpenseId, StoreError> {
        let id = insert_expense_row(&self.conn, expense)?;
        Ok(ExpenseId::new(id.to_string()))
    }

    fn insert_expenses(&mut self, expenses: &[Expense]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        for expense in expenses {
            insert_expense_row(&tx, expense)?;
        }
        tx.commit()?;
        Ok(expenses.len())
    }

    fn delete_expense(&mut self, owner: &UserId, id: &ExpenseId) -> Result<(), StoreError> {
        let not_found = || StoreError::not_found("expense", id.as_str());
        let (Some(owner_key), Some(key)) = (rowid(owner.as_str()), rowid(id.as_str())) else {
            return Err(not_found());
        };
        let deleted = self.conn.execute(
            "DELETE FROM expenses WHERE id = ?1 AND user_id = ?2",
            params![key, owner_key],
        )?;
        if deleted == 0 {
            return Err(not_found());
        }
        Ok(())
    }

    fn load_expenses(
        &self,
        owner: &UserId,
        filter: &ExpenseFilter,
    ) -> Result<Vec<Expense>, StoreError> {
        let Some(owner) = rowid(owner.as_str()) else {
            return Ok(Vec::new());
        };
        let mut sql = String::from(
            "SELECT id, user_id, dt, category, description, amount, payment
             FROM expenses WHERE user_id = ?1",
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(owner)];

        if let Some(m) = filter.month {
            sql.push_str(&format!(" AND dt LIKE ?{}", param_values.len() + 1));
            param_values.push(Box::new(format!("{m}-%")));
        }
        if let Some(c) = &filter.category {
            sql.push_str(&format!(" AND category = ?{}", param_values.len() + 1));
            param_values.push(Box::new(c.clone()));
        }
        sql.push_str(" ORDER BY dt ASC, id ASC");

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), |row| {
            Ok(ExpenseRow {
                id: row.get(0)?,
                user_id: row.get(1)?,
                dt: row.get(2)?,
                category: row.get(3)?,
                description: row.get(4)?,
                amount: row.get(5)?,
                payment: row.get(6)?,
            })
        })?;
        rows.map(|row| Expense::try_from(row?)).collect()
    }

    // ── Budgets ───────────────────────────────────────────────

    fn upsert_budget(&mut self, budget: &Budget) -> Result<(), StoreError> {
        let owner = rowid(budget.owner_id.as_str()).ok_or_else(|| {
            StoreError::ConstraintViolation(format!("unknown owner {}", budget.owner_id))
        })?;
        self.conn.execute(
            "INSERT INTO budgets (user_id, month, category, amount)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, month, category) DO UPDATE SET amount = ?4",
            params![
                owner,
                budget.month.to_string(),
                budget.category,
                budget.amount.to_string(),
            ],
        )?;
        Ok(())
    }

    fn get_budgets(&self, owner: &UserId, month: MonthKey) -> Result<Vec<Budget>, StoreError> {
        let Some(owner_key) = rowid(owner.as_str()) else {
            return Ok(Vec::new());
        };
        let mut stmt = self.conn.prepare(
            "SELECT category, amount FROM budgets
             WHERE user_id = ?1 AND month = ?2 ORDER BY category",
        )?;
        let rows = stmt.query_map(params![owner_key, month.to_string()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        rows.map(|row| {
            let (category, amount) = row?;
            Ok(Budget {
                owner_id: owner.clone(),
                month,
                category,
                amount: parse_stored_amount(&amount)?,
            })
        })
        .collect()
    }

    fn delete_budget(
        &mut self,
        owner: &UserId,
        month: MonthKey,
        category: &str,
    ) -> Result<(), StoreError> {
        let not_found = || StoreError::not_found("budget", format!("{month}/{category}"));
        let Some(owner_key) = rowid(owner.as_str()) else {
            return Err(not_found());
        };
        let deleted = self.conn.execute(
            "DELETE FROM budgets WHERE user_id = ?1 AND month = ?2 AND category = ?3",
            params![owner_key, month.to_string(), category],
        )?;
        if deleted == 0 {
            return Err(not_found());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
