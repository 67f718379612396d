//! JSON document backend. The whole store lives in one file that is
//! rewritten atomically on every change.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use super::{ExpenseFilter, Store};
use crate::error::StoreError;
use crate::models::{Budget, Expense, ExpenseId, MonthKey, User, UserId, UserRecord};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Documents {
    #[serde(default)]
    users: Vec<UserDoc>,
    #[serde(default)]
    categories: Vec<CategoryDoc>,
    #[serde(default)]
    expenses: Vec<ExpenseDoc>,
    #[serde(default)]
    budgets: Vec<BudgetDoc>,
}

impl Documents {
    fn has_user(&self, id: &UserId) -> bool {
        self.users.iter().any(|u| &u.id == id)
    }

    fn require_user(&self, id: &UserId) -> Result<(), StoreError> {
        if self.has_user(id) {
            Ok(())
        } else {
            Err(StoreError::ConstraintViolation(format!("unknown owner {id}")))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserDoc {
    id: UserId,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CategoryDoc {
    user_id: UserId,
    name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ExpenseDoc {
    id: ExpenseId,
    user_id: UserId,
    dt: NaiveDate,
    category: String,
    #[serde(default)]
    description: String,
    amount: Decimal,
    #[serde(default)]
    payment: String,
}

impl ExpenseDoc {
    fn new(expense: &Expense) -> Self {
        Self {
            id: ExpenseId::new(Uuid::new_v4().to_string()),
            user_id: expense.owner_id.clone(),
            dt: expense.date,
            category: expense.category.clone(),
            description: expense.description.clone(),
            amount: expense.amount,
            payment: expense.payment.clone(),
        }
    }
}

impl From<&ExpenseDoc> for Expense {
    fn from(doc: &ExpenseDoc) -> Self {
        Expense {
            id: Some(doc.id.clone()),
            owner_id: doc.user_id.clone(),
            date: doc.dt,
            category: doc.category.clone(),
            description: doc.description.clone(),
            amount: doc.amount,
            payment: doc.payment.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BudgetDoc {
    user_id: UserId,
    month: MonthKey,
    category: String,
    amount: Decimal,
}

pub(crate) struct DocumentStore {
    path: PathBuf,
    docs: Documents,
}

impl DocumentStore {
    /// Load the document file, or start empty if it does not exist yet.
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let docs = read_documents(path)
            .with_context(|| format!("Failed to open document store: {}", path.display()))?;
        debug!(
            users = docs.users.len(),
            expenses = docs.expenses.len(),
            "document store loaded"
        );
        Ok(Self {
            path: path.to_path_buf(),
            docs,
        })
    }

    /// Apply `change` to a copy of the documents and persist it. The
    /// in-memory state only moves forward once the file is written.
    fn mutate<T>(
        &mut self,
        change: impl FnOnce(&mut Documents) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut next = self.docs.clone();
        let out = change(&mut next)?;
        write_documents(&self.path, &next)?;
        self.docs = next;
        Ok(out)
    }
}

fn read_documents(path: &Path) -> Result<Documents, StoreError> {
    if !path.exists() {
        return Ok(Documents::default());
    }
    let file = File::open(path).map_err(|e| {
        StoreError::ConnectionFailure(format!("Failed to open {}: {e}", path.display()))
    })?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| StoreError::Corrupt(format!("Failed to parse {}: {e}", path.display())))
}

/// Write to a sibling temp file, sync, then rename over the original.
fn write_documents(path: &Path, docs: &Documents) -> Result<(), StoreError> {
    let io_err = |what: &str, e: std::io::Error| {
        StoreError::ConnectionFailure(format!("{what} {}: {e}", path.display()))
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err("Failed to create directory for", e))?;
    }

    let temp_path = path.with_extension("json.tmp");
    let file = File::create(&temp_path).map_err(|e| io_err("Failed to create temp file for", e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, docs)
        .map_err(|e| StoreError::ConnectionFailure(format!("Failed to serialize documents: {e}")))?;
    writer.flush().map_err(|e| io_err("Failed to flush", e))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| io_err("Failed to sync", e))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        io_err("Failed to replace", e)
    })
}

impl Store for DocumentStore {
    fn backend_name(&self) -> &'static str {
        "document"
    }

    fn create_user(
        &mut self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserId, StoreError> {
        self.mutate(|docs| {
            if docs.users.iter().any(|u| u.email == email) {
                return Err(StoreError::ConstraintViolation(format!(
                    "email already registered: {email}"
                )));
            }
            let id = UserId::new(Uuid::new_v4().to_string());
            docs.users.push(UserDoc {
                id: id.clone(),
                name: name.to_string(),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                created_at: Utc::now(),
            });
            Ok(id)
        })
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self
            .docs
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| UserRecord {
                user: User {
                    id: u.id.clone(),
                    name: u.name.clone(),
                    email: u.email.clone(),
                },
                password_hash: u.password_hash.clone(),
            }))
    }

    fn list_categories(&self, owner: &UserId) -> Result<Vec<String>, StoreError> {
        Ok(self
            .docs
            .categories
            .iter()
            .filter(|c| &c.user_id == owner)
            .map(|c| c.name.clone())
            .collect())
    }

    fn add_category(&mut self, owner: &UserId, name: &str) -> Result<bool, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::ConstraintViolation(
                "category name must not be empty".into(),
            ));
        }
        self.docs.require_user(owner)?;
        let exists = self
            .docs
            .categories
            .iter()
            .any(|c| &c.user_id == owner && c.name == name);
        if exists {
            return Ok(false);
        }
        self.mutate(|docs| {
            docs.categories.push(CategoryDoc {
                user_id: owner.clone(),
                name: name.to_string(),
            });
            Ok(true)
        })
    }

    fn insert_expense(&mut self, expense: &Expense) -> Result<ExpenseId, StoreError> {
        self.mutate(|docs| {
            docs.require_user(&expense.owner_id)?;
            let doc = ExpenseDoc::new(expense);
            let id = doc.id.clone();
            docs.expenses.push(doc);
            Ok(id)
        })
    }

    fn insert_expenses(&mut self, expenses: &[Expense]) -> Result<usize, StoreError> {
        self.mutate(|docs| {
            for expense in expenses {
                docs.require_user(&expense.owner_id)?;
                docs.expenses.push(ExpenseDoc::new(expense));
            }
            Ok(expenses.len())
        })
    }

    fn delete_expense(&mut self, owner: &UserId, id: &ExpenseId) -> Result<(), StoreError> {
        let position = self
            .docs
            .expenses
            .iter()
            .position(|e| &e.id == id && &e.user_id == owner)
            .ok_or_else(|| StoreError::not_found("expense", id.as_str()))?;
        self.mutate(|docs| {
            docs.expenses.remove(position);
            Ok(())
        })
    }

    fn load_expenses(
        &self,
        owner: &UserId,
        filter: &ExpenseFilter,
    ) -> Result<Vec<Expense>, StoreError> {
        let mut expenses: Vec<Expense> = self
            .docs
            .expenses
            .iter()
            .filter(|e| &e.user_id == owner)
            .map(Expense::from)
            .filter(|e| filter.matches(e))
            .collect();
        // Stable sort keeps insertion order for equal dates.
        expenses.sort_by_key(|e| e.date);
        Ok(expenses)
    }

    fn upsert_budget(&mut self, budget: &Budget) -> Result<(), StoreError> {
        self.mutate(|docs| {
            docs.require_user(&budget.owner_id)?;
            let existing = docs.budgets.iter_mut().find(|b| {
                b.user_id == budget.owner_id
                    && b.month == budget.month
                    && b.category == budget.category
            });
            match existing {
                Some(doc) => doc.amount = budget.amount,
                None => docs.budgets.push(BudgetDoc {
                    user_id: budget.owner_id.clone(),
                    month: budget.month,
                    category: budget.category.clone(),
                    amount: budget.amount,
                }),
            }
            Ok(())
        })
    }

    fn get_budgets(&self, owner: &UserId, month: MonthKey) -> Result<Vec<Budget>, StoreError> {
        let mut budgets: Vec<Budget> = self
            .docs
            .budgets
            .iter()
            .filter(|b| &b.user_id == owner && b.month == month)
            .map(|b| Budget {
                owner_id: b.user_id.clone(),
                month: b.month,
                category: b.category.clone(),
                amount: b.amount,
            })
            .collect();
        budgets.sort_by(|a, b| a.category.cmp(&b.category));
        Ok(budgets)
    }

    fn delete_budget(
        &mut self,
        owner: &UserId,
        month: MonthKey,
        category: &str,
    ) -> Result<(), StoreError> {
        let position = self
            .docs
            .budgets
            .iter()
            .position(|b| &b.user_id == owner && b.month == month && b.category == category)
            .ok_or_else(|| StoreError::not_found("budget", format!("{month}/{category}")))?;
        self.mutate(|docs| {
            docs.budgets.remove(position);
            Ok(())
        })
    }
}
