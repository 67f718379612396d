//! Persistence for users, categories, expenses and budgets.
//!
//! Every query is scoped to one owner. Two backends implement [`Store`]:
//! SQLite (the default) and a single JSON document file.

mod document;
mod sqlite;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::{Backend, Settings};
use crate::error::StoreError;
use crate::models::category::DEFAULT_CATEGORIES;
use crate::models::{Budget, Expense, ExpenseId, MonthKey, UserId, UserRecord};

pub(crate) use document::DocumentStore;
pub(crate) use sqlite::SqliteStore;

/// Optional narrowing for [`Store::load_expenses`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ExpenseFilter {
    pub(crate) month: Option<MonthKey>,
    /// Exact, case-sensitive category name.
    pub(crate) category: Option<String>,
}

impl ExpenseFilter {
    pub(crate) fn month(month: MonthKey) -> Self {
        Self {
            month: Some(month),
            category: None,
        }
    }

    pub(crate) fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub(crate) fn matches(&self, expense: &Expense) -> bool {
        self.month.map_or(true, |m| m.contains(expense.date))
            && self
                .category
                .as_deref()
                .map_or(true, |c| expense.category == c)
    }
}

pub(crate) trait Store {
    /// Short name for logs and the status bar.
    fn backend_name(&self) -> &'static str;

    /// Emails must already be normalised. A taken email is a `ConstraintViolation`.
    fn create_user(
        &mut self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserId, StoreError>;

    fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Category names in the order they were added.
    fn list_categories(&self, owner: &UserId) -> Result<Vec<String>, StoreError>;

    /// Returns `false` when the owner already has a category with this exact name.
    fn add_category(&mut self, owner: &UserId, name: &str) -> Result<bool, StoreError>;

    /// Seed the default categories. Safe to call on every login.
    fn ensure_default_categories(&mut self, owner: &UserId) -> Result<usize, StoreError> {
        let mut added = 0;
        for name in DEFAULT_CATEGORIES {
            if self.add_category(owner, name)? {
                added += 1;
            }
        }
        Ok(added)
    }

    fn insert_expense(&mut self, expense: &Expense) -> Result<ExpenseId, StoreError>;

    /// Insert all expenses or none of them.
    fn insert_expenses(&mut self, expenses: &[Expense]) -> Result<usize, StoreError>;

    /// Missing ids and ids belonging to another owner are both `NotFound`.
    fn delete_expense(&mut self, owner: &UserId, id: &ExpenseId) -> Result<(), StoreError>;

    /// Date ascending, ties in insertion order.
    fn load_expenses(
        &self,
        owner: &UserId,
        filter: &ExpenseFilter,
    ) -> Result<Vec<Expense>, StoreError>;

    /// Create the budget or replace the amount of an existing one.
    fn upsert_budget(&mut self, budget: &Budget) -> Result<(), StoreError>;

    /// Sorted by category name.
    fn get_budgets(&self, owner: &UserId, month: MonthKey) -> Result<Vec<Budget>, StoreError>;

    fn delete_budget(
        &mut self,
        owner: &UserId,
        month: MonthKey,
        category: &str,
    ) -> Result<(), StoreError>;
}

/// Open the backend selected in `settings`, creating the data directory.
pub(crate) fn open_store(settings: &Settings) -> Result<Box<dyn Store>> {
    std::fs::create_dir_all(&settings.data_dir).with_context(|| {
        format!(
            "Failed to create data directory: {}",
            settings.data_dir.display()
        )
    })?;
    let path = settings.store_path();
    let store: Box<dyn Store> = match settings.backend {
        Backend::Sqlite => Box::new(SqliteStore::open(&path)?),
        Backend::Document => Box::new(DocumentStore::open(&path)?),
    };
    info!(backend = store.backend_name(), path = %path.display(), "store opened");
    Ok(store)
}
