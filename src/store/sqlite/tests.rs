#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;

fn expense(owner: &UserId, amount: Decimal) -> Expense {
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    Expense::new(owner.clone(), date, "Food", amount).unwrap()
}

#[test]
fn test_schema_version_recorded() {
    let store = SqliteStore::open_in_memory().unwrap();
    let version: i32 = store
        .conn
        .query_row("SELECT version FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, schema::CURRENT_VERSION);
}

#[test]
fn test_migrate_is_idempotent() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    store.migrate().unwrap();
    let rows: i64 = store
        .conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn test_reopen_file_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spendwise.db");
    let owner = {
        let mut store = SqliteStore::open(&path).unwrap();
        let owner = store.create_user("Asha", "asha@example.com", "h").unwrap();
        store.insert_expense(&expense(&owner, dec!(9.99))).unwrap();
        owner
    };
    let store = SqliteStore::open(&path).unwrap();
    let loaded = store.load_expenses(&owner, &ExpenseFilter::default()).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].amount, dec!(9.99));
}

#[test]
fn test_amount_stored_as_text() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let owner = store.create_user("Asha", "asha@example.com", "h").unwrap();
    store.insert_expense(&expense(&owner, dec!(0.10))).unwrap();
    let raw: String = store
        .conn
        .query_row("SELECT amount FROM expenses", [], |row| row.get(0))
        .unwrap();
    assert_eq!(raw, "0.10");
}

#[test]
fn test_corrupt_amount_reported() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let owner = store.create_user("Asha", "asha@example.com", "h").unwrap();
    store.insert_expense(&expense(&owner, dec!(1))).unwrap();
    store
        .conn
        .execute("UPDATE expenses SET amount = 'twelve'", [])
        .unwrap();
    let err = store
        .load_expenses(&owner, &ExpenseFilter::default())
        .unwrap_err();
    assert!(matches!(err, StoreError::Corrupt(_)), "{err:?}");
}

#[test]
fn test_corrupt_date_reported() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let owner = store.create_user("Asha", "asha@example.com", "h").unwrap();
    store.insert_expense(&expense(&owner, dec!(1))).unwrap();
    store
        .conn
        .execute("UPDATE expenses SET dt = '03/01/2024'", [])
        .unwrap();
    let err = store
        .load_expenses(&owner, &ExpenseFilter::default())
        .unwrap_err();
    assert!(matches!(err, StoreError::Corrupt(_)), "{err:?}");
}

#[test]
fn test_non_numeric_owner_reads_empty() {
    let store = SqliteStore::open_in_memory().unwrap();
    let owner = UserId::new("4b1d-uuid");
    assert!(store.list_categories(&owner).unwrap().is_empty());
    assert!(store
        .load_expenses(&owner, &ExpenseFilter::default())
        .unwrap()
        .is_empty());
}
