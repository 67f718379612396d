#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;
use crate::auth;
use crate::config::Settings;
use crate::store::SqliteStore;

fn setup() -> (SqliteStore, App) {
    let mut store = SqliteStore::open_in_memory().unwrap();
    auth::register(&mut store, "Asha", "asha@example.com", "pw").unwrap();
    let session = auth::login(&mut store, "asha@example.com", "pw").unwrap();
    let mut app = App::new(&Settings::default());
    app.start_session(session, &store).unwrap();
    app.set_month(MonthKey::parse("2024-03").unwrap(), &store).unwrap();
    (store, app)
}

fn run(input: &str, app: &mut App, store: &mut SqliteStore) {
    handle_command(input, app, store);
}

#[test]
fn test_levenshtein() {
    assert_eq!(levenshtein("", ""), 0);
    assert_eq!(levenshtein("budget", "budget"), 0);
    assert_eq!(levenshtein("budgte", "budget"), 2);
    assert_eq!(levenshtein("", "add"), 3);
}

#[test]
fn test_unknown_command_suggests_closest() {
    let (mut store, mut app) = setup();
    run("expnses", &mut app, &mut store);
    assert_eq!(
        app.status_message,
        "Unknown command: :expnses. Did you mean :expenses?"
    );
}

#[test]
fn test_quit() {
    let (mut store, mut app) = setup();
    run("q", &mut app, &mut store);
    assert!(!app.running);
}

#[test]
fn test_add_expense() {
    let (mut store, mut app) = setup();
    run("add 2024-03-05 food 120.50 upi Lunch with team", &mut app, &mut store);
    assert_eq!(app.expenses.len(), 1, "{}", app.status_message);
    let e = &app.expenses[0];
    assert_eq!(e.category, "Food");
    assert_eq!(e.amount, dec!(120.50));
    assert_eq!(e.payment, "UPI");
    assert_eq!(e.description, "Lunch with team");
    assert_eq!(app.report.summary.total_spent, dec!(120.50));
}

#[test]
fn test_add_without_payment_keeps_description() {
    let (mut store, mut app) = setup();
    run("add 2024-03-05 Transport 40 Metro card top-up", &mut app, &mut store);
    let e = &app.expenses[0];
    assert_eq!(e.payment, "");
    assert_eq!(e.description, "Metro card top-up");
}

#[test]
fn test_add_with_multi_word_category() {
    let (mut store, mut app) = setup();
    run("category Eating Out", &mut app, &mut store);
    run("add 2024-03-05 eating out 250 Card Dinner", &mut app, &mut store);
    assert_eq!(app.expenses.len(), 1, "{}", app.status_message);
    let e = &app.expenses[0];
    assert_eq!(e.category, "Eating Out");
    assert_eq!(e.amount, dec!(250));
    assert_eq!(e.payment, "Card");
    assert_eq!(e.description, "Dinner");

    run("add 2024-03-06 Eating Out 90", &mut app, &mut store);
    assert_eq!(app.expenses.len(), 2, "{}", app.status_message);
    assert_eq!(app.report.summary.total_spent, dec!(340));
}

#[test]
fn test_add_outside_month_is_stored_but_not_shown() {
    let (mut store, mut app) = setup();
    run("add 2024-04-01 Food 10", &mut app, &mut store);
    assert!(app.expenses.is_empty());
    assert!(app.status_message.contains("outside 2024-03"), "{}", app.status_message);
    run("next-month", &mut app, &mut store);
    assert_eq!(app.expenses.len(), 1);
}

#[test]
fn test_add_rejects_bad_input() {
    let (mut store, mut app) = setup();
    run("add 2024-03-05 Yachts 10", &mut app, &mut store);
    assert!(app.status_message.starts_with("Error: Unknown category 'Yachts'"));
    run("add 2024-03-05 Food -10", &mut app, &mut store);
    assert!(app.status_message.contains("negative"), "{}", app.status_message);
    run("add someday Food 10", &mut app, &mut store);
    assert!(app.status_message.starts_with("Error:"));
    run("add Food 10", &mut app, &mut store);
    assert!(app.status_message.starts_with("Usage: :add"));
    assert!(app.expenses.is_empty());
}

#[test]
fn test_budget_sets_and_switches_screen() {
    let (mut store, mut app) = setup();
    run("add 2024-03-05 Food 300", &mut app, &mut store);
    run("budget food 200", &mut app, &mut store);
    assert_eq!(app.screen, Screen::Budgets);
    assert_eq!(app.report.budgets.len(), 1);
    assert_eq!(app.report.budgets[0].category, "Food");
    assert_eq!(app.report.summary.over_budget_total, dec!(100));

    run("budget Food 500", &mut app, &mut store);
    assert_eq!(app.report.budgets.len(), 1);
    assert_eq!(app.report.budgets[0].amount, dec!(500));
    assert_eq!(app.report.summary.over_budget_total, dec!(0));
}

#[test]
fn test_budget_usage() {
    let (mut store, mut app) = setup();
    run("budget", &mut app, &mut store);
    assert!(app.status_message.starts_with("Usage: :budget"));
    run("budget Food lots", &mut app, &mut store);
    assert!(app.status_message.starts_with("Error:"));
    assert!(app.report.budgets.is_empty());
}

#[test]
fn test_delete_asks_for_confirmation() {
    let (mut store, mut app) = setup();
    run("add 2024-03-05 Food 12", &mut app, &mut store);

    run("delete", &mut app, &mut store);
    assert!(app.pending_action.is_none(), "delete only works on the Expenses tab");

    run("expenses", &mut app, &mut store);
    run("delete", &mut app, &mut store);
    assert_eq!(app.input_mode, InputMode::Confirm);
    match &app.pending_action {
        Some(PendingAction::DeleteExpense { id, label }) => {
            assert_eq!(Some(id), app.expenses[0].id.as_ref());
            assert_eq!(label, "2024-03-05 Food 12");
        }
        other => panic!("unexpected pending action: {other:?}"),
    }
}

#[test]
fn test_delete_budget_selected_or_named() {
    let (mut store, mut app) = setup();
    run("delete-budget", &mut app, &mut store);
    assert_eq!(app.status_message, "No budgets to delete");

    run("budget Food 100", &mut app, &mut store);
    run("budget Transport 50", &mut app, &mut store);
    run("delete-budget Transport", &mut app, &mut store);
    assert_eq!(
        app.pending_action,
        Some(PendingAction::DeleteBudget {
            category: "Transport".into()
        })
    );

    app.pending_action = None;
    app.input_mode = InputMode::Normal;
    run("delete-budget", &mut app, &mut store);
    assert_eq!(
        app.pending_action,
        Some(PendingAction::DeleteBudget {
            category: "Food".into()
        })
    );

    app.pending_action = None;
    app.input_mode = InputMode::Normal;
    run("delete-budget transport", &mut app, &mut store);
    assert_eq!(
        app.pending_action,
        Some(PendingAction::DeleteBudget {
            category: "Transport".into()
        })
    );

    app.pending_action = None;
    app.input_mode = InputMode::Normal;
    run("delete-budget Health", &mut app, &mut store);
    assert!(app.pending_action.is_none());
    assert!(app.status_message.starts_with("Error: No budget for 'Health'"));
}

#[test]
fn test_category_add_and_duplicate() {
    let (mut store, mut app) = setup();
    run("category Travel", &mut app, &mut store);
    assert_eq!(app.status_message, "Created category: Travel");
    assert!(app.categories.iter().any(|c| c == "Travel"));
    run("category Travel", &mut app, &mut store);
    assert_eq!(app.status_message, "Category 'Travel' already exists");
}

#[test]
fn test_filter_by_category() {
    let (mut store, mut app) = setup();
    run("add 2024-03-01 Food 10", &mut app, &mut store);
    run("add 2024-03-02 Transport 20", &mut app, &mut store);
    run("add 2024-03-03 Food 30", &mut app, &mut store);

    run("filter transport", &mut app, &mut store);
    assert_eq!(app.screen, Screen::Expenses);
    assert_eq!(app.category_filter.as_deref(), Some("Transport"));
    assert_eq!(app.expenses.len(), 1);
    // Dashboard totals ignore the list filter.
    assert_eq!(app.report.summary.total_spent, dec!(60));

    run("filter", &mut app, &mut store);
    assert!(app.category_filter.is_none());
    assert_eq!(app.expenses.len(), 3);
}

#[test]
fn test_month_navigation() {
    let (mut store, mut app) = setup();
    run("month 2024-01", &mut app, &mut store);
    assert_eq!(app.month.to_string(), "2024-01");
    run("prev-month", &mut app, &mut store);
    assert_eq!(app.month.to_string(), "2023-12");
    run("month 7", &mut app, &mut store);
    assert_eq!(app.month.to_string(), "2023-07");
    run("month 13", &mut app, &mut store);
    assert!(app.status_message.starts_with("Error:"));
    assert_eq!(app.month.to_string(), "2023-07");
}

#[test]
fn test_month_stepping_stays_in_picker_range() {
    let (mut store, mut app) = setup();
    let current = MonthKey::current();
    app.set_month(current, &store).unwrap();
    run("next-month", &mut app, &mut store);
    assert_eq!(app.month, current);
    assert!(app.status_message.starts_with("Months run from 2022-01"), "{}", app.status_message);

    run("month 2022-01", &mut app, &mut store);
    run("prev-month", &mut app, &mut store);
    assert_eq!(app.month.to_string(), "2022-01");
    run("next-month", &mut app, &mut store);
    assert_eq!(app.month.to_string(), "2022-02");
}

#[test]
fn test_export_then_import() {
    let (mut store, mut app) = setup();
    run("add 2024-03-01 Food 10 Cash Tea", &mut app, &mut store);
    run("add 2024-03-02 Bills 999.99", &mut app, &mut store);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("march.csv");
    run(&format!("export {}", path.display()), &mut app, &mut store);
    assert!(app.status_message.starts_with("Exported 2 expenses"), "{}", app.status_message);

    run(&format!("import {}", path.display()), &mut app, &mut store);
    assert!(app.status_message.starts_with("Imported 2 expenses"), "{}", app.status_message);
    assert_eq!(app.expenses.len(), 4);
}

#[test]
fn test_import_missing_file_reports_error() {
    let (mut store, mut app) = setup();
    run("import /nonexistent/spendwise.csv", &mut app, &mut store);
    assert!(app.status_message.starts_with("Error: Failed to open CSV file"));
}

#[test]
fn test_logout_clears_session() {
    let (mut store, mut app) = setup();
    run("add 2024-03-01 Food 10", &mut app, &mut store);
    run("logout", &mut app, &mut store);
    assert!(app.session.is_none());
    assert!(app.expenses.is_empty());
    assert_eq!(app.login.email, "asha@example.com");

    run("add 2024-03-01 Food 10", &mut app, &mut store);
    assert_eq!(app.status_message, "Error: Not logged in");
}
