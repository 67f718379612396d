#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::models::{MonthKey, UserId};

fn owner() -> UserId {
    UserId::new("owner-1")
}

fn expense(day: u32, category: &str, amount: Decimal) -> Expense {
    let date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
    Expense::new(owner(), date, category, amount).unwrap()
}

fn budget(category: &str, amount: Decimal) -> Budget {
    Budget::new(owner(), MonthKey::parse("2024-03").unwrap(), category, amount).unwrap()
}

fn total(category: &str, amount: Decimal) -> CategoryTotal {
    CategoryTotal {
        category: category.into(),
        total_amount: amount,
    }
}

// ── aggregate ─────────────────────────────────────────────────

#[test]
fn test_empty_expenses() {
    let result = aggregate(&[], &[budget("Food", dec!(200))]);
    assert_eq!(result.total_spent, Decimal::ZERO);
    assert!(result.category_totals.is_empty());
    assert!(result.top_category.is_none());
    assert_eq!(result.over_budget_total, Decimal::ZERO);
    assert_eq!(result, AggregationResult::default());
}

#[test]
fn test_groups_and_sums_by_category() {
    let expenses = vec![
        expense(1, "Food", dec!(120.50)),
        expense(2, "Transport", dec!(40)),
        expense(3, "Food", dec!(79.50)),
    ];
    let result = aggregate(&expenses, &[]);
    assert_eq!(result.total_spent, dec!(240));
    assert_eq!(
        result.category_totals,
        vec![total("Food", dec!(200)), total("Transport", dec!(40))]
    );
}

#[test]
fn test_category_totals_sum_to_total_spent() {
    let expenses = vec![
        expense(1, "Food", dec!(0.10)),
        expense(2, "Food", dec!(0.20)),
        expense(3, "Bills", dec!(1999.99)),
        expense(4, "Health", dec!(0.01)),
        expense(5, "Other", dec!(33.33)),
        expense(6, "Bills", dec!(0.01)),
    ];
    let result = aggregate(&expenses, &[]);
    let sum: Decimal = result.category_totals.iter().map(|c| c.total_amount).sum();
    assert_eq!(sum, result.total_spent);
    assert_eq!(result.total_spent, dec!(2033.64));
}

#[test]
fn test_over_budget_only_counts_exceeding_budgeted_categories() {
    let expenses = vec![expense(1, "Food", dec!(300)), expense(2, "Transport", dec!(100))];
    let result = aggregate(&expenses, &[budget("Food", dec!(200))]);
    assert_eq!(result.over_budget_total, dec!(100));
}

#[test]
fn test_under_budget_clamps_to_zero() {
    let expenses = vec![expense(1, "Food", dec!(150))];
    let result = aggregate(&expenses, &[budget("Food", dec!(200))]);
    assert_eq!(result.over_budget_total, Decimal::ZERO);
}

#[test]
fn test_over_budget_sums_multiple_overruns() {
    let expenses = vec![
        expense(1, "Food", dec!(260)),
        expense(2, "Bills", dec!(1200)),
        expense(3, "Health", dec!(50)),
    ];
    let budgets = vec![
        budget("Food", dec!(200)),
        budget("Bills", dec!(1000)),
        budget("Health", dec!(80)),
    ];
    let result = aggregate(&expenses, &budgets);
    assert_eq!(result.over_budget_total, dec!(260));
}

#[test]
fn test_budget_without_spend_contributes_nothing() {
    let expenses = vec![expense(1, "Food", dec!(50))];
    let budgets = vec![budget("Food", dec!(100)), budget("Shopping", dec!(0))];
    let result = aggregate(&expenses, &budgets);
    assert_eq!(result.over_budget_total, Decimal::ZERO);
    assert_eq!(result.category_totals.len(), 1);
}

#[test]
fn test_zero_budget_counts_whole_spend_as_overrun() {
    let expenses = vec![expense(1, "Shopping", dec!(75))];
    let result = aggregate(&expenses, &[budget("Shopping", dec!(0))]);
    assert_eq!(result.over_budget_total, dec!(75));
}

#[test]
fn test_top_category_is_highest_amount() {
    let expenses = vec![expense(1, "Food", dec!(300)), expense(2, "Transport", dec!(500))];
    let result = aggregate(&expenses, &[]);
    assert_eq!(result.top_category, Some(total("Transport", dec!(500))));
    assert_eq!(result.category_totals[0].category, "Transport");
}

#[test]
fn test_ties_ordered_by_name() {
    let expenses = vec![expense(1, "B", dec!(100)), expense(2, "A", dec!(100))];
    let first = aggregate(&expenses, &[]);
    assert_eq!(
        first.category_totals,
        vec![total("A", dec!(100)), total("B", dec!(100))]
    );
    assert_eq!(first.top_category.unwrap().category, "A");

    for _ in 0..20 {
        assert_eq!(aggregate(&expenses, &[]).category_totals, first.category_totals);
    }
}

#[test]
fn test_category_names_are_case_sensitive() {
    let expenses = vec![expense(1, "food", dec!(10)), expense(2, "Food", dec!(10))];
    let result = aggregate(&expenses, &[budget("Food", dec!(5))]);
    assert_eq!(result.category_totals.len(), 2);
    assert_eq!(result.over_budget_total, dec!(5));
}

// ── daily_totals ──────────────────────────────────────────────

#[test]
fn test_daily_totals_sorted_and_summed() {
    let expenses = vec![
        expense(15, "Food", dec!(10)),
        expense(2, "Bills", dec!(500)),
        expense(15, "Transport", dec!(5.25)),
        expense(9, "Food", dec!(42)),
    ];
    let daily = daily_totals(&expenses);
    let days: Vec<(u32, Decimal)> = daily
        .iter()
        .map(|d| (chrono::Datelike::day(&d.date), d.total_amount))
        .collect();
    assert_eq!(days, vec![(2, dec!(500)), (9, dec!(42)), (15, dec!(15.25))]);
}

#[test]
fn test_daily_totals_empty() {
    assert!(daily_totals(&[]).is_empty());
}

#[test]
fn test_daily_totals_match_total_spent() {
    let expenses = vec![
        expense(1, "Food", dec!(1.10)),
        expense(1, "Food", dec!(2.20)),
        expense(31, "Bills", dec!(3.30)),
    ];
    let daily_sum: Decimal = daily_totals(&expenses).iter().map(|d| d.total_amount).sum();
    assert_eq!(daily_sum, aggregate(&expenses, &[]).total_spent);
}

// ── budget_status ─────────────────────────────────────────────

#[test]
fn test_budget_status_lines() {
    let expenses = vec![expense(1, "Food", dec!(250)), expense(2, "Bills", dec!(40))];
    let totals = category_totals(&expenses);
    let budgets = vec![budget("Food", dec!(200)), budget("Health", dec!(100))];
    let status = budget_status(&totals, &budgets);

    assert_eq!(status.len(), 2);
    assert_eq!(status[0].category, "Food");
    assert_eq!(status[0].spent, dec!(250));
    assert_eq!(status[0].remaining(), dec!(-50));
    assert_eq!(status[0].overrun(), dec!(50));
    assert!((status[0].usage() - 1.25).abs() < 1e-9);

    assert_eq!(status[1].category, "Health");
    assert_eq!(status[1].spent, Decimal::ZERO);
    assert_eq!(status[1].remaining(), dec!(100));
    assert_eq!(status[1].usage(), 0.0);
}

#[test]
fn test_budget_status_zero_limit_usage() {
    let status = BudgetStatus {
        category: "Other".into(),
        limit: Decimal::ZERO,
        spent: dec!(1),
    };
    assert_eq!(status.usage(), 1.0);
}
