//! Monthly spend aggregation.
//!
//! Everything here is a pure function of the records handed in: the caller
//! fetches one owner's expenses and budgets for one month and passes them in.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::{Budget, Expense};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CategoryTotal {
    pub(crate) category: String,
    pub(crate) total_amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct AggregationResult {
    pub(crate) total_spent: Decimal,
    /// Highest spend first; equal totals ordered by category name.
    pub(crate) category_totals: Vec<CategoryTotal>,
    pub(crate) top_category: Option<CategoryTotal>,
    /// Sum of overruns across budgeted categories; never negative.
    pub(crate) over_budget_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DailyTotal {
    pub(crate) date: NaiveDate,
    pub(crate) total_amount: Decimal,
}

/// Spend against one budget line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BudgetStatus {
    pub(crate) category: String,
    pub(crate) limit: Decimal,
    pub(crate) spent: Decimal,
}

impl BudgetStatus {
    /// Negative once the limit is exceeded.
    pub(crate) fn remaining(&self) -> Decimal {
        self.limit - self.spent
    }

    pub(crate) fn overrun(&self) -> Decimal {
        (self.spent - self.limit).max(Decimal::ZERO)
    }

    /// Fraction of the limit used. A zero limit with any spend counts as fully used.
    pub(crate) fn usage(&self) -> f64 {
        if self.limit > Decimal::ZERO {
            (self.spent / self.limit).to_f64().unwrap_or(0.0)
        } else if self.spent > Decimal::ZERO {
            1.0
        } else {
            0.0
        }
    }
}

/// Totals, ranking and budget overrun for one owner's month of expenses.
///
/// Callers guarantee that all records share one owner and month. A category
/// without a budget has no limit to exceed and adds nothing to
/// `over_budget_total`; a budget without spend adds nothing either.
pub(crate) fn aggregate(expenses: &[Expense], budgets: &[Budget]) -> AggregationResult {
    debug_assert!(
        expenses.iter().all(|e| e.amount >= Decimal::ZERO),
        "expense amounts must be non-negative"
    );

    let category_totals = category_totals(expenses);
    let total_spent: Decimal = category_totals.iter().map(|c| c.total_amount).sum();

    let limits: HashMap<&str, Decimal> = budgets
        .iter()
        .map(|b| (b.category.as_str(), b.amount))
        .collect();
    let over_budget_total: Decimal = category_totals
        .iter()
        .filter_map(|c| {
            limits
                .get(c.category.as_str())
                .map(|limit| (c.total_amount - *limit).max(Decimal::ZERO))
        })
        .sum();

    AggregationResult {
        total_spent,
        top_category: category_totals.first().cloned(),
        category_totals,
        over_budget_total,
    }
}

/// Per-category sums, highest first, ties by name ascending.
pub(crate) fn category_totals(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let mut by_category: HashMap<&str, Decimal> = HashMap::new();
    for expense in expenses {
        *by_category.entry(expense.category.as_str()).or_default() += expense.amount;
    }

    let mut totals: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(category, total_amount)| CategoryTotal {
            category: category.to_string(),
            total_amount,
        })
        .collect();
    totals.sort_by(|a, b| {
        b.total_amount
            .cmp(&a.total_amount)
            .then_with(|| a.category.cmp(&b.category))
    });
    totals
}

/// Spend per calendar date, oldest first.
pub(crate) fn daily_totals(expenses: &[Expense]) -> Vec<DailyTotal> {
    let mut by_date: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for expense in expenses {
        *by_date.entry(expense.date).or_default() += expense.amount;
    }
    by_date
        .into_iter()
        .map(|(date, total_amount)| DailyTotal { date, total_amount })
        .collect()
}

/// One status line per budget, in the order the budgets were given.
pub(crate) fn budget_status(
    category_totals: &[CategoryTotal],
    budgets: &[Budget],
) -> Vec<BudgetStatus> {
    budgets
        .iter()
        .map(|budget| {
            let spent = category_totals
                .iter()
                .find(|c| c.category == budget.category)
                .map(|c| c.total_amount)
                .unwrap_or(Decimal::ZERO);
            BudgetStatus {
                category: budget.category.clone(),
                limit: budget.amount,
                spent,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests;
