use rust_decimal::Decimal;

use crate::aggregate::{self, AggregationResult, BudgetStatus, DailyTotal};
use crate::auth::Session;
use crate::error::StoreError;
use crate::models::{Budget, Expense, MonthKey};
use crate::store::{ExpenseFilter, Store};

/// Everything the dashboard and budget views show for one month.
#[derive(Debug, Clone, Default)]
pub(crate) struct MonthlyReport {
    pub(crate) month: Option<MonthKey>,
    pub(crate) expenses: Vec<Expense>,
    pub(crate) budgets: Vec<Budget>,
    pub(crate) summary: AggregationResult,
    pub(crate) daily: Vec<DailyTotal>,
}

impl MonthlyReport {
    pub(crate) fn load(
        store: &dyn Store,
        session: &Session,
        month: MonthKey,
    ) -> Result<Self, StoreError> {
        let expenses = store.load_expenses(session.owner(), &ExpenseFilter::month(month))?;
        let budgets = store.get_budgets(session.owner(), month)?;
        Ok(Self::from_records(month, expenses, budgets))
    }

    pub(crate) fn from_records(month: MonthKey, expenses: Vec<Expense>, budgets: Vec<Budget>) -> Self {
        let summary = aggregate::aggregate(&expenses, &budgets);
        let daily = aggregate::daily_totals(&expenses);
        Self {
            month: Some(month),
            expenses,
            budgets,
            summary,
            daily,
        }
    }

    pub(crate) fn expense_count(&self) -> usize {
        self.expenses.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    pub(crate) fn budget_status(&self) -> Vec<BudgetStatus> {
        aggregate::budget_status(&self.summary.category_totals, &self.budgets)
    }

    /// Sum of all budget limits for the month.
    pub(crate) fn total_budgeted(&self) -> Decimal {
        self.budgets.iter().map(|b| b.amount).sum()
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
