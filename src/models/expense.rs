use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{ExpenseId, MonthKey, UserId};
use crate::error::ValidationError;

/// Payment methods offered when entering an expense by hand.
pub(crate) const PAYMENT_METHODS: &[&str] = &["Card", "Cash", "UPI", "Other"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Expense {
    /// Assigned by the store on insert.
    pub(crate) id: Option<ExpenseId>,
    pub(crate) owner_id: UserId,
    pub(crate) date: NaiveDate,
    pub(crate) category: String,
    pub(crate) description: String,
    pub(crate) amount: Decimal,
    pub(crate) payment: String,
}

impl Expense {
    pub(crate) fn new(
        owner_id: UserId,
        date: NaiveDate,
        category: &str,
        amount: Decimal,
    ) -> Result<Self, ValidationError> {
        let category = category.trim();
        if category.is_empty() {
            return Err(ValidationError::Empty("category"));
        }
        if amount < Decimal::ZERO {
            return Err(ValidationError::NegativeAmount(amount));
        }
        Ok(Self {
            id: None,
            owner_id,
            date,
            category: category.to_string(),
            description: String::new(),
            amount,
            payment: String::new(),
        })
    }

    pub(crate) fn with_description(mut self, description: &str) -> Self {
        self.description = description.trim().to_string();
        self
    }

    pub(crate) fn with_payment(mut self, payment: &str) -> Self {
        self.payment = payment.trim().to_string();
        self
    }

    pub(crate) fn month(&self) -> MonthKey {
        MonthKey::of(self.date)
    }
}

/// Canonical spelling of a known payment method, matched case-insensitively.
pub(crate) fn canonical_payment(input: &str) -> Option<&'static str> {
    let lower = input.trim().to_lowercase();
    PAYMENT_METHODS
        .iter()
        .copied()
        .find(|m| m.to_lowercase() == lower)
}
