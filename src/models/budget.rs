use rust_decimal::Decimal;

use super::{MonthKey, UserId};
use crate::error::ValidationError;

/// Spending limit for one category in one month. Unique per
/// (owner, month, category); saving again replaces the amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Budget {
    pub(crate) owner_id: UserId,
    pub(crate) month: MonthKey,
    pub(crate) category: String,
    pub(crate) amount: Decimal,
}

impl Budget {
    pub(crate) fn new(
        owner_id: UserId,
        month: MonthKey,
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
            owner_id,
            month,
            category: category.to_string(),
            amount,
        })
    }
}
