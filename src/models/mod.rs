mod budget;
pub(crate) mod category;
mod expense;
mod ids;
pub(crate) mod money;
mod month;
mod user;

pub(crate) use budget::Budget;
pub(crate) use expense::{canonical_payment, Expense, PAYMENT_METHODS};
pub(crate) use ids::{ExpenseId, UserId};
pub(crate) use month::{parse_date, MonthKey};
pub(crate) use user::{normalize_email, User, UserRecord};
