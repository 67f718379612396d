use chrono::{Datelike, Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Date formats accepted from user input and CSV files, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"];

/// A calendar month, e.g. `2024-03`. Scopes expense queries and budgets.
///
/// Stored as the first day of the month so every value is a valid date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub(crate) struct MonthKey(NaiveDate);

impl MonthKey {
    pub(crate) fn new(year: i32, month: u32) -> Result<Self, ValidationError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidMonth(format!("{year}-{month:02}")))
    }

    /// Parse `YYYY-MM` (a single-digit month is accepted).
    pub(crate) fn parse(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| ValidationError::InvalidMonth(trimmed.to_string()))
    }

    pub(crate) fn of(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    pub(crate) fn current() -> Self {
        Self::of(Local::now().date_naive())
    }

    /// Oldest month the month picker offers.
    pub(crate) fn earliest() -> Self {
        Self::of(NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or(NaiveDate::MIN))
    }

    /// Months from the current one back to [`MonthKey::earliest`], newest first.
    pub(crate) fn picker_range() -> Vec<Self> {
        Self::range_back_from(Self::current())
    }

    pub(crate) fn range_back_from(latest: Self) -> Vec<Self> {
        let earliest = Self::earliest();
        let mut months = Vec::new();
        let mut month = latest;
        while month >= earliest {
            months.push(month);
            let prev = month.prev();
            if prev == month {
                break;
            }
            month = prev;
        }
        months
    }

    pub(crate) fn year(&self) -> i32 {
        self.0.year()
    }

    pub(crate) fn month(&self) -> u32 {
        self.0.month()
    }

    pub(crate) fn next(&self) -> Self {
        self.0
            .checked_add_months(Months::new(1))
            .map(Self)
            .unwrap_or(*self)
    }

    pub(crate) fn prev(&self) -> Self {
        self.0
            .checked_sub_months(Months::new(1))
            .map(Self)
            .unwrap_or(*self)
    }

    pub(crate) fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    pub(crate) fn days_in_month(&self) -> u32 {
        let next = self.next();
        if next == *self {
            return 31;
        }
        (next.0 - self.0).num_days() as u32
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

impl std::str::FromStr for MonthKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MonthKey> for String {
    fn from(month: MonthKey) -> Self {
        month.to_string()
    }
}

/// Parse a calendar date, ignoring any trailing time component
/// (`2024-03-05 00:00:00`, `2024-03-05T10:00`).
pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = s.trim();
    let date_part = trimmed
        .split(|c: char| c == 'T' || c.is_whitespace())
        .next()
        .unwrap_or("");
    if date_part.is_empty() {
        return Err(ValidationError::InvalidDate(trimmed.to_string()));
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
        .ok_or_else(|| ValidationError::InvalidDate(trimmed.to_string()))
}
