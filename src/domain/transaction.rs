use chrono::{Datelike, Month, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{Cents, Period};

/// Kind of ledger row, taken from the `Type` column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Starting balance; counts towards every to-date balance
    Initial,
    /// Money coming in
    Income,
    /// Money going out
    Expense,
    /// Anything else found in the sheet. Kept for display, ignored by sums.
    Other(String),
}

impl TransactionType {
    pub fn as_str(&self) -> &str {
        match self {
            TransactionType::Initial => "Initial",
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
            TransactionType::Other(s) => s,
        }
    }

    /// Matching ignores case and surrounding whitespace.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "initial" => TransactionType::Initial,
            "income" => TransactionType::Income,
            "expense" => TransactionType::Expense,
            _ => TransactionType::Other(trimmed.to_string()),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One normalized ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub transaction_type: TransactionType,
    pub category: String,
    pub description: String,
    /// `None` when the source cell was not a number
    pub amount: Option<Cents>,
    /// The amount cell as it appeared in the sheet
    pub raw_amount: String,
    pub year: i32,
    pub month: Month,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        transaction_type: TransactionType,
        category: impl Into<String>,
        description: impl Into<String>,
        amount: Option<Cents>,
        raw_amount: impl Into<String>,
    ) -> Self {
        Self {
            date,
            transaction_type,
            category: category.into(),
            description: description.into(),
            amount,
            raw_amount: raw_amount.into(),
            year: date.year(),
            month: month_of(date),
        }
    }

    pub fn period(&self) -> Period {
        Period::new(self.year, self.month)
    }

    pub fn is_initial(&self) -> bool {
        self.transaction_type == TransactionType::Initial
    }

    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }
}

pub(crate) fn month_of(date: NaiveDate) -> Month {
    // month() is always 1..=12
    Month::try_from(date.month() as u8).unwrap_or(Month::January)
}
