use chrono::{DateTime, Month, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{parse_amount, Period, RawTable, Transaction, TransactionType};

pub const DATE_COLUMN: &str = "Date";
pub const TYPE_COLUMN: &str = "Type";
pub const CATEGORY_COLUMN: &str = "Category";
pub const DESCRIPTION_COLUMN: &str = "Description";
/// The amount header carries the currency unit, e.g. `Amount (PKR)`.
pub const AMOUNT_COLUMN_PREFIX: &str = "Amount (";

/// Malformed input found while normalizing a sheet, surfaced to callers as
/// `AppError::MalformedInput`. No partial ledger is ever returned alongside
/// one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Malformed input: missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Malformed input: unparseable date '{value}' on line {line}")]
    UnparseableDate { line: usize, value: String },
}

/// The full normalized, date-ordered sequence of transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    transactions: Vec<Transaction>,
    /// Unit named in the amount header, e.g. "PKR"
    currency: String,
}

struct Columns {
    date: usize,
    kind: usize,
    category: usize,
    description: usize,
    amount: usize,
}

impl Ledger {
    /// Build a ledger directly from already-normalized transactions.
    /// Rows are stably sorted by date.
    pub fn from_transactions(
        mut transactions: Vec<Transaction>,
        currency: impl Into<String>,
    ) -> Self {
        transactions.sort_by_key(|t| t.date);
        Self {
            transactions,
            currency: currency.into(),
        }
    }

    /// Turn a raw sheet export into a ledger.
    ///
    /// Fails as a whole if a required column is missing or any row carries a
    /// date that cannot be parsed. Non-numeric amounts do not fail: the row is
    /// kept with a missing amount. Rows made only of blank cells are skipped.
    pub fn normalize(table: &RawTable) -> Result<Self, LedgerError> {
        let (columns, currency) = resolve_columns(table)?;

        let mut transactions = Vec::with_capacity(table.rows.len());
        for (index, row) in table.rows.iter().enumerate() {
            let line = index + 2; // +2 for header and 0-indexing

            if row.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }

            let cell = |i: usize| row.get(i).map(String::as_str).unwrap_or("");

            let date_str = cell(columns.date);
            let date = parse_date(date_str).ok_or_else(|| LedgerError::UnparseableDate {
                line,
                value: date_str.to_string(),
            })?;

            let raw_amount = cell(columns.amount).trim();
            transactions.push(Transaction::new(
                date,
                TransactionType::parse(cell(columns.kind)),
                cell(columns.category).trim(),
                cell(columns.description).trim(),
                parse_amount(raw_amount),
                raw_amount,
            ));
        }

        Ok(Self::from_transactions(transactions, currency))
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Rows whose amount cell was not a number.
    pub fn missing_amount_count(&self) -> usize {
        self.transactions.iter().filter(|t| t.amount.is_none()).count()
    }

    /// Distinct years present, most recent first.
    pub fn available_years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.transactions.iter().map(|t| t.year).collect();
        years.sort_unstable_by(|a, b| b.cmp(a));
        years.dedup();
        years
    }

    /// Distinct months of `year`, in the order they first appear in the
    /// date-sorted ledger (chronological).
    pub fn available_months(&self, year: i32) -> Vec<Month> {
        let mut months = Vec::new();
        for tx in self.transactions.iter().filter(|t| t.year == year) {
            if !months.contains(&tx.month) {
                months.push(tx.month);
            }
        }
        months
    }

    /// Every selectable period, most recent year first and months in
    /// chronological order within a year.
    pub fn available_periods(&self) -> Vec<(i32, Vec<Month>)> {
        self.available_years()
            .into_iter()
            .map(|year| (year, self.available_months(year)))
            .collect()
    }

    /// Rows falling in the given period, in ledger order.
    pub fn filter(&self, period: Period) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|t| t.year == period.year && t.month == period.month)
            .collect()
    }
}

fn resolve_columns(table: &RawTable) -> Result<(Columns, String), LedgerError> {
    let mut missing = Vec::new();
    let mut require = |name: &str| {
        let index = table.column(name);
        if index.is_none() {
            missing.push(name.to_string());
        }
        index.unwrap_or_default()
    };

    let date = require(DATE_COLUMN);
    let kind = require(TYPE_COLUMN);
    let category = require(CATEGORY_COLUMN);
    let description = require(DESCRIPTION_COLUMN);

    let amount = table.find_column(|h| currency_from_header(h).is_some());
    if amount.is_none() {
        missing.push(format!("{}<unit>)", AMOUNT_COLUMN_PREFIX));
    }

    if !missing.is_empty() {
        return Err(LedgerError::MissingColumns(missing));
    }

    let amount = amount.unwrap_or_default();
    let currency = currency_from_header(table.headers[amount].trim())
        .unwrap_or_default()
        .to_string();

    Ok((
        Columns {
            date,
            kind,
            category,
            description,
            amount,
        },
        currency,
    ))
}

/// `Amount (PKR)` -> `PKR`.
fn currency_from_header(header: &str) -> Option<&str> {
    header
        .strip_prefix(AMOUNT_COLUMN_PREFIX)?
        .strip_suffix(')')
        .map(str::trim)
}

// Month-first for slashed dates, like most spreadsheet exports
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%b-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%m/%d/%Y %H:%M:%S"];

/// Parse a sheet date cell. Times, when present, are dropped.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            return Some(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Some(dt.date());
        }
    }

    DateTime::parse_from_rfc3339(input).ok().map(|dt| dt.date_naive())
}
