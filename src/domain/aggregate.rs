use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{add_cents, Cents, Ledger, Period, Transaction};

/// Category label used for rows whose category cell is blank.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// How to date the to-date sums when the selected period has no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyPeriodPolicy {
    /// No period end: income and expense to date are zero, so the balance
    /// equals the initial investment.
    #[default]
    Zero,
    /// Use the last day of the selected month as the period end, carrying
    /// earlier activity forward.
    MonthEnd,
}

/// One point of the within-period cashflow line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalancePoint {
    pub date: NaiveDate,
    pub balance: Cents,
}

/// Everything the dashboard shows for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodView {
    pub period: Period,
    /// Latest date among the period's rows; `None` for an empty period
    /// under [`EmptyPeriodPolicy::Zero`].
    pub period_end: Option<NaiveDate>,
    pub transactions: Vec<Transaction>,
    pub income: Vec<Transaction>,
    pub expenses: Vec<Transaction>,
    pub initial_investment: Cents,
    pub income_to_date: Cents,
    pub expense_to_date: Cents,
    pub current_balance: Cents,
    /// Income within the period only
    pub period_income: Cents,
    /// Expense within the period only, as stored (signed)
    pub period_expense: Cents,
    pub income_by_category: BTreeMap<String, Cents>,
    /// Absolute value of each category's sum
    pub expense_by_category: BTreeMap<String, Cents>,
    pub cumulative_balance: Vec<BalancePoint>,
}

impl PeriodView {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// Aggregate a period using the default empty-period convention.
pub fn aggregate(ledger: &Ledger, period: Period) -> PeriodView {
    aggregate_with(ledger, period, EmptyPeriodPolicy::default())
}

/// Derive the period view. Never fails: empty ledgers and empty periods
/// produce empty collections, and rows with missing amounts add nothing to
/// any sum.
pub fn aggregate_with(ledger: &Ledger, period: Period, policy: EmptyPeriodPolicy) -> PeriodView {
    let transactions: Vec<Transaction> = ledger.filter(period).into_iter().cloned().collect();
    let income = subset(&transactions, Transaction::is_income);
    let expenses = subset(&transactions, Transaction::is_expense);

    let period_end = match transactions.iter().map(|t| t.date).max() {
        Some(end) => Some(end),
        None => match policy {
            EmptyPeriodPolicy::Zero => None,
            EmptyPeriodPolicy::MonthEnd => period.last_day(),
        },
    };

    let all = ledger.transactions();
    let initial_investment = sum_amounts(all.iter().filter(|t| t.is_initial()));
    let (income_to_date, expense_to_date) = match period_end {
        Some(end) => (
            sum_amounts(all.iter().filter(|t| t.is_income() && t.date <= end)),
            sum_amounts(all.iter().filter(|t| t.is_expense() && t.date <= end)),
        ),
        None => (0, 0),
    };

    let mut expense_by_category = sum_by_category(&expenses);
    for total in expense_by_category.values_mut() {
        *total = total.saturating_abs();
    }

    PeriodView {
        period,
        period_end,
        initial_investment,
        income_to_date,
        expense_to_date,
        current_balance: add_cents(initial_investment, income_to_date)
            .saturating_sub(expense_to_date),
        period_income: sum_amounts(income.iter()),
        period_expense: sum_amounts(expenses.iter()),
        income_by_category: sum_by_category(&income),
        expense_by_category,
        cumulative_balance: running_balance(&transactions),
        transactions,
        income,
        expenses,
    }
}

/// Sum of the amounts present; missing amounts are skipped. Clamps at the
/// `i64` bounds rather than wrapping.
pub fn sum_amounts<'a>(transactions: impl Iterator<Item = &'a Transaction>) -> Cents {
    transactions.filter_map(|t| t.amount).fold(0, add_cents)
}

/// Per-category sums. A category only appears if at least one of its rows
/// has an amount.
pub fn sum_by_category(transactions: &[Transaction]) -> BTreeMap<String, Cents> {
    let mut totals = BTreeMap::new();
    for tx in transactions {
        if let Some(amount) = tx.amount {
            let total = totals.entry(category_label(&tx.category)).or_insert(0);
            *total = add_cents(*total, amount);
        }
    }
    totals
}

/// Running total over the given rows in date order, starting from zero.
/// Rows are expected to be date-sorted already (ledger order).
pub fn running_balance(transactions: &[Transaction]) -> Vec<BalancePoint> {
    let mut balance: Cents = 0;
    transactions
        .iter()
        .map(|tx| {
            balance = add_cents(balance, tx.amount.unwrap_or(0));
            BalancePoint {
                date: tx.date,
                balance,
            }
        })
        .collect()
}

fn subset(transactions: &[Transaction], pred: fn(&Transaction) -> bool) -> Vec<Transaction> {
    transactions.iter().filter(|t| pred(t)).cloned().collect()
}

/// Grouping key for a category cell; blanks become [`UNCATEGORIZED`].
pub fn category_label(category: &str) -> String {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        UNCATEGORIZED.to_string()
    } else {
        trimmed.to_string()
    }
}
