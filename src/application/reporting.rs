use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{
    add_cents, category_label, BalancePoint, Cents, Period, PeriodView, Transaction,
};

/// Everything the dashboard renders for a single period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub period: Period,
    pub currency: String,
    pub period_end: Option<NaiveDate>,
    pub summary: SummaryCards,
    pub monthly: MonthlySummary,
    pub income_categories: Vec<CategorySummary>,
    pub expense_categories: Vec<CategorySummary>,
    pub cashflow: Vec<BalancePoint>,
    pub transactions: Vec<TransactionRow>,
}

/// The four headline figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCards {
    pub initial_investment: Cents,
    pub income_to_date: Cents,
    pub expense_to_date: Cents,
    pub current_balance: Cents,
}

/// Income and expense within the selected month only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub income: Cents,
    pub expense: Cents,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub total: Cents,
    pub count: usize,
    pub percentage: f64,
}

/// A row of the transactions table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRow {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    pub description: String,
    pub amount: Option<Cents>,
    /// Source text, shown when `amount` is missing
    pub raw_amount: String,
}

impl From<&Transaction> for TransactionRow {
    fn from(tx: &Transaction) -> Self {
        Self {
            date: tx.date,
            kind: tx.transaction_type.to_string(),
            category: tx.category.clone(),
            description: tx.description.clone(),
            amount: tx.amount,
            raw_amount: tx.raw_amount.clone(),
        }
    }
}

impl DashboardReport {
    pub fn from_view(view: &PeriodView, currency: impl Into<String>) -> Self {
        Self {
            period: view.period,
            currency: currency.into(),
            period_end: view.period_end,
            summary: SummaryCards {
                initial_investment: view.initial_investment,
                income_to_date: view.income_to_date,
                expense_to_date: view.expense_to_date,
                current_balance: view.current_balance,
            },
            monthly: MonthlySummary {
                income: view.period_income,
                expense: view.period_expense,
            },
            income_categories: category_summaries(&view.income_by_category, &view.income),
            expense_categories: category_summaries(&view.expense_by_category, &view.expenses),
            cashflow: view.cumulative_balance.clone(),
            transactions: view.transactions.iter().map(TransactionRow::from).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// Category slices, largest first, with their share of the total.
fn category_summaries(
    totals: &BTreeMap<String, Cents>,
    rows: &[Transaction],
) -> Vec<CategorySummary> {
    let grand_total: Cents = totals.values().map(|t| t.saturating_abs()).fold(0, add_cents);

    let mut summaries: Vec<CategorySummary> = totals
        .iter()
        .map(|(category, &total)| {
            let count = rows
                .iter()
                .filter(|t| t.amount.is_some() && category_label(&t.category) == *category)
                .count();
            let percentage = if grand_total == 0 {
                0.0
            } else {
                total.saturating_abs() as f64 / grand_total as f64 * 100.0
            };
            CategorySummary {
                category: category.clone(),
                total,
                count,
                percentage,
            }
        })
        .collect();

    summaries.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
    summaries
}

#[cfg(test)]
mod tests {
    use chrono::Month;

    use super::*;
    use crate::domain::{aggregate, Ledger, TransactionType};

    fn tx(day: u32, kind: TransactionType, category: &str, amount: Option<Cents>) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            kind,
            category,
            "",
            amount,
            amount.map(|a| a.to_string()).unwrap_or_else(|| "N/A".into()),
        )
    }

    #[test]
    fn test_report_category_summaries() {
        let ledger = Ledger::from_transactions(
            vec![
                tx(1, TransactionType::Expense, "Rent", Some(75_000)),
                tx(2, TransactionType::Expense, "Food", Some(15_000)),
                tx(3, TransactionType::Expense, "Food", Some(10_000)),
                tx(4, TransactionType::Expense, "Food", None),
                tx(5, TransactionType::Income, "Salary", Some(200_000)),
            ],
            "EUR",
        );
        let view = aggregate(&ledger, Period::new(2024, Month::June));
        let report = DashboardReport::from_view(&view, ledger.currency());

        assert_eq!(report.currency, "EUR");
        assert_eq!(report.expense_categories.len(), 2);

        let rent = &report.expense_categories[0];
        assert_eq!(rent.category, "Rent");
        assert_eq!(rent.total, 75_000);
        assert_eq!(rent.count, 1);
        assert!((rent.percentage - 75.0).abs() < 0.001);

        let food = &report.expense_categories[1];
        assert_eq!(food.total, 25_000);
        assert_eq!(food.count, 2);

        assert_eq!(report.income_categories.len(), 1);
        assert!((report.income_categories[0].percentage - 100.0).abs() < 0.001);
        assert_eq!(report.transactions.len(), 5);
        assert_eq!(report.monthly.income, 200_000);
        assert_eq!(report.monthly.expense, 100_000);
    }

    #[test]
    fn test_transaction_row_serializes_type_column() {
        let row = TransactionRow::from(&tx(1, TransactionType::Income, "Salary", Some(500)));
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["type"], "Income");
        assert_eq!(json["amount"], 500);
    }
}
