use anyhow::Result;
use std::io::Write;

use crate::application::{CategorySummary, DashboardReport, TransactionRow};
use crate::domain::{format_cents, BalancePoint};

/// Column header of the exported transactions table.
pub const TRANSACTION_COLUMNS: [&str; 5] = ["Date", "Type", "Category", "Description", "Amount"];

/// Write the period's transactions as CSV. Missing amounts are written as
/// they appeared in the source. Returns the number of rows written.
pub fn export_transactions_csv<W: Write>(rows: &[TransactionRow], writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(TRANSACTION_COLUMNS)?;

    for row in rows {
        let amount = match row.amount {
            Some(cents) => format_cents(cents),
            None => row.raw_amount.clone(),
        };
        csv_writer.write_record([
            row.date.format("%Y-%m-%d").to_string(),
            row.kind.clone(),
            row.category.clone(),
            row.description.clone(),
            amount,
        ])?;
    }

    csv_writer.flush()?;
    Ok(rows.len())
}

/// Write the headline figures as `metric,amount` rows.
pub fn export_summary_csv<W: Write>(report: &DashboardReport, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["metric", "amount"])?;

    let summary = &report.summary;
    for (metric, cents) in [
        ("initial_investment", summary.initial_investment),
        ("income_to_date", summary.income_to_date),
        ("expense_to_date", summary.expense_to_date),
        ("current_balance", summary.current_balance),
        ("month_income", report.monthly.income),
        ("month_expense", report.monthly.expense),
    ] {
        csv_writer.write_record([metric.to_string(), format_cents(cents)])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write both category breakdowns, income first, one row per category.
/// Returns the number of rows written.
pub fn export_categories_csv<W: Write>(
    income: &[CategorySummary],
    expense: &[CategorySummary],
    writer: W,
) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["type", "category", "total", "count", "percentage"])?;

    for (kind, categories) in [("income", income), ("expense", expense)] {
        for cat in categories {
            csv_writer.write_record([
                kind.to_string(),
                cat.category.clone(),
                format_cents(cat.total),
                cat.count.to_string(),
                format!("{:.2}", cat.percentage),
            ])?;
        }
    }

    csv_writer.flush()?;
    Ok(income.len() + expense.len())
}

/// Write the cumulative cashflow line as `date,cumulative_balance` rows.
pub fn export_cashflow_csv<W: Write>(points: &[BalancePoint], writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["date", "cumulative_balance"])?;

    for point in points {
        csv_writer.write_record([
            point.date.format("%Y-%m-%d").to_string(),
            format_cents(point.balance),
        ])?;
    }

    csv_writer.flush()?;
    Ok(points.len())
}

/// Write a full period report as pretty-printed JSON.
pub fn export_report_json<W: Write>(report: &DashboardReport, mut writer: W) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn row(amount: Option<i64>, raw: &str) -> TransactionRow {
        TransactionRow {
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            kind: "Expense".into(),
            category: "Food".into(),
            description: "Groceries, weekly".into(),
            amount,
            raw_amount: raw.into(),
        }
    }

    #[test]
    fn test_export_transactions_csv() {
        let mut out = Vec::new();
        let count =
            export_transactions_csv(&[row(Some(120_000), "1200"), row(None, "N/A")], &mut out)
                .unwrap();

        assert_eq!(count, 2);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Date,Type,Category,Description,Amount");
        assert_eq!(lines[1], "2024-01-05,Expense,Food,\"Groceries, weekly\",1200.00");
        assert_eq!(lines[2], "2024-01-05,Expense,Food,\"Groceries, weekly\",N/A");
    }

    #[test]
    fn test_export_categories_csv_quotes_free_text() {
        let food = CategorySummary {
            category: "Food, \"Dining\"".into(),
            total: 1200,
            count: 1,
            percentage: 100.0,
        };
        let mut out = Vec::new();
        let count = export_categories_csv(&[], &[food], &mut out).unwrap();
        assert_eq!(count, 1);

        let mut reader = csv::Reader::from_reader(out.as_slice());
        let records: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].len(), 5);
        assert_eq!(&records[0][0], "expense");
        assert_eq!(&records[0][1], "Food, \"Dining\"");
        assert_eq!(&records[0][2], "12.00");
        assert_eq!(&records[0][4], "100.00");
    }

    #[test]
    fn test_export_cashflow_csv() {
        let points = [
            BalancePoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                balance: 1_000_000,
            },
            BalancePoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                balance: -50,
            },
        ];
        let mut out = Vec::new();
        export_cashflow_csv(&points, &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "date,cumulative_balance\n2024-01-01,10000.00\n2024-01-10,-0.50\n"
        );
    }
}
