mod common;

use anyhow::Result;
use chrono::Month;
use common::{sheet, test_service, SCENARIO_CSV};
use tallyboard::application::{DashboardConfig, DashboardReport, DashboardService};
use tallyboard::domain::Period;
use tallyboard::io::{export_report_json, export_transactions_csv, Source};

#[tokio::test]
async fn test_export_period_transactions_csv() -> Result<()> {
    let csv = sheet(&[
        "2024-01-01,Initial,-,Seed,10000",
        "2024-02-03,Expense,Food,\"Lunch, team\",45.5",
        "2024-02-04,Expense,Food,Unknown,N/A",
    ]);
    let (service, _path, _temp) = test_service(&csv)?;
    let report = service.report(Period::new(2024, Month::February)).await?;

    let mut out = Vec::new();
    let count = export_transactions_csv(&report.transactions, &mut out)?;

    assert_eq!(count, 2);
    let text = String::from_utf8(out)?;
    assert_eq!(
        text,
        "Date,Type,Category,Description,Amount\n\
         2024-02-03,Expense,Food,\"Lunch, team\",45.50\n\
         2024-02-04,Expense,Food,Unknown,N/A\n"
    );

    Ok(())
}

#[tokio::test]
async fn test_export_report_json_round_trips() -> Result<()> {
    let (service, _path, _temp) = test_service(SCENARIO_CSV)?;
    let report = service.report(Period::new(2024, Month::January)).await?;

    let mut out = Vec::new();
    export_report_json(&report, &mut out)?;

    let value: serde_json::Value = serde_json::from_slice(&out)?;
    assert_eq!(value["summary"]["current_balance"], 1_380_000);
    assert_eq!(value["transactions"][1]["type"], "Income");

    let parsed: DashboardReport = serde_json::from_slice(&out)?;
    assert_eq!(parsed.summary, report.summary);

    Ok(())
}

#[test]
fn test_connect_rewrites_sharing_link() -> Result<()> {
    let service = DashboardService::connect(
        "https://docs.google.com/spreadsheets/d/sheet-id/edit?usp=sharing",
        DashboardConfig::default(),
    )?;

    assert_eq!(
        service.source(),
        &Source::Url("https://docs.google.com/spreadsheets/d/sheet-id/export?format=csv".into())
    );

    Ok(())
}

#[test]
fn test_connect_rejects_unusable_sheet_link() {
    let result = DashboardService::connect(
        "https://docs.google.com/spreadsheets/d/sheet-id/view",
        DashboardConfig::default(),
    );
    assert!(result.is_err());
}
