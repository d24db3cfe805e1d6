// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use anyhow::Result;
use tallyboard::application::{DashboardConfig, DashboardService};
use tallyboard::io::Source;
use tempfile::TempDir;

pub const HEADER: &str = "Date,Type,Category,Description,Amount (PKR)";

/// Ledger from the dashboard's worked example: seed money, one salary, one
/// food bill, all in January 2024.
pub const SCENARIO_CSV: &str = "Date,Type,Category,Description,Amount (PKR)
2024-01-01,Initial,-,Seed capital,10000
2024-01-05,Income,Salary,January pay,5000
2024-01-10,Expense,Food,Groceries,1200
";

/// Write `contents` to a CSV file inside a fresh temporary directory.
pub fn write_sheet(contents: &str) -> Result<(PathBuf, TempDir)> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("ledger.csv");
    std::fs::write(&path, contents)?;
    Ok((path, temp_dir))
}

/// Helper to create a service reading the given CSV contents from disk
pub fn test_service(contents: &str) -> Result<(DashboardService, PathBuf, TempDir)> {
    test_service_with(contents, DashboardConfig::default())
}

pub fn test_service_with(
    contents: &str,
    config: DashboardConfig,
) -> Result<(DashboardService, PathBuf, TempDir)> {
    let (path, temp_dir) = write_sheet(contents)?;
    let service = DashboardService::new(Source::File(path.clone()), config)?;
    Ok((service, path, temp_dir))
}

/// Build a sheet from data rows, prefixed with the standard header.
pub fn sheet(rows: &[&str]) -> String {
    let mut csv = String::from(HEADER);
    csv.push('\n');
    for row in rows {
        csv.push_str(row);
        csv.push('\n');
    }
    csv
}

pub fn rewrite_sheet(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents)?;
    Ok(())
}
