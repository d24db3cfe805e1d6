use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::domain::RawTable;

/// Read a CSV export into a raw table. The first record is the header row.
/// Ragged rows are accepted; missing trailing cells read as blank.
pub fn read_table<R: Read>(reader: R) -> Result<RawTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .context("CSV parse error in header row")?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for (line_num, result) in csv_reader.records().enumerate() {
        let line = line_num + 2; // +2 for header and 0-indexing
        let record = result.with_context(|| format!("CSV parse error on line {}", line))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable::new(headers, rows))
}

/// Read a CSV file from disk into a raw table.
pub fn read_table_file(path: &Path) -> Result<RawTable> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;
    read_table(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_table() {
        let csv = "Date,Type,Category,Description,Amount (PKR)\n\
                   2024-01-01,Initial,-,Seed,10000\n\
                   2024-01-05,Income,Salary,\"Pay, January\",5000\n";
        let table = read_table(csv.as_bytes()).unwrap();

        assert_eq!(
            table.headers,
            vec!["Date", "Type", "Category", "Description", "Amount (PKR)"]
        );
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][3], "Pay, January");
    }

    #[test]
    fn test_read_table_accepts_ragged_rows() {
        let csv = "Date,Type,Category,Description,Amount (USD)\n2024-01-01,Income\n";
        let table = read_table(csv.as_bytes()).unwrap();
        assert_eq!(table.rows[0], vec!["2024-01-01", "Income"]);
    }

    #[test]
    fn test_read_table_headers_only() {
        let csv = "Date,Type,Category,Description,Amount (USD)\n";
        let table = read_table(csv.as_bytes()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.headers.len(), 5);
    }

    #[test]
    fn test_read_table_file_missing() {
        let err = read_table_file(Path::new("/nonexistent/ledger.csv")).unwrap_err();
        assert!(err.to_string().contains("Failed to open input file"));
    }
}
