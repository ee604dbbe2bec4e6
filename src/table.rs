//! Tabular (mail-merge) input
//!
//! Batch mode reads one text value per row from a delimited file with a
//! header row; only the first column is used, in row order. Row order
//! defines output page order.

use std::path::Path;

use crate::error::{Error, Result};

/// Read the first-column values of a CSV file, in row order.
///
/// The first line is treated as a header and skipped. Fails with
/// [`Error::EmptyTable`] when there are no data rows, and with
/// [`Error::Table`] when a row has no columns at all.
pub fn read_text_rows(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let value = record
            .get(0)
            .ok_or_else(|| Error::Table(format!("row {} has no columns", i + 1)))?;
        rows.push(value.to_string());
    }

    if rows.is_empty() {
        return Err(Error::EmptyTable(path.to_path_buf()));
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_reads_first_column_in_order() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "names.csv", "name,dept\nAlice,Eng\nBob,Ops\nCarol,Eng\n");

        let rows = read_text_rows(&path).unwrap();
        assert_eq!(rows, vec!["Alice", "Bob", "Carol"]);
    }

    #[test]
    fn test_header_only_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "empty.csv", "name,dept\n");

        let result = read_text_rows(&path);
        assert!(matches!(result.unwrap_err(), Error::EmptyTable(_)));
    }

    #[test]
    fn test_empty_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "zero.csv", "");

        let result = read_text_rows(&path);
        assert!(matches!(result.unwrap_err(), Error::EmptyTable(_)));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = read_text_rows(&dir.path().join("nope.csv"));
        assert!(matches!(result.unwrap_err(), Error::Csv(_)));
    }

    #[test]
    fn test_empty_cell_is_preserved() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "blank.csv", "name\nAlice\n\"\"\nCarol\n");

        let rows = read_text_rows(&path).unwrap();
        assert_eq!(rows, vec!["Alice", "", "Carol"]);
    }
}
