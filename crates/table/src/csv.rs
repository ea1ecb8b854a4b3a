//! CSV rendering with the legacy export contract.
//!
//! The downstream consumers of these files expect the exact byte shape the
//! original exporter produced: comma-joined fields with no quoting or
//! escaping, CRLF row separators, and no terminator after the final row.
//! A stock CSV writer cannot be configured into that shape, so this stays
//! a small hand-rolled formatter.

use crate::contents::SheetContents;
use crate::error::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

impl SheetContents {
    /// Render the table as CSV text.
    ///
    /// Header row is the column names in table order. Row count is taken
    /// from the first column; shorter columns fill with empty fields.
    /// Embedded commas are not escaped (known limitation, kept for
    /// compatibility).
    #[must_use]
    pub fn to_csv_string(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        let mut lines = Vec::with_capacity(self.row_count() + 1);
        lines.push(self.column_names().collect::<Vec<_>>().join(","));

        for row in 0..self.row_count() {
            let fields: Vec<&str> = self
                .iter()
                .map(|(_, values)| values.get(row).map_or("", String::as_str))
                .collect();
            lines.push(fields.join(","));
        }

        lines.join("\r\n")
    }

    /// Write the table as CSV to a file, overwriting any existing content.
    pub fn save_as_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(self.to_csv_string().as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_csv_exact_shape() {
        let mut table = SheetContents::with_columns(["X", "Y"]);
        table.push_row(["1", "a"]).unwrap();
        table.push_row(["2", "b"]).unwrap();

        assert_eq!(table.to_csv_string(), "X,Y\r\n1,a\r\n2,b");
    }

    #[test]
    fn test_csv_empty_table() {
        assert_eq!(SheetContents::new().to_csv_string(), "");
    }

    #[test]
    fn test_csv_header_only() {
        let table = SheetContents::with_columns(["A", "B"]);
        assert_eq!(table.to_csv_string(), "A,B");
    }

    #[test]
    fn test_csv_no_quoting_of_commas() {
        let mut table = SheetContents::with_columns(["Note"]);
        table.push_row(["a,b"]).unwrap();
        assert_eq!(table.to_csv_string(), "Note\r\na,b");
    }

    #[test]
    fn test_csv_ragged_columns_use_first_column_length() {
        let mut table = SheetContents::new();
        table
            .insert_column("A", vec!["1".into(), "2".into()])
            .unwrap();
        table.insert_column("B", vec!["x".into()]).unwrap();

        assert_eq!(table.to_csv_string(), "A,B\r\n1,x\r\n2,");
    }

    #[test]
    fn test_save_as_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut table = SheetContents::with_columns(["X"]);
        table.push_row(["1"]).unwrap();
        table.save_as_csv(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "X\r\n1");
    }
}
