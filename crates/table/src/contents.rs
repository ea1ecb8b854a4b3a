use crate::error::{Result, TableError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A column-oriented table: column name → ordered list of cell values.
///
/// Column order is insertion order and is preserved through serde, so a
/// table deserialized from the service renders its CSV header in the same
/// order the service sent the columns. All cells are strings; the service
/// has no richer cell model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetContents {
    columns: IndexMap<String, Vec<String>>,
}

impl SheetContents {
    /// Create an empty table with no columns.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table with the given empty columns, in order.
    pub fn with_columns<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = names
            .into_iter()
            .map(|name| (name.into(), Vec::new()))
            .collect();
        Self { columns }
    }

    /// Number of columns.
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows, defined as the length of the first column.
    ///
    /// Ragged tables only arise from caller error; no validation happens
    /// here, matching the exporter contract.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |(_, v)| v.len())
    }

    /// Whether the table has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in table order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Values of a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[String]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Cell at (column, row); `None` when either is out of range.
    #[must_use]
    pub fn cell(&self, name: &str, row: usize) -> Option<&str> {
        self.columns.get(name)?.get(row).map(String::as_str)
    }

    /// Append an empty column. Fails on a duplicate name.
    pub fn add_column(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(TableError::DuplicateColumnName { name });
        }
        self.columns.insert(name, Vec::new());
        Ok(())
    }

    /// Append a fully-populated column. Fails on a duplicate name.
    pub fn insert_column(&mut self, name: impl Into<String>, values: Vec<String>) -> Result<()> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(TableError::DuplicateColumnName { name });
        }
        self.columns.insert(name, values);
        Ok(())
    }

    /// Push one value onto an existing column.
    pub fn push(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let column = self
            .columns
            .get_mut(name)
            .ok_or_else(|| TableError::ColumnNotFound {
                name: name.to_string(),
            })?;
        column.push(value.into());
        Ok(())
    }

    /// Push one full row, one value per column in table order.
    pub fn push_row<I, S>(&mut self, row: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = row.into_iter().map(Into::into).collect();
        if values.len() != self.columns.len() {
            return Err(TableError::RowWidthMismatch {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        for (column, value) in self.columns.values_mut().zip(values) {
            column.push(value);
        }
        Ok(())
    }

    /// Iterate (name, values) pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.columns
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_columns_preserves_order() {
        let table = SheetContents::with_columns(["B", "A", "C"]);
        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(names, ["B", "A", "C"]);
    }

    #[test]
    fn test_push_row_and_access() {
        let mut table = SheetContents::with_columns(["RecId", "Name"]);
        table.push_row(["r1", "Alice"]).unwrap();
        table.push_row(["r2", "Bob"]).unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell("Name", 1), Some("Bob"));
        assert_eq!(table.cell("Name", 2), None);
    }

    #[test]
    fn test_push_row_width_mismatch() {
        let mut table = SheetContents::with_columns(["A", "B"]);
        let err = table.push_row(["only one"]).unwrap_err();
        assert!(matches!(
            err,
            TableError::RowWidthMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let mut table = SheetContents::with_columns(["A"]);
        assert!(table.add_column("A").is_err());
        assert!(table.insert_column("A", vec![]).is_err());
    }

    #[test]
    fn test_push_to_missing_column() {
        let mut table = SheetContents::new();
        assert!(matches!(
            table.push("nope", "x"),
            Err(TableError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn test_serde_object_of_arrays() {
        let json = r#"{"RecId": ["r1", "r2"], "Party": ["D", "R"]}"#;
        let table: SheetContents = serde_json::from_str(json).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("Party").unwrap(), ["D", "R"]);

        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(names, ["RecId", "Party"]);
    }

    #[test]
    fn test_row_count_of_empty_table() {
        assert_eq!(SheetContents::new().row_count(), 0);
    }
}
