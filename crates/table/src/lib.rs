//! Column-oriented table module for sheetlog
//!
//! Provides [`SheetContents`], the columnar table shape the remote service
//! speaks (a JSON object mapping column names to equal-length value
//! arrays), plus CSV and JSON rendering.
//!
//! # Examples
//!
//! ## Building a table column by column
//!
//! ```
//! use sheetlog_table::SheetContents;
//!
//! let mut table = SheetContents::with_columns(["RecId", "Party"]);
//! table.push_row(["r1", "D"]);
//! table.push_row(["r2", "R"]);
//!
//! assert_eq!(table.row_count(), 2);
//! assert_eq!(table.column("Party").unwrap(), ["D", "R"]);
//! ```
//!
//! ## Rendering CSV
//!
//! ```
//! use sheetlog_table::SheetContents;
//!
//! let mut table = SheetContents::with_columns(["X", "Y"]);
//! table.push_row(["1", "a"]);
//! table.push_row(["2", "b"]);
//!
//! assert_eq!(table.to_csv_string(), "X,Y\r\n1,a\r\n2,b");
//! ```

mod contents;
mod csv;
mod error;
mod json;

pub use contents::SheetContents;
pub use error::{Result, TableError};
