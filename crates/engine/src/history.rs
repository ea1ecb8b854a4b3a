//! Accumulates flattened changes into the history export table.

use crate::flatten::AtomicChange;
use sheetlog_table::SheetContents;

/// Column layout of the history export, matching the legacy files.
const HISTORY_COLUMNS: [&str; 10] = [
    "Version",
    "User",
    "Lat",
    "Long",
    "Timestamp",
    "UserIp",
    "App",
    "RecId",
    "ChangeColumn",
    "NewValue",
];

/// Row accumulator for the flattened change log.
///
/// Changes arrive in stream order and become one CSV row each; a delta
/// touching an R×C rectangle therefore contributes R·C rows sharing one
/// version number.
#[derive(Debug)]
pub struct HistoryBuilder {
    table: SheetContents,
}

impl Default for HistoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: SheetContents::with_columns(HISTORY_COLUMNS),
        }
    }

    /// Append one flattened change as a row.
    pub fn push(&mut self, change: &AtomicChange) {
        self.table
            .push_row([
                change.version.to_string(),
                change.user.clone(),
                change.geo_lat.clone(),
                change.geo_long.clone(),
                change.timestamp.clone(),
                change.user_ip.clone(),
                change.app.clone(),
                change.record_id.clone(),
                change.column_name.clone(),
                change.new_value.clone(),
            ])
            .expect("history table always has ten columns");
    }

    /// Number of rows accumulated so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.row_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.row_count() == 0
    }

    /// Consume the builder, yielding the finished table.
    #[must_use]
    pub fn finish(self) -> SheetContents {
        self.table
    }
}
