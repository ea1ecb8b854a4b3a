//! Joining a snapshot with aggregated summaries.

use crate::aggregate::RecordSummary;
use crate::error::{EngineError, Result};
use indexmap::IndexMap;
use sheetlog_table::SheetContents;

/// Key column joining snapshot rows to their summaries.
const KEY_COLUMN: &str = "RecId";

/// Append one column per summary field to a snapshot table.
///
/// Every snapshot row keeps its place; a record that was never edited
/// gets empty enrichment cells, and a summary whose record no longer
/// exists in the snapshot (deleted since) is dropped silently. When a
/// summary field name collides with an existing snapshot column, the
/// appended column takes an `Edit` prefix and the snapshot keeps the
/// plain name.
pub fn enrich(
    snapshot: &SheetContents,
    summaries: &IndexMap<String, RecordSummary>,
) -> Result<SheetContents> {
    let record_ids = snapshot
        .column(KEY_COLUMN)
        .ok_or_else(|| EngineError::MissingKeyColumn {
            name: KEY_COLUMN.to_string(),
        })?
        .to_vec();

    let mut enriched = snapshot.clone();
    for field in RecordSummary::FIELDS {
        let values: Vec<String> = record_ids
            .iter()
            .map(|record_id| {
                summaries
                    .get(record_id)
                    .and_then(|summary| summary.field(field))
                    .unwrap_or("")
                    .to_string()
            })
            .collect();

        let name = if enriched.column(field).is_some() {
            format!("Edit{field}")
        } else {
            field.to_string()
        };
        enriched.insert_column(name, values)?;
    }

    Ok(enriched)
}
