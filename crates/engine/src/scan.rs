//! The export scan: one sequential pass over the delta stream.

use crate::aggregate::{Aggregator, RecordSummary};
use crate::error::Result;
use crate::flatten::flatten;
use crate::history::HistoryBuilder;
use crate::pager::{DeltaPager, DeltaSource};
use indexmap::IndexMap;
use sheetlog_table::SheetContents;

/// Everything one pass over the change log produces.
pub struct ChangeScan {
    /// Flattened per-cell change log, one row per atomic change.
    pub history: SheetContents,
    /// Per-record provenance summaries, in first-edited order.
    pub summaries: IndexMap<String, RecordSummary>,
    /// Count of malformed deltas that were skipped.
    pub skipped: usize,
}

/// Drain a delta source and fold it into the history table and the
/// per-record summaries in a single pass.
///
/// Deltas are consumed strictly in page order; each one is flattened and
/// its changes pushed into both accumulators before the next delta is
/// touched, which preserves the version-order assumptions of the
/// aggregation rules. A malformed delta is skipped whole (it contributes
/// neither history rows nor summary updates) and counted; a source error
/// aborts the scan with whatever was already written left in place.
pub async fn scan_changes<S: DeltaSource>(source: &S) -> Result<ChangeScan> {
    let mut pager = DeltaPager::new(source);
    let mut history = HistoryBuilder::new();
    let mut aggregator = Aggregator::new();
    let mut skipped = 0usize;

    while let Some(delta) = pager.next_delta().await? {
        let changes = match flatten(&delta) {
            Ok(changes) => changes,
            Err(e) => {
                // Malformed input. Skip it and keep going.
                tracing::warn!(version = delta.version, error = %e, "skipping malformed delta");
                skipped += 1;
                continue;
            }
        };

        for change in &changes {
            history.push(change);
            aggregator.absorb(change);
        }
    }

    tracing::debug!(
        rows = history.len(),
        records = aggregator.len(),
        skipped,
        "change scan complete"
    );

    Ok(ChangeScan {
        history: history.finish(),
        summaries: aggregator.finalize(),
        skipped,
    })
}
