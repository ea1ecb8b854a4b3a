//! # sheetlog-engine
//!
//! Change-log flattening and per-record aggregation.
//!
//! The engine consumes the paginated delta history of a sheet as a strict
//! sequential stream, expands each delta's cell rectangle into atomic
//! (record, column, value) changes, and folds those changes into one
//! provenance summary per record. Everything here is an explicit owned
//! structure threaded through the scan; there is no ambient state and no
//! concurrency, which is what keeps the last-write-wins rules correct
//! without synchronization.
//!
//! # Pipeline
//!
//! ```text
//! DeltaSource ── DeltaPager ── flatten ──┬── HistoryBuilder (history CSV)
//!                                        └── Aggregator ── enrich (snapshot join)
//! ```
//!
//! A malformed delta is skipped as a single recoverable event; transport
//! errors from the source abort the scan.

mod aggregate;
mod error;
mod flatten;
mod history;
mod join;
mod owners;
mod pager;
mod scan;

pub use aggregate::{Aggregator, RecordSummary};
pub use error::{EngineError, Result};
pub use flatten::{flatten, AtomicChange, FlattenError};
pub use history::HistoryBuilder;
pub use join::enrich;
pub use owners::{Owner, OwnerMap};
pub use pager::{DeltaPager, DeltaSource};
pub use scan::{scan_changes, ChangeScan};
