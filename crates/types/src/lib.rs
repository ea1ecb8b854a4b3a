//! # sheetlog-types
//!
//! Core type definitions shared across the sheetlog ecosystem.
//!
//! This crate holds the wire model for the remote sheet service (sheet
//! metadata, deltas, delta pages, child sheets) and the reserved
//! client-metadata column table, without any dependencies on higher-level
//! crates like table or client.

pub mod model;

pub use model::{
    ChildSheet, Credential, Delta, DeltaPage, RebaseEntry, SheetInfo, CLIENT_COLUMNS,
};
