//! # sheetlog-client
//!
//! HTTP client for the remote collaborative sheet service.
//!
//! Covers the thin service surface the exports need: one-time-code login,
//! sheet metadata, full snapshot fetch, paginated delta history, the
//! server-side refresh trigger, child-sheet listing, and the rebase log.
//! Requests go over HTTP/2 when the server negotiates it, falling back to
//! HTTP/1.1.
//!
//! Transport and auth failures are fatal to the caller; this crate does no
//! retrying of its own.

mod auth;
mod client;
mod error;

pub use auth::{load_credential, save_credential, wait_for_credential};
pub use client::{fetch_all_deltas, LoginClient, SheetClient};
pub use error::{ClientError, Result};
