//! Per-record aggregation of atomic changes.
//!
//! Folds the flattened change stream into one [`RecordSummary`] per
//! record. The update rules are asymmetric on purpose: identity-ish
//! fields (`IpAddress` and the client-reported trio) keep the first
//! non-empty value ever observed, while activity fields (`User`, `App`,
//! the geolocation pair) track the latest non-empty value under version
//! order. `FirstDate`/`LastDate` are the calendar min/max of the
//! server-assigned timestamps.

use crate::flatten::AtomicChange;
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use indexmap::IndexMap;
use sheetlog_types::CLIENT_COLUMNS;

/// Aggregated provenance and timing metadata for one record.
///
/// All fields are strings, empty meaning "never observed". Field names
/// (as exported) are listed in [`RecordSummary::FIELDS`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSummary {
    pub user: String,
    pub app: String,
    pub ip_address: String,
    pub first_date: String,
    pub last_date: String,
    pub lat: String,
    pub long: String,
    pub client_timestamp: String,
    pub client_lat: String,
    pub client_long: String,
}

impl RecordSummary {
    /// Exported field names, in export column order.
    pub const FIELDS: [&'static str; 10] = [
        "User",
        "App",
        "IpAddress",
        "FirstDate",
        "LastDate",
        "Lat",
        "Long",
        "ClientTimestamp",
        "ClientLat",
        "ClientLong",
    ];

    /// Value of an exported field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "User" => &self.user,
            "App" => &self.app,
            "IpAddress" => &self.ip_address,
            "FirstDate" => &self.first_date,
            "LastDate" => &self.last_date,
            "Lat" => &self.lat,
            "Long" => &self.long,
            "ClientTimestamp" => &self.client_timestamp,
            "ClientLat" => &self.client_lat,
            "ClientLong" => &self.client_long,
            _ => return None,
        };
        Some(value)
    }

    fn client_field_mut(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "ClientTimestamp" => Some(&mut self.client_timestamp),
            "ClientLat" => Some(&mut self.client_lat),
            "ClientLong" => Some(&mut self.client_long),
            _ => None,
        }
    }

    fn absorb(&mut self, change: &AtomicChange) {
        // Field order matters and is part of the contract: App, User, the
        // geolocation pair, Timestamp, IpAddress, then the client columns.
        if !change.app.is_empty() {
            self.app = change.app.clone();
        }
        if !change.user.is_empty() {
            self.user = change.user.clone();
        }
        // The pair is only written when Lat is present and not the "0"
        // sentinel, so a fix-less edit never wipes a recorded position.
        if !change.geo_lat.is_empty() && change.geo_lat != "0" {
            self.lat = change.geo_lat.clone();
            self.long = change.geo_long.clone();
        }
        self.absorb_timestamp(&change.timestamp);
        if self.ip_address.is_empty() && !change.user_ip.is_empty() {
            self.ip_address = change.user_ip.clone();
        }

        // Reserved column names smuggle client-reported metadata through
        // the ordinary cell payload; first non-empty value wins.
        for (column, field) in CLIENT_COLUMNS {
            if change.column_name == *column {
                if let Some(slot) = self.client_field_mut(field) {
                    if slot.is_empty() && !change.new_value.is_empty() {
                        *slot = change.new_value.clone();
                    }
                }
            }
        }
    }

    fn absorb_timestamp(&mut self, timestamp: &str) {
        // Unparsable timestamps skip the min/max update only; every other
        // field of the change still applies.
        let Some(parsed) = parse_timestamp(timestamp) else {
            if !timestamp.is_empty() {
                tracing::debug!(%timestamp, "skipping unparsable timestamp");
            }
            return;
        };

        match parse_timestamp(&self.first_date) {
            Some(first) if parsed >= first => {}
            _ => self.first_date = timestamp.to_string(),
        }
        match parse_timestamp(&self.last_date) {
            Some(last) if parsed <= last => {}
            _ => self.last_date = timestamp.to_string(),
        }
    }
}

/// Parse an ISO-8601 timestamp, accepting an offset-less form as UTC.
fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).ok().or_else(|| {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc().fixed_offset())
    })
}

/// Folds atomic changes into per-record summaries.
///
/// An explicit owned accumulator, created at the top of an export run and
/// threaded through every processed page. `absorb` never fails; the
/// finalized map iterates records in first-encountered order.
#[derive(Debug, Default)]
pub struct Aggregator {
    summaries: IndexMap<String, RecordSummary>,
}

impl Aggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one change into the summary for its record, creating the
    /// summary on first encounter.
    pub fn absorb(&mut self, change: &AtomicChange) {
        self.summaries
            .entry(change.record_id.clone())
            .or_default()
            .absorb(change);
    }

    /// Number of distinct records seen so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    /// Consume the aggregator, yielding record id → summary in
    /// first-encountered order.
    #[must_use]
    pub fn finalize(self) -> IndexMap<String, RecordSummary> {
        self.summaries
    }
}
