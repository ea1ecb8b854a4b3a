//! Wire model for the remote sheet service.
//!
//! Field names follow the service's PascalCase JSON schema. Deltas carry
//! their cell rectangle as raw JSON; the engine validates it at the
//! flattening boundary rather than here.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Reserved column names that carry client-reported metadata inside an
/// ordinary delta payload, mapped to the summary field they populate.
///
/// The upstream schema smuggles client-side provenance through these
/// well-known column names instead of a dedicated channel, so the
/// aggregator has to recognize them by name.
pub const CLIENT_COLUMNS: &[(&str, &str)] = &[
    ("XLastModified", "ClientTimestamp"),
    ("XLat", "ClientLat"),
    ("XLong", "ClientLong"),
];

/// Metadata about one sheet, as returned by the info endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SheetInfo {
    pub name: String,
    #[serde(default)]
    pub parent_name: String,
    pub latest_version: i64,
    pub count_records: i64,
}

/// One unit of change history: a server-recorded edit touching a
/// rectangular block of (record, column) cells.
///
/// `value` maps record ids to column-name/new-value pairs. It is kept as
/// raw JSON because the service occasionally produces structurally invalid
/// rectangles, and those must surface as a single recoverable error during
/// flattening, not as a deserialization failure that kills the whole page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Delta {
    pub version: i64,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub app: String,
    #[serde(default)]
    pub user_ip: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub geo_lat: String,
    #[serde(default)]
    pub geo_long: String,
    #[serde(default)]
    pub value: JsonValue,
}

/// One page of delta history. A `None` continuation token marks the final
/// page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeltaPage {
    #[serde(default)]
    pub results: Vec<Delta>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A child sheet reference, as returned by the children endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChildSheet {
    pub sheet_id: String,
    pub name: String,
}

/// One entry of the server-side rebase log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RebaseEntry {
    pub version: i64,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub comment: String,
}

/// Persisted credential file contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Credential {
    pub auth_token: String,
    pub sheet_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_deserializes_pascal_case() {
        let json = r#"{
            "Version": 7,
            "User": "alice",
            "App": "canvass",
            "UserIp": "10.0.0.1",
            "Timestamp": "2020-01-02T03:04:05Z",
            "GeoLat": "47.6",
            "GeoLong": "-122.3",
            "Value": {"rec1": {"Party": "D"}}
        }"#;
        let delta: Delta = serde_json::from_str(json).unwrap();
        assert_eq!(delta.version, 7);
        assert_eq!(delta.user, "alice");
        assert_eq!(delta.value["rec1"]["Party"], "D");
    }

    #[test]
    fn test_delta_missing_optional_fields_default() {
        let delta: Delta = serde_json::from_str(r#"{"Version": 1}"#).unwrap();
        assert_eq!(delta.version, 1);
        assert!(delta.user.is_empty());
        assert!(delta.value.is_null());
    }

    #[test]
    fn test_delta_page_terminal_marker() {
        let page: DeltaPage =
            serde_json::from_str(r#"{"Results": [], "NextPageToken": null}"#).unwrap();
        assert!(page.results.is_empty());
        assert!(page.next_page_token.is_none());

        let page: DeltaPage =
            serde_json::from_str(r#"{"Results": [{"Version": 1}], "NextPageToken": "p2"}"#)
                .unwrap();
        assert_eq!(page.next_page_token.as_deref(), Some("p2"));
    }

    #[test]
    fn test_credential_round_trip() {
        let cred = Credential {
            auth_token: "tok".to_string(),
            sheet_id: "sheet-1".to_string(),
        };
        let json = serde_json::to_string(&cred).unwrap();
        assert!(json.contains("\"AuthToken\""));
        assert!(json.contains("\"SheetId\""));
        let back: Credential = serde_json::from_str(&json).unwrap();
        assert_eq!(back.auth_token, "tok");
        assert_eq!(back.sheet_id, "sheet-1");
    }

    #[test]
    fn test_client_columns_table() {
        let fields: Vec<&str> = CLIENT_COLUMNS.iter().map(|(_, f)| *f).collect();
        assert_eq!(fields, ["ClientTimestamp", "ClientLat", "ClientLong"]);
        assert!(CLIENT_COLUMNS.iter().any(|(c, _)| *c == "XLat"));
    }
}
