//! Delta flattening.
//!
//! A delta's `Value` rectangle maps record ids to column/value pairs; one
//! delta touching R records with C_r columns each flattens into Σ C_r
//! atomic changes, every one carrying the delta's shared provenance fields
//! verbatim.

use serde_json::Value as JsonValue;
use sheetlog_types::Delta;
use thiserror::Error;

/// One flattened (record, column, value) edit extracted from a delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomicChange {
    pub version: i64,
    pub user: String,
    pub app: String,
    pub user_ip: String,
    pub timestamp: String,
    pub geo_lat: String,
    pub geo_long: String,
    pub record_id: String,
    pub column_name: String,
    pub new_value: String,
}

/// A structurally invalid delta payload.
///
/// Always recoverable: the scan skips the offending delta and continues
/// with the rest of the stream.
#[derive(Error, Debug)]
pub enum FlattenError {
    #[error("delta {version}: Value is not a record map (found {found})")]
    NotRecordMap { version: i64, found: &'static str },

    #[error("delta {version}: record '{record_id}' is not a column map (found {found})")]
    NotColumnMap {
        version: i64,
        record_id: String,
        found: &'static str,
    },

    #[error("delta {version}: cell '{record_id}'.'{column}' is not a scalar (found {found})")]
    NotScalarCell {
        version: i64,
        record_id: String,
        column: String,
        found: &'static str,
    },
}

fn kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Expand one delta into its atomic changes.
///
/// The whole rectangle is validated before anything is emitted, so a
/// partially-malformed delta contributes no changes at all rather than a
/// truncated prefix. Scalar cells coerce to their string form; `null`
/// becomes the empty string; arrays and nested objects are malformed.
pub fn flatten(delta: &Delta) -> Result<Vec<AtomicChange>, FlattenError> {
    let records = delta.value.as_object().ok_or(FlattenError::NotRecordMap {
        version: delta.version,
        found: kind(&delta.value),
    })?;

    let mut changes = Vec::new();
    for (record_id, cells) in records {
        let cells = cells.as_object().ok_or_else(|| FlattenError::NotColumnMap {
            version: delta.version,
            record_id: record_id.clone(),
            found: kind(cells),
        })?;

        for (column_name, cell) in cells {
            let new_value = match cell {
                JsonValue::String(s) => s.clone(),
                JsonValue::Null => String::new(),
                JsonValue::Bool(b) => b.to_string(),
                JsonValue::Number(n) => n.to_string(),
                other => {
                    return Err(FlattenError::NotScalarCell {
                        version: delta.version,
                        record_id: record_id.clone(),
                        column: column_name.clone(),
                        found: kind(other),
                    })
                }
            };

            changes.push(AtomicChange {
                version: delta.version,
                user: delta.user.clone(),
                app: delta.app.clone(),
                user_ip: delta.user_ip.clone(),
                timestamp: delta.timestamp.clone(),
                geo_lat: delta.geo_lat.clone(),
                geo_long: delta.geo_long.clone(),
                record_id: record_id.clone(),
                column_name: column_name.clone(),
                new_value,
            });
        }
    }

    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn delta_with_value(value: serde_json::Value) -> Delta {
        serde_json::from_value(json!({
            "Version": 12,
            "User": "alice",
            "App": "canvass",
            "UserIp": "10.1.2.3",
            "Timestamp": "2020-06-01T12:00:00Z",
            "GeoLat": "47.6",
            "GeoLong": "-122.3",
            "Value": value
        }))
        .unwrap()
    }

    #[test]
    fn test_cardinality_and_shared_fields() {
        // 2 records, 2 + 1 columns: exactly 3 changes.
        let delta = delta_with_value(json!({
            "r1": {"Party": "D", "Supporter": "yes"},
            "r2": {"Party": "R"}
        }));
        let changes = flatten(&delta).unwrap();
        assert_eq!(changes.len(), 3);

        for change in &changes {
            assert_eq!(change.version, 12);
            assert_eq!(change.user, "alice");
            assert_eq!(change.app, "canvass");
            assert_eq!(change.user_ip, "10.1.2.3");
            assert_eq!(change.timestamp, "2020-06-01T12:00:00Z");
            assert_eq!(change.geo_lat, "47.6");
            assert_eq!(change.geo_long, "-122.3");
        }

        let r2: Vec<_> = changes.iter().filter(|c| c.record_id == "r2").collect();
        assert_eq!(r2.len(), 1);
        assert_eq!(r2[0].column_name, "Party");
        assert_eq!(r2[0].new_value, "R");
    }

    #[test]
    fn test_one_by_one_delta_yields_one_change() {
        let delta = delta_with_value(json!({"r9": {"Phone": "555-1234"}}));
        let changes = flatten(&delta).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].record_id, "r9");
    }

    #[test]
    fn test_scalar_coercion() {
        let delta = delta_with_value(json!({
            "r1": {"Count": 3, "Active": true, "Cleared": null}
        }));
        let changes = flatten(&delta).unwrap();
        let value_of = |column: &str| {
            changes
                .iter()
                .find(|c| c.column_name == column)
                .unwrap()
                .new_value
                .clone()
        };
        assert_eq!(value_of("Count"), "3");
        assert_eq!(value_of("Active"), "true");
        assert_eq!(value_of("Cleared"), "");
    }

    #[test]
    fn test_value_not_an_object() {
        let delta = delta_with_value(json!(["not", "a", "map"]));
        assert!(matches!(
            flatten(&delta),
            Err(FlattenError::NotRecordMap {
                version: 12,
                found: "array"
            })
        ));
    }

    #[test]
    fn test_record_not_a_column_map() {
        let delta = delta_with_value(json!({"r1": "scalar"}));
        assert!(matches!(
            flatten(&delta),
            Err(FlattenError::NotColumnMap { .. })
        ));
    }

    #[test]
    fn test_partially_malformed_rectangle_emits_nothing() {
        // One good record, one record whose cell is a nested object: the
        // whole delta is rejected, not just the bad cell.
        let delta = delta_with_value(json!({
            "a_good": {"Party": "D"},
            "b_bad": {"Extra": {"nested": true}}
        }));
        assert!(matches!(
            flatten(&delta),
            Err(FlattenError::NotScalarCell { .. })
        ));
    }

    #[test]
    fn test_empty_rectangle_is_valid_and_empty() {
        let delta = delta_with_value(json!({}));
        assert!(flatten(&delta).unwrap().is_empty());
    }
}
