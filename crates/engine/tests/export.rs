//! End-to-end export pipeline tests: delta stream in, CSV text out.

use async_trait::async_trait;
use serde_json::json;
use sheetlog_engine::{enrich, scan_changes, DeltaSource, Result};
use sheetlog_table::SheetContents;
use sheetlog_types::{Delta, DeltaPage};

struct PagedSource {
    pages: Vec<DeltaPage>,
}

#[async_trait]
impl DeltaSource for PagedSource {
    async fn delta_page(&self, cursor: Option<&str>) -> Result<DeltaPage> {
        let index = cursor.map_or(0, |c| c.parse::<usize>().unwrap());
        Ok(self.pages[index].clone())
    }
}

fn delta(value: serde_json::Value) -> Delta {
    serde_json::from_value(value).unwrap()
}

fn two_page_source() -> PagedSource {
    PagedSource {
        pages: vec![
            DeltaPage {
                results: vec![
                    delta(json!({
                        "Version": 1,
                        "User": "alice",
                        "App": "mobile",
                        "UserIp": "10.0.0.1",
                        "Timestamp": "2020-01-01T09:00:00Z",
                        "GeoLat": "47.6",
                        "GeoLong": "-122.3",
                        "Value": {"A": {"Party": "D", "XLastModified": "2020-01-01T08:59:00Z"}}
                    })),
                    delta(json!({
                        "Version": 2,
                        "User": "bob",
                        "Timestamp": "2020-01-03T10:00:00Z",
                        "Value": {"A": {"Party": "R"}, "C": {"Supporter": "yes"}}
                    })),
                ],
                next_page_token: Some("1".to_string()),
            },
            DeltaPage {
                results: vec![delta(json!({
                    "Version": 3,
                    "User": "carol",
                    "Timestamp": "2020-01-02T10:00:00Z",
                    "Value": {"D": {"Party": "I"}}
                }))],
                next_page_token: None,
            },
        ],
    }
}

#[tokio::test]
async fn test_history_csv_shape() {
    let scan = scan_changes(&two_page_source()).await.unwrap();
    let csv = scan.history.to_csv_string();

    let lines: Vec<&str> = csv.split("\r\n").collect();
    assert_eq!(
        lines[0],
        "Version,User,Lat,Long,Timestamp,UserIp,App,RecId,ChangeColumn,NewValue"
    );
    // 2 + 2 + 1 atomic changes, header included, no trailing terminator.
    assert_eq!(lines.len(), 6);
    assert!(!csv.ends_with("\r\n"));
    assert_eq!(
        lines[1],
        "1,alice,47.6,-122.3,2020-01-01T09:00:00Z,10.0.0.1,mobile,A,Party,D"
    );
}

#[tokio::test]
async fn test_enriched_snapshot_export() {
    let scan = scan_changes(&two_page_source()).await.unwrap();

    // Snapshot has A (edited), B (never edited, e.g. bulk-imported); the
    // summary for D (since deleted) must vanish.
    let mut snapshot = SheetContents::with_columns(["RecId", "Name"]);
    snapshot.push_row(["A", "Ada"]).unwrap();
    snapshot.push_row(["B", "Ben"]).unwrap();

    let enriched = enrich(&snapshot, &scan.summaries).unwrap();
    assert_eq!(enriched.row_count(), 2);

    // A: user last-write-wins to bob, dates span both edits, client
    // timestamp extracted from the XLastModified column.
    assert_eq!(enriched.cell("User", 0), Some("bob"));
    assert_eq!(enriched.cell("App", 0), Some("mobile"));
    assert_eq!(enriched.cell("IpAddress", 0), Some("10.0.0.1"));
    assert_eq!(enriched.cell("FirstDate", 0), Some("2020-01-01T09:00:00Z"));
    assert_eq!(enriched.cell("LastDate", 0), Some("2020-01-03T10:00:00Z"));
    assert_eq!(
        enriched.cell("ClientTimestamp", 0),
        Some("2020-01-01T08:59:00Z")
    );

    // B: all enrichment columns empty.
    for field in ["User", "App", "IpAddress", "FirstDate", "LastDate"] {
        assert_eq!(enriched.cell(field, 1), Some(""), "field {field}");
    }

    // D is gone.
    let rec_ids = enriched.column("RecId").unwrap();
    assert_eq!(rec_ids, ["A", "B"]);
}
