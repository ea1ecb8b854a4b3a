//! Deepest-owner mapping for child-sheet traversal.

use indexmap::IndexMap;
use sheetlog_table::SheetContents;

/// The child sheet currently owning a record, with its traversal depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub depth: usize,
    pub sheet_id: String,
    pub sheet_name: String,
}

/// Folds child-sheet membership into a record → deepest-owner map.
///
/// Sheets claim their records in traversal order: a deeper sheet replaces
/// a shallower owner, and a sheet at the same depth never displaces the
/// one visited first. Records iterate in first-claimed order.
#[derive(Debug, Default)]
pub struct OwnerMap {
    owners: IndexMap<String, Owner>,
}

impl OwnerMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim every record of one sheet at the given depth.
    pub fn claim<'a, I>(&mut self, depth: usize, sheet_id: &str, sheet_name: &str, record_ids: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for record_id in record_ids {
            match self.owners.get(record_id) {
                Some(owner) if owner.depth >= depth => {}
                _ => {
                    self.owners.insert(
                        record_id.to_string(),
                        Owner {
                            depth,
                            sheet_id: sheet_id.to_string(),
                            sheet_name: sheet_name.to_string(),
                        },
                    );
                }
            }
        }
    }

    /// Current owner of a record, if any sheet has claimed it.
    #[must_use]
    pub fn owner(&self, record_id: &str) -> Option<&Owner> {
        self.owners.get(record_id)
    }

    /// Number of records claimed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Consume the map, yielding the `RecId,SheetId,SheetName` export
    /// table in first-claimed order.
    #[must_use]
    pub fn into_table(self) -> SheetContents {
        let mut table = SheetContents::with_columns(["RecId", "SheetId", "SheetName"]);
        for (record_id, owner) in &self.owners {
            table
                .push_row([
                    record_id.as_str(),
                    owner.sheet_id.as_str(),
                    owner.sheet_name.as_str(),
                ])
                .expect("owner table always has three columns");
        }
        table
    }
}
