//! JSON rendering for [`SheetContents`].
//!
//! Renders a table either in its columnar wire shape (object of arrays) or
//! as an array of row objects.

use crate::contents::SheetContents;
use crate::error::{Result, TableError};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

impl SheetContents {
    /// Render the table as a pretty-printed JSON object of arrays (the
    /// columnar shape the service itself uses).
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| TableError::Serialize(e.to_string()))
    }

    /// Render the table as a JSON array of row objects.
    pub fn to_json_records(&self) -> Result<String> {
        let mut rows = Vec::with_capacity(self.row_count());
        for row in 0..self.row_count() {
            let mut object = Map::new();
            for (name, values) in self.iter() {
                let cell = values.get(row).map_or("", String::as_str);
                object.insert(name.to_string(), Value::String(cell.to_string()));
            }
            rows.push(Value::Object(object));
        }
        serde_json::to_string_pretty(&rows).map_err(|e| TableError::Serialize(e.to_string()))
    }

    /// Write the columnar JSON form to a file, overwriting any existing
    /// content.
    pub fn save_as_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(self.to_json_string()?.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}
