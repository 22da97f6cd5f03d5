//! JSON exporter

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::{ExportError, ExportResult, Record};

/// Serializes a record as an object, keeping field order
struct OrderedRecord<'a>(&'a Record);

impl Serialize for OrderedRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Renders records as a pretty-printed JSON array
pub struct JsonExporter;

impl JsonExporter {
    /// Renders records as an array of objects
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn export(records: &[Record]) -> ExportResult<String> {
        let ordered: Vec<OrderedRecord<'_>> = records.iter().map(OrderedRecord).collect();
        serde_json::to_string_pretty(&ordered)
            .map_err(|e| ExportError::Serialization(e.to_string()))
    }
}
