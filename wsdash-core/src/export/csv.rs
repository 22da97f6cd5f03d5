//! CSV exporter
//!
//! Semicolon-delimited, every value quoted, embedded quotes doubled.

use super::Record;

const DELIMITER: &str = ";";

/// Renders records as CSV
pub struct CsvExporter;

impl CsvExporter {
    /// Renders records with a header row
    ///
    /// The header is the union of field names in first-seen order; missing
    /// values are empty. Rows are joined by `\n` with no trailing newline.
    #[must_use]
    pub fn export(records: &[Record]) -> String {
        let headers = Self::headers(records);

        let mut lines = Vec::with_capacity(records.len() + 1);
        lines.push(
            headers
                .iter()
                .map(|h| Self::quote(h))
                .collect::<Vec<_>>()
                .join(DELIMITER),
        );

        for record in records {
            let row = headers
                .iter()
                .map(|header| {
                    let value = record
                        .iter()
                        .find(|(key, _)| key == header)
                        .map_or("", |(_, value)| value.as_str());
                    Self::quote(value)
                })
                .collect::<Vec<_>>()
                .join(DELIMITER);
            lines.push(row);
        }

        lines.join("\n")
    }

    /// Field names across all records, in first-seen order
    #[must_use]
    pub fn headers(records: &[Record]) -> Vec<String> {
        let mut headers: Vec<String> = Vec::new();
        for (key, _) in records.iter().flatten() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
        headers
    }

    /// Wraps a value in double quotes, doubling embedded quotes
    #[must_use]
    pub fn quote(value: &str) -> String {
        format!("\"{}\"", value.replace('"', "\"\""))
    }
}
