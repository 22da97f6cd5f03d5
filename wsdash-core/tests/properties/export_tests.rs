//! Property tests for CSV and JSON export

use proptest::prelude::*;
use wsdash_core::export::{CsvExporter, ExportFormat, Record, render};

/// Strategy for records sharing a small set of field names
fn records_strategy() -> impl Strategy<Value = Vec<Record>> {
    proptest::collection::vec(
        proptest::collection::vec(
            (
                prop_oneof![Just("temp"), Just("hum"), Just("note"), Just("unit")],
                "[a-zA-Z0-9 ;\"]{0,12}",
            ),
            0..4,
        )
        .prop_map(|pairs| {
            let mut record: Record = vec![("Timestamp".to_string(), "N/A".to_string())];
            for (key, value) in pairs {
                if !record.iter().any(|(k, _)| k == key) {
                    record.push((key.to_string(), value));
                }
            }
            record
        }),
        1..8,
    )
}

/// Splits one CSV row produced by the exporter back into values
fn split_row(row: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut chars = row.chars().peekable();
    let mut quoted = false;
    while let Some(c) = chars.next() {
        match (c, quoted) {
            ('"', false) => quoted = true,
            ('"', true) if chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            ('"', true) => quoted = false,
            (';', false) => values.push(std::mem::take(&mut current)),
            (c, _) => current.push(c),
        }
    }
    values.push(current);
    values
}

proptest! {
    /// Property: CSV has one header line plus one line per record
    #[test]
    fn csv_line_count(records in records_strategy()) {
        let csv = render(&records, ExportFormat::Csv).unwrap();
        prop_assert_eq!(csv.split('\n').count(), records.len() + 1);
        prop_assert!(!csv.ends_with('\n'));
    }

    /// Property: Every CSV row has one value per header and the values read back
    #[test]
    fn csv_rows_align_with_header(records in records_strategy()) {
        let headers = CsvExporter::headers(&records);
        let csv = render(&records, ExportFormat::Csv).unwrap();
        let mut lines = csv.split('\n');

        prop_assert_eq!(split_row(lines.next().unwrap()), headers.clone());
        for (record, line) in records.iter().zip(lines) {
            let values = split_row(line);
            prop_assert_eq!(values.len(), headers.len());
            for (header, value) in headers.iter().zip(&values) {
                let expected = record
                    .iter()
                    .find(|(k, _)| k == header)
                    .map_or("", |(_, v)| v.as_str());
                prop_assert_eq!(value.as_str(), expected);
            }
        }
    }

    /// Property: The CSV header starts with the timestamp column
    #[test]
    fn csv_header_starts_with_timestamp(records in records_strategy()) {
        let headers = CsvExporter::headers(&records);
        prop_assert_eq!(headers[0].as_str(), "Timestamp");
    }

    /// Property: JSON output parses as an array of objects with the same fields
    #[test]
    fn json_matches_records(records in records_strategy()) {
        let text = render(&records, ExportFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        let array = parsed.as_array().unwrap();
        prop_assert_eq!(array.len(), records.len());

        for (object, record) in array.iter().zip(&records) {
            let object = object.as_object().unwrap();
            let keys: Vec<&String> = object.keys().collect();
            let expected: Vec<&String> = record.iter().map(|(k, _)| k).collect();
            prop_assert_eq!(keys, expected);
            for (key, value) in record {
                prop_assert_eq!(object[key].as_str(), Some(value.as_str()));
            }
        }
    }
}
