//! Property tests for the reading log

use proptest::prelude::*;
use serde_json::{Map, Value, json};
use wsdash_core::readings::{EntryKind, Reading, ReadingLog};

/// Strategy for flat JSON objects with simple values
fn payload_strategy() -> impl Strategy<Value = Value> {
    proptest::collection::vec(
        (
            "[a-z]{1,8}",
            prop_oneof![
                any::<i32>().prop_map(Value::from),
                "[a-zA-Z ]{0,10}".prop_map(Value::from),
                any::<bool>().prop_map(Value::from),
            ],
        ),
        0..6,
    )
    .prop_map(|pairs| {
        let mut map = Map::new();
        for (key, value) in pairs {
            if key != "ts" {
                map.insert(key, value);
            }
        }
        Value::Object(map)
    })
}

proptest! {
    /// Property: The log never holds more than its capacity and keeps the newest
    #[test]
    fn log_is_bounded(capacity in 1usize..20, pushes in 0usize..60) {
        let mut log = ReadingLog::new(capacity);
        for i in 0..pushes {
            log.push_system(format!("entry {i}"));
        }

        prop_assert_eq!(log.len(), pushes.min(capacity));
        if pushes > 0 {
            let newest = format!("entry {}", pushes - 1);
            prop_assert_eq!(log.latest().unwrap().display_text(), newest);
        }
    }

    /// Property: Records list data entries only, oldest first
    #[test]
    fn records_are_oldest_first(values in proptest::collection::vec(any::<i64>(), 1..20)) {
        let mut log = ReadingLog::new(100);
        for (i, v) in values.iter().enumerate() {
            log.push_reading(Reading::from_value(json!({ "v": v })));
            if i % 3 == 0 {
                log.push_error("noise");
            }
        }

        let records = log.records();
        prop_assert_eq!(records.len(), values.len());
        for (record, v) in records.iter().zip(&values) {
            prop_assert_eq!(&record[0].0, "Timestamp");
            prop_assert_eq!(&record[1], &("v".to_string(), v.to_string()));
        }
    }

    /// Property: Field order follows the payload, timestamp first
    #[test]
    fn record_keeps_payload_order(payload in payload_strategy()) {
        let reading = Reading::from_value(payload.clone());
        let record = reading.record();

        prop_assert_eq!(&record[0].0, "Timestamp");
        let keys: Vec<&str> = record[1..].iter().map(|(k, _)| k.as_str()).collect();
        let expected: Vec<&str> = payload.as_object().unwrap().keys().map(String::as_str).collect();
        prop_assert_eq!(keys, expected);
    }

    /// Property: An empty filter matches everything; any filter is case-insensitive
    #[test]
    fn filter_is_case_insensitive(words in proptest::collection::vec("[a-z]{3,8}", 1..10), pick in any::<prop::sample::Index>()) {
        let mut log = ReadingLog::new(50);
        for word in &words {
            log.push_system(word.clone());
        }

        prop_assert_eq!(log.filter("").len(), words.len());

        let needle = pick.get(&words).to_uppercase();
        let hits = log.filter(&needle);
        prop_assert!(!hits.is_empty());
        for hit in hits {
            prop_assert!(hit.display_text().contains(&needle.to_lowercase()));
            prop_assert_eq!(hit.kind(), EntryKind::System);
        }
    }

    /// Property: Epoch-millisecond timestamps are lifted out of the fields
    #[test]
    fn epoch_timestamps_are_parsed(millis in 0i64..4_102_444_800_000) {
        let reading = Reading::from_value(json!({ "ts": millis, "v": 1 }));
        prop_assert_eq!(reading.timestamp().map(|t| t.timestamp_millis()), Some(millis));
        prop_assert_eq!(reading.fields().len(), 1);
        prop_assert_ne!(reading.timestamp_text(), "N/A");
    }
}
