//! Property-based tests for response shape normalization

use cms_client::shared::{Complaint, ListPayload, RecordId};
use proptest::prelude::*;
use serde_json::{json, Value};

fn record(id: Value, title: String) -> Value {
    json!({
        "_id": id,
        "title": title,
        "status": "pending",
        "createdAt": "2025-01-10T09:00:00Z",
        "updatedAt": "2025-01-10T09:00:00Z"
    })
}

fn id_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<u32>().prop_map(|n| json!(n)),
        "[a-z0-9]{1,12}".prop_map(|s| json!(s)),
    ]
}

fn records_strategy() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec((id_strategy(), "[A-Za-z ]{1,24}"), 0..8)
        .prop_map(|items| items.into_iter().map(|(id, title)| record(id, title)).collect())
}

proptest! {
    #[test]
    fn test_wrappers_normalize_identically(records in records_strategy()) {
        let bare = ListPayload::<Complaint>::from_value(json!(records), "complaints");
        let named = ListPayload::<Complaint>::from_value(json!({"complaints": records}), "complaints");
        let data = ListPayload::<Complaint>::from_value(json!({"data": records}), "complaints");

        let bare = bare.into_records();
        prop_assert_eq!(bare.len(), records.len());
        prop_assert_eq!(&bare, &named.into_records());
        prop_assert_eq!(&bare, &data.into_records());
    }

    #[test]
    fn test_other_objects_are_unrecognized(key in "[a-z]{1,10}", records in records_strategy()) {
        prop_assume!(key != "complaints" && key != "data");
        let payload = ListPayload::<Complaint>::from_value(json!({ key: records }), "complaints");
        prop_assert!(!payload.is_recognized());
        prop_assert!(payload.into_records().is_empty());
    }

    #[test]
    fn test_numeric_and_string_ids_match(n in any::<u64>()) {
        let from_number: RecordId = serde_json::from_value(json!(n)).unwrap();
        let from_string: RecordId = serde_json::from_value(json!(n.to_string())).unwrap();
        prop_assert_eq!(&from_number, &from_string);
        prop_assert_eq!(from_number, RecordId::from(n));
    }
}
