use pqconv::*;
use rmpv::Value;
use serde_json::json;

use test_helpers::*;

#[test]
fn test_mixed_column_dumps_decoded_structure() {
    let scratch = Scratch::new();
    let input = columns(vec![
        ("a", vec![Value::from(1), Value::from("x")]),
        ("b", vec![Value::Ext(10, b"2024-01-15".to_vec()), Value::Nil]),
    ]);

    let err = msgpack_to_parquet(&pack(&input), &scratch.options()).unwrap_err();
    assert!(matches!(err, ConvertError::Encoding(_)));
    assert!(err.to_string().contains("Cannot mix Int64 and String"));

    // Dates have no JSON form and are dumped as strings
    assert_eq!(
        scratch.only_dump_json(),
        json!({"a": [1, "x"], "b": ["2024-01-15", null]})
    );
    scratch.assert_no_scratch_left();
}

#[test]
fn test_dump_names_are_unique() {
    let scratch = Scratch::new();
    let input = pack(&columns(vec![("a", vec![Value::from(true), Value::from(1)])]));

    for _ in 0..3 {
        assert!(msgpack_to_parquet(&input, &scratch.options()).is_err());
    }

    let dumps = scratch.dump_files();
    assert_eq!(dumps.len(), 3);
    for dump in dumps {
        let name = dump.file_name().unwrap().to_str().unwrap();
        let id = name
            .strip_prefix("error-")
            .and_then(|rest| rest.strip_suffix(".json"))
            .unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok(), "bad dump name {}", name);
    }
}

#[test]
fn test_non_mapping_payload_is_dumped() {
    let scratch = Scratch::new();
    let input = Value::Array(vec![Value::from(1), Value::from(2)]);

    let err = msgpack_to_parquet(&pack(&input), &scratch.options()).unwrap_err();
    assert!(matches!(err, ConvertError::TableConstruction(_)));
    assert_eq!(scratch.only_dump_json(), json!([1, 2]));
}

#[test]
fn test_unequal_columns_are_dumped() {
    let scratch = Scratch::new();
    let input = columns(vec![
        ("a", vec![Value::from(1), Value::from(2)]),
        ("b", vec![Value::from(1)]),
    ]);

    let err = msgpack_to_parquet(&pack(&input), &scratch.options()).unwrap_err();
    assert!(matches!(err, ConvertError::TableConstruction(_)));
    assert!(err.to_string().contains("same length"));
    assert_eq!(scratch.only_dump_json(), json!({"a": [1, 2], "b": [1]}));
}

#[test]
fn test_non_string_keys_are_dumped_as_strings() {
    let scratch = Scratch::new();
    let input = Value::Map(vec![(
        Value::from(1),
        Value::Array(vec![Value::Binary(b"ab".to_vec())]),
    )]);

    let err = msgpack_to_parquet(&pack(&input), &scratch.options()).unwrap_err();
    assert!(matches!(err, ConvertError::TableConstruction(_)));
    assert_eq!(scratch.only_dump_json(), json!({"1": ["b'ab'"]}));
}

#[test]
fn test_failed_dump_keeps_original_error() {
    let scratch = Scratch::new();
    let options = scratch
        .options()
        .with_dump_dir(scratch.dumps.path().join("does-not-exist"));
    let input = pack(&columns(vec![("a", vec![Value::from(1), Value::from("x")])]));

    let err = msgpack_to_parquet(&input, &options).unwrap_err();
    let ConvertError::Dump { path, .. } = &err else {
        panic!("expected a dump error, got {:?}", err);
    };
    assert!(path.starts_with(scratch.dumps.path().join("does-not-exist")));
    assert!(matches!(err.original(), ConvertError::Encoding(_)));
    assert!(err.to_string().contains("Cannot mix"));
    scratch.assert_no_scratch_left();
}
