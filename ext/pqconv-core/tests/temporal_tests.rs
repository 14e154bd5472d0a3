use pqconv_core::*;
use std::sync::Arc;

mod test_helpers;
use test_helpers::*;

#[test]
fn test_date_values() {
    let columns = vec![(
        "day",
        vec![
            ParquetValue::date(1970, 1, 1).unwrap(),
            ParquetValue::date(2024, 1, 15).unwrap(),
            ParquetValue::date(1900, 3, 1).unwrap(),
            ParquetValue::Null,
        ],
    )];

    test_roundtrip(columns).unwrap();
}

#[test]
fn test_microsecond_timestamps_roundtrip() {
    let utc: Option<Arc<str>> = Some(Arc::from("UTC"));
    let columns = vec![(
        "at",
        vec![
            ParquetValue::TimestampMicros(0, utc.clone()),
            ParquetValue::TimestampMicros(1_705_314_600_000_000, utc.clone()),
            ParquetValue::Null,
        ],
    )];

    test_roundtrip(columns).unwrap();
}

#[test]
fn test_nanosecond_timestamps_need_truncation_flag() {
    let columns = || {
        vec![(
            "at",
            vec![ParquetValue::TimestampNanos(1_705_314_600_000_000_123, None)],
        )]
    };

    let err = write_to_bytes(WriterBuilder::new(), object_table(columns())).unwrap_err();
    assert!(err.to_string().contains("would lose data"));

    let bytes = write_to_bytes(
        WriterBuilder::new().with_allow_truncated_timestamps(true),
        object_table(columns()),
    )
    .unwrap();
    let read = Reader::new(bytes).read_table().unwrap();
    assert_eq!(
        read[0].1,
        vec![ParquetValue::TimestampMicros(1_705_314_600_000_000, None)]
    );
}

#[test]
fn test_dates_and_timestamps_do_not_mix() {
    let table = object_table(vec![(
        "when",
        vec![
            ParquetValue::Date32(1),
            ParquetValue::TimestampMicros(1, None),
        ],
    )]);

    assert!(write_to_bytes(WriterBuilder::new(), table).is_err());
}
