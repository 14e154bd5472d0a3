#![allow(dead_code)]

use bytes::Bytes;
use pqconv_core::*;
use std::sync::Arc;

/// Build an opaque table from `(name, values)` pairs
pub fn object_table(columns: Vec<(&str, Vec<ParquetValue>)>) -> Table {
    Table::from_columns(columns, ColumnType::Object).unwrap()
}

/// Generate test columns with sequential data
pub fn generate_test_columns(count: usize) -> Vec<(&'static str, Vec<ParquetValue>)> {
    vec![
        (
            "id",
            (0..count).map(|i| ParquetValue::Int64(i as i64)).collect(),
        ),
        (
            "name",
            (0..count)
                .map(|i| ParquetValue::String(Arc::from(format!("name_{}", i))))
                .collect(),
        ),
        (
            "value",
            (0..count)
                .map(|i| ParquetValue::Float64(ordered_float::OrderedFloat(i as f64 * 1.5)))
                .collect(),
        ),
        (
            "active",
            (0..count).map(|i| ParquetValue::Boolean(i % 2 == 0)).collect(),
        ),
    ]
}

/// Encode a table and return the Parquet bytes
pub fn write_to_bytes(builder: WriterBuilder, table: Table) -> Result<Bytes> {
    let mut buffer = Vec::new();
    write_table(builder, &mut buffer, table)?;
    Ok(Bytes::from(buffer))
}

/// Perform a roundtrip and verify every column comes back unchanged
pub fn test_roundtrip(
    columns: Vec<(&str, Vec<ParquetValue>)>,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    test_roundtrip_with_builder(columns, WriterBuilder::new())
}

/// Perform a roundtrip with a custom writer configuration
pub fn test_roundtrip_with_builder(
    columns: Vec<(&str, Vec<ParquetValue>)>,
    builder: WriterBuilder,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    use tempfile::NamedTempFile;

    let expected: Vec<(String, Vec<ParquetValue>)> = columns
        .iter()
        .map(|(name, values)| (name.to_string(), values.clone()))
        .collect();

    let bytes = write_to_bytes(builder, object_table(columns))?;

    // Persist and read back from disk to cover the file path as well
    let temp_file = NamedTempFile::new()?;
    std::fs::write(temp_file.path(), &bytes)?;
    let from_disk = Bytes::from(std::fs::read(temp_file.path())?);

    let read = Reader::new(from_disk).read_table()?;

    assert_eq!(expected.len(), read.len(), "Column count mismatch");
    for (original, read) in expected.iter().zip(read.iter()) {
        assert_eq!(original, read, "Column {} mismatch", original.0);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_work() {
        let columns = generate_test_columns(10);
        assert_eq!(columns[0].1.len(), 10);

        test_roundtrip(columns).unwrap();
    }
}
