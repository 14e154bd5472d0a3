//! Test utilities for pqconv-core

#[cfg(test)]
pub mod test {
    use crate::{write_table, ColumnType, ParquetValue, Reader, Table, WriterBuilder};
    use bytes::Bytes;
    use ordered_float::OrderedFloat;
    use std::sync::Arc;

    /// A small table mixing the scalar kinds a decoder produces
    pub fn sample_table() -> Table {
        Table::from_columns(
            vec![
                (
                    "id",
                    vec![
                        ParquetValue::Int64(1),
                        ParquetValue::Int64(2),
                        ParquetValue::Int64(3),
                    ],
                ),
                (
                    "name",
                    vec![
                        ParquetValue::String(Arc::from("Alice")),
                        ParquetValue::Null,
                        ParquetValue::String(Arc::from("Carol")),
                    ],
                ),
                (
                    "score",
                    vec![
                        ParquetValue::Float64(OrderedFloat(1.5)),
                        ParquetValue::Int64(2),
                        ParquetValue::Null,
                    ],
                ),
                (
                    "joined",
                    vec![
                        ParquetValue::Date32(19737),
                        ParquetValue::Null,
                        ParquetValue::Date32(0),
                    ],
                ),
            ],
            ColumnType::Object,
        )
        .unwrap()
    }

    /// Encode a table with the given builder into in-memory Parquet bytes
    pub fn encode(builder: WriterBuilder, table: Table) -> Bytes {
        let mut buffer = Vec::new();
        write_table(builder, &mut buffer, table).unwrap();
        Bytes::from(buffer)
    }

    /// Encode with defaults and read every column back
    pub fn roundtrip(table: Table) -> Vec<(String, Vec<ParquetValue>)> {
        Reader::new(encode(WriterBuilder::new(), table))
            .read_table()
            .unwrap()
    }
}
