//! In-memory table of named columns awaiting Parquet encoding

use crate::{ParquetError, ParquetValue, Result};
use arrow_schema::DataType;
use std::collections::HashSet;
use std::sync::Arc;

/// Declared element type of a column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnType {
    /// No declared type; the writer resolves one from the values
    Object,
    /// An explicit Arrow type the values must convert to
    Typed(DataType),
}

/// A named column of values
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: Arc<str>,
    pub column_type: ColumnType,
    pub values: Vec<ParquetValue>,
}

/// Columns of equal length, in insertion order
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    num_rows: usize,
}

impl Table {
    /// Build a table from `(name, values)` pairs, giving every column the same
    /// declared type.
    ///
    /// Fails if two columns share a name or the columns differ in length.
    pub fn from_columns<I, K>(columns: I, column_type: ColumnType) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Vec<ParquetValue>)>,
        K: Into<Arc<str>>,
    {
        let mut seen = HashSet::new();
        let mut built = Vec::new();
        let mut num_rows: Option<usize> = None;

        for (name, values) in columns {
            let name: Arc<str> = name.into();
            if !seen.insert(name.clone()) {
                return Err(ParquetError::table_construction(format!(
                    "Duplicate column name '{}'",
                    name
                )));
            }

            match num_rows {
                None => num_rows = Some(values.len()),
                Some(expected) if expected != values.len() => {
                    return Err(ParquetError::table_construction(format!(
                        "All arrays must be of the same length: column '{}' has {} values, expected {}",
                        name,
                        values.len(),
                        expected
                    )));
                }
                Some(_) => {}
            }

            built.push(Column {
                name,
                column_type: column_type.clone(),
                values,
            });
        }

        Ok(Self {
            columns: built,
            num_rows: num_rows.unwrap_or(0),
        })
    }

    /// Build a table from a decoded mapping of column name to sequence of values
    pub fn from_value(value: ParquetValue, column_type: ColumnType) -> Result<Self> {
        let fields = match value {
            ParquetValue::Record(fields) => fields,
            ParquetValue::Map(_) => {
                return Err(ParquetError::table_construction(
                    "Column names must be strings",
                ))
            }
            other => {
                return Err(ParquetError::table_construction(format!(
                    "Expected a mapping of column name to values, got {}",
                    other.type_name()
                )))
            }
        };

        let mut columns = Vec::with_capacity(fields.len());
        for (name, column) in fields {
            match column {
                ParquetValue::List(values) => columns.push((name, values)),
                other => {
                    return Err(ParquetError::table_construction(format!(
                        "Column '{}' holds a {} instead of a sequence of values",
                        name,
                        other.type_name()
                    )))
                }
            }
        }

        Self::from_columns(columns, column_type)
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name.as_ref() == name)
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn ints(values: &[i64]) -> Vec<ParquetValue> {
        values.iter().map(|v| ParquetValue::Int64(*v)).collect()
    }

    #[test]
    fn test_from_columns_keeps_order() {
        let table = Table::from_columns(
            vec![("b", ints(&[1, 2])), ("a", ints(&[3, 4]))],
            ColumnType::Object,
        )
        .unwrap();

        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.num_columns(), 2);
        let names: Vec<&str> = table.columns().iter().map(|c| c.name.as_ref()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert!(table
            .columns()
            .iter()
            .all(|c| c.column_type == ColumnType::Object));
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let err = Table::from_columns(
            vec![("a", ints(&[1, 2])), ("b", ints(&[1]))],
            ColumnType::Object,
        )
        .unwrap_err();

        assert!(matches!(err, ParquetError::TableConstruction(_)));
        assert!(err.to_string().contains("same length"));
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let err = Table::from_columns(
            vec![("a", ints(&[1])), ("a", ints(&[2]))],
            ColumnType::Object,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate column name 'a'"));
    }

    #[test]
    fn test_from_value() {
        let mut fields = IndexMap::new();
        fields.insert(Arc::from("id"), ParquetValue::List(ints(&[1, 2, 3])));
        let table = Table::from_value(ParquetValue::Record(fields), ColumnType::Object).unwrap();

        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.column("id").unwrap().values, ints(&[1, 2, 3]));
        assert!(table.column("missing").is_none());
    }

    #[test]
    fn test_from_value_requires_mapping_of_sequences() {
        let err = Table::from_value(ParquetValue::List(vec![]), ColumnType::Object).unwrap_err();
        assert!(err.to_string().contains("got List"));

        let mut fields = IndexMap::new();
        fields.insert(Arc::from("id"), ParquetValue::Int64(1));
        let err = Table::from_value(ParquetValue::Record(fields), ColumnType::Object).unwrap_err();
        assert!(err.to_string().contains("Column 'id' holds a Int64"));
    }
}
