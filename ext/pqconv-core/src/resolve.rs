//! Type resolution for opaque (`ColumnType::Object`) columns
//!
//! Columns arrive without a declared type. Before encoding, every column is
//! scanned and a single Arrow type is chosen that all of its non-null values
//! convert to:
//!
//! - all null (or empty) columns become `Null`
//! - integers widen to floats when both appear, never the other way round
//! - nested lists, records and maps are resolved recursively over all of
//!   their children
//! - any other mix (a string next to an integer, a date next to a
//!   timestamp) is a conversion error

use crate::table::{Column, ColumnType, Table};
use crate::{ErrorContext, ParquetError, ParquetValue, Result};
use arrow_schema::{DataType, Field, Schema, SchemaRef, TimeUnit};
use indexmap::IndexMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Boolean,
    Integer,
    Float,
    String,
    Bytes,
    Date,
    Timestamp,
    List,
    Record,
    Map,
}

fn kind_of(value: &ParquetValue) -> Option<Kind> {
    Some(match value {
        ParquetValue::Null => return None,
        ParquetValue::Boolean(_) => Kind::Boolean,
        ParquetValue::Int64(_) | ParquetValue::UInt64(_) => Kind::Integer,
        ParquetValue::Float64(_) => Kind::Float,
        ParquetValue::String(_) => Kind::String,
        ParquetValue::Bytes(_) => Kind::Bytes,
        ParquetValue::Date32(_) => Kind::Date,
        ParquetValue::TimestampMicros(_, _) | ParquetValue::TimestampNanos(_, _) => {
            Kind::Timestamp
        }
        ParquetValue::List(_) => Kind::List,
        ParquetValue::Record(_) => Kind::Record,
        ParquetValue::Map(_) => Kind::Map,
    })
}

fn unify(current: Kind, next: Kind) -> Option<Kind> {
    match (current, next) {
        (a, b) if a == b => Some(a),
        (Kind::Integer, Kind::Float) | (Kind::Float, Kind::Integer) => Some(Kind::Float),
        _ => None,
    }
}

/// Resolve the Arrow type for a column of opaque values
pub fn resolve_data_type(values: &[ParquetValue]) -> Result<DataType> {
    let refs: Vec<&ParquetValue> = values.iter().collect();
    resolve_refs(&refs)
}

/// Resolve the Arrow field for a column, honoring a declared type if present
pub fn resolve_field(column: &Column) -> Result<Field> {
    let data_type = match &column.column_type {
        ColumnType::Typed(data_type) => data_type.clone(),
        ColumnType::Object => resolve_data_type(&column.values)
            .with_context(|| format!("column '{}'", column.name))?,
    };
    Ok(Field::new(column.name.as_ref(), data_type, true))
}

/// Resolve the Arrow schema for a whole table
pub fn resolve_schema(table: &Table) -> Result<SchemaRef> {
    let fields = table
        .columns()
        .iter()
        .map(resolve_field)
        .collect::<Result<Vec<_>>>()?;
    Ok(Arc::new(Schema::new(fields)))
}

fn resolve_refs(values: &[&ParquetValue]) -> Result<DataType> {
    let mut kind: Option<Kind> = None;
    let mut first: Option<&ParquetValue> = None;

    for value in values {
        let Some(next) = kind_of(value) else {
            continue;
        };
        kind = match kind {
            None => {
                first = Some(*value);
                Some(next)
            }
            Some(current) => Some(unify(current, next).ok_or_else(|| {
                ParquetError::conversion(format!(
                    "Cannot mix {} and {} values in one column",
                    first.map(|v| v.type_name()).unwrap_or("Null"),
                    value.type_name()
                ))
            })?),
        };
    }

    let Some(kind) = kind else {
        return Ok(DataType::Null);
    };

    match kind {
        Kind::Boolean => Ok(DataType::Boolean),
        Kind::Integer => resolve_integer(values),
        Kind::Float => Ok(DataType::Float64),
        Kind::String => Ok(DataType::Utf8),
        Kind::Bytes => Ok(DataType::Binary),
        Kind::Date => Ok(DataType::Date32),
        Kind::Timestamp => resolve_timestamp(values),
        Kind::List => {
            let items: Vec<&ParquetValue> = values
                .iter()
                .filter_map(|v| match v {
                    ParquetValue::List(items) => Some(items.iter()),
                    _ => None,
                })
                .flatten()
                .collect();
            let item_type = resolve_refs(&items).context("list item")?;
            Ok(DataType::List(Arc::new(Field::new("item", item_type, true))))
        }
        Kind::Record => {
            let mut children: IndexMap<Arc<str>, Vec<&ParquetValue>> = IndexMap::new();
            for value in values {
                if let ParquetValue::Record(fields) = value {
                    for (name, child) in fields {
                        children.entry(name.clone()).or_default().push(child);
                    }
                }
            }

            let fields = children
                .into_iter()
                .map(|(name, child_values)| {
                    let data_type =
                        resolve_refs(&child_values).with_context(|| format!("field '{}'", name))?;
                    Ok(Field::new(name.as_ref(), data_type, true))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(DataType::Struct(fields.into()))
        }
        Kind::Map => {
            let mut keys = Vec::new();
            let mut entries = Vec::new();
            for value in values {
                if let ParquetValue::Map(pairs) = value {
                    for (k, v) in pairs {
                        keys.push(k);
                        entries.push(v);
                    }
                }
            }

            let key_type = match resolve_refs(&keys).context("map key")? {
                // Only empty maps were seen; any key type will do
                DataType::Null => DataType::Utf8,
                key_type => key_type,
            };
            let value_type = resolve_refs(&entries).context("map value")?;

            let struct_fields = vec![
                Field::new("key", key_type, false),
                Field::new("value", value_type, true),
            ];
            Ok(DataType::Map(
                Arc::new(Field::new(
                    "entries",
                    DataType::Struct(struct_fields.into()),
                    false,
                )),
                false, // keys_sorted
            ))
        }
    }
}

fn resolve_integer(values: &[&ParquetValue]) -> Result<DataType> {
    let has_negative = values
        .iter()
        .any(|v| matches!(v, ParquetValue::Int64(i) if *i < 0));
    let large = values.iter().find_map(|v| match v {
        ParquetValue::UInt64(u) if *u > i64::MAX as u64 => Some(*u),
        _ => None,
    });

    match large {
        None => Ok(DataType::Int64),
        Some(_) if !has_negative => Ok(DataType::UInt64),
        Some(u) => Err(ParquetError::conversion(format!(
            "Integer {} does not fit a signed 64-bit column that also holds negative values",
            u
        ))),
    }
}

fn resolve_timestamp(values: &[&ParquetValue]) -> Result<DataType> {
    let mut timezone: Option<&Option<Arc<str>>> = None;
    for value in values {
        let tz = match value {
            ParquetValue::TimestampMicros(_, tz) | ParquetValue::TimestampNanos(_, tz) => tz,
            _ => continue,
        };
        match timezone {
            None => timezone = Some(tz),
            Some(existing) if existing != tz => {
                return Err(ParquetError::conversion(format!(
                    "Cannot mix timestamps with timezones {:?} and {:?}",
                    existing, tz
                )))
            }
            Some(_) => {}
        }
    }

    Ok(DataType::Timestamp(
        TimeUnit::Microsecond,
        timezone.cloned().flatten(),
    ))
}
