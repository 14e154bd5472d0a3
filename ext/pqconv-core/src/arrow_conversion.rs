//! Bidirectional conversion between Arrow arrays and ParquetValue
//!
//! The writer side turns a column of values into an Arrow array of a resolved
//! type, widening integers to floats and narrowing timestamps to
//! microseconds as the type requires. The reader side turns a single Arrow
//! cell back into a ParquetValue.

use crate::{ParquetError, ParquetValue, Result};
use arrow_array::{builder::*, Array, ArrayRef, ListArray, MapArray, NullArray, StructArray};
use arrow_schema::{DataType, Field, TimeUnit};
use bytes::Bytes;
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use std::sync::Arc;

/// Options that relax how values are coerced into their column type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionOptions {
    /// Silently drop sub-microsecond precision instead of failing
    pub allow_truncated_timestamps: bool,
}

/// Convert a single value from an Arrow array at the given index to a ParquetValue
pub fn arrow_to_parquet_value(array: &dyn Array, index: usize) -> Result<ParquetValue> {
    use arrow_array::*;

    if matches!(array.data_type(), DataType::Null) || array.is_null(index) {
        return Ok(ParquetValue::Null);
    }

    match array.data_type() {
        DataType::Boolean => {
            let array = downcast_array::<BooleanArray>(array)?;
            Ok(ParquetValue::Boolean(array.value(index)))
        }
        DataType::Int32 => {
            let array = downcast_array::<Int32Array>(array)?;
            Ok(ParquetValue::Int64(array.value(index) as i64))
        }
        DataType::Int64 => {
            let array = downcast_array::<Int64Array>(array)?;
            Ok(ParquetValue::Int64(array.value(index)))
        }
        DataType::UInt64 => {
            let array = downcast_array::<UInt64Array>(array)?;
            let value = array.value(index);
            Ok(i64::try_from(value)
                .map(ParquetValue::Int64)
                .unwrap_or(ParquetValue::UInt64(value)))
        }
        DataType::Float32 => {
            let array = downcast_array::<Float32Array>(array)?;
            Ok(ParquetValue::Float64(OrderedFloat(array.value(index) as f64)))
        }
        DataType::Float64 => {
            let array = downcast_array::<Float64Array>(array)?;
            Ok(ParquetValue::Float64(OrderedFloat(array.value(index))))
        }

        // String and binary types
        DataType::Utf8 => {
            let array = downcast_array::<StringArray>(array)?;
            Ok(ParquetValue::String(Arc::from(array.value(index))))
        }
        DataType::Binary => {
            let array = downcast_array::<BinaryArray>(array)?;
            Ok(ParquetValue::Bytes(Bytes::copy_from_slice(
                array.value(index),
            )))
        }

        DataType::Date32 => {
            let array = downcast_array::<Date32Array>(array)?;
            Ok(ParquetValue::Date32(array.value(index)))
        }

        // Timestamp types
        DataType::Timestamp(unit, timezone) => {
            let timezone = timezone.as_ref().map(|s| Arc::from(s.as_ref()));
            match unit {
                TimeUnit::Second => {
                    let array = downcast_array::<TimestampSecondArray>(array)?;
                    Ok(ParquetValue::TimestampMicros(
                        array.value(index) * 1_000_000,
                        timezone,
                    ))
                }
                TimeUnit::Millisecond => {
                    let array = downcast_array::<TimestampMillisecondArray>(array)?;
                    Ok(ParquetValue::TimestampMicros(
                        array.value(index) * 1_000,
                        timezone,
                    ))
                }
                TimeUnit::Microsecond => {
                    let array = downcast_array::<TimestampMicrosecondArray>(array)?;
                    Ok(ParquetValue::TimestampMicros(array.value(index), timezone))
                }
                TimeUnit::Nanosecond => {
                    let array = downcast_array::<TimestampNanosecondArray>(array)?;
                    Ok(ParquetValue::TimestampNanos(array.value(index), timezone))
                }
            }
        }

        // Complex types
        DataType::List(_) => {
            let array = downcast_array::<ListArray>(array)?;
            let list_values = array.value(index);

            let mut values = Vec::with_capacity(list_values.len());
            for i in 0..list_values.len() {
                values.push(arrow_to_parquet_value(&list_values, i)?);
            }

            Ok(ParquetValue::List(values))
        }
        DataType::Map(_, _) => {
            let array = downcast_array::<MapArray>(array)?;
            let map_value = array.value(index);

            // Map is stored as a struct with two fields: keys and values
            let keys = map_value.column(0);
            let values = map_value.column(1);

            let mut map_vec = Vec::with_capacity(keys.len());
            for i in 0..keys.len() {
                let key = arrow_to_parquet_value(keys, i)?;
                let value = arrow_to_parquet_value(values, i)?;
                map_vec.push((key, value));
            }

            Ok(ParquetValue::Map(map_vec))
        }
        DataType::Struct(_) => {
            let array = downcast_array::<StructArray>(array)?;

            let mut map = IndexMap::new();
            for (col_idx, field) in array.fields().iter().enumerate() {
                let column = array.column(col_idx);
                let value = arrow_to_parquet_value(column, index)?;
                map.insert(Arc::from(field.name().as_str()), value);
            }

            Ok(ParquetValue::Record(map))
        }

        dt => Err(ParquetError::Conversion(format!(
            "Unsupported data type for conversion: {:?}",
            dt
        ))),
    }
}

/// Convert a vector of ParquetValues to an Arrow array of the field's type
pub fn parquet_values_to_arrow_array(
    values: Vec<ParquetValue>,
    field: &Field,
    options: ConversionOptions,
) -> Result<ArrayRef> {
    match field.data_type() {
        DataType::Null => build_null_array(values),
        DataType::Boolean => {
            let mut builder = BooleanBuilder::with_capacity(values.len());
            for value in values {
                match value {
                    ParquetValue::Boolean(b) => builder.append_value(b),
                    ParquetValue::Null => builder.append_null(),
                    _ => return Err(unexpected("Boolean", &value)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }

        DataType::Int64 => build_int64_array(values),
        DataType::UInt64 => build_uint64_array(values),
        DataType::Float64 => build_float64_array(values),

        DataType::Utf8 => build_string_array(values),
        DataType::Binary => build_binary_array(values),

        DataType::Date32 => build_date32_array(values),
        DataType::Timestamp(unit, tz) => build_timestamp_array(values, unit, tz.clone(), options),

        // Complex types
        DataType::List(item_field) => build_list_array(values, item_field, options),
        DataType::Map(entries_field, _) => build_map_array(values, entries_field, options),
        DataType::Struct(fields) => build_struct_array(values, fields, options),

        dt => Err(ParquetError::Conversion(format!(
            "Unsupported data type for conversion: {:?}",
            dt
        ))),
    }
}

/// Helper function to downcast an array with better error messages
fn downcast_array<T: 'static>(array: &dyn Array) -> Result<&T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        ParquetError::Conversion(format!("Failed to cast to {}", std::any::type_name::<T>()))
    })
}

fn unexpected(expected: &str, value: &ParquetValue) -> ParquetError {
    ParquetError::Conversion(format!(
        "Expected {}, got {:?}",
        expected,
        value.type_name()
    ))
}

fn build_null_array(values: Vec<ParquetValue>) -> Result<ArrayRef> {
    if let Some(value) = values.iter().find(|v| !v.is_null()) {
        return Err(unexpected("Null", value));
    }
    Ok(Arc::new(NullArray::new(values.len())))
}

/// Build Int64 array, accepting unsigned values that fit
fn build_int64_array(values: Vec<ParquetValue>) -> Result<ArrayRef> {
    let mut builder = Int64Builder::with_capacity(values.len());
    for value in values {
        match value {
            ParquetValue::Int64(i) => builder.append_value(i),
            ParquetValue::UInt64(u) => {
                let i = i64::try_from(u).map_err(|_| {
                    ParquetError::Conversion(format!("Integer {} overflows Int64", u))
                })?;
                builder.append_value(i)
            }
            ParquetValue::Null => builder.append_null(),
            _ => return Err(unexpected("Int64", &value)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

/// Build UInt64 array, accepting non-negative signed values
fn build_uint64_array(values: Vec<ParquetValue>) -> Result<ArrayRef> {
    let mut builder = UInt64Builder::with_capacity(values.len());
    for value in values {
        match value {
            ParquetValue::UInt64(u) => builder.append_value(u),
            ParquetValue::Int64(i) => {
                let u = u64::try_from(i).map_err(|_| {
                    ParquetError::Conversion(format!("Integer {} overflows UInt64", i))
                })?;
                builder.append_value(u)
            }
            ParquetValue::Null => builder.append_null(),
            _ => return Err(unexpected("UInt64", &value)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

/// Build Float64 array, widening integers
fn build_float64_array(values: Vec<ParquetValue>) -> Result<ArrayRef> {
    let mut builder = Float64Builder::with_capacity(values.len());
    for value in values {
        match value {
            ParquetValue::Float64(OrderedFloat(f)) => builder.append_value(f),
            ParquetValue::Int64(i) => builder.append_value(i as f64),
            ParquetValue::UInt64(u) => builder.append_value(u as f64),
            ParquetValue::Null => builder.append_null(),
            _ => return Err(unexpected("Float64", &value)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

fn build_string_array(values: Vec<ParquetValue>) -> Result<ArrayRef> {
    let mut builder = StringBuilder::with_capacity(values.len(), 0);
    for value in values {
        match value {
            ParquetValue::String(s) => builder.append_value(&s),
            ParquetValue::Null => builder.append_null(),
            _ => return Err(unexpected("String", &value)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

fn build_binary_array(values: Vec<ParquetValue>) -> Result<ArrayRef> {
    let mut builder = BinaryBuilder::with_capacity(values.len(), 0);
    for value in values {
        match value {
            ParquetValue::Bytes(b) => builder.append_value(&b),
            ParquetValue::Null => builder.append_null(),
            _ => return Err(unexpected("Bytes", &value)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

fn build_date32_array(values: Vec<ParquetValue>) -> Result<ArrayRef> {
    let mut builder = Date32Builder::with_capacity(values.len());
    for value in values {
        match value {
            ParquetValue::Date32(d) => builder.append_value(d),
            ParquetValue::Null => builder.append_null(),
            _ => return Err(unexpected("Date32", &value)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

/// Narrow a nanosecond timestamp to microseconds
fn nanos_to_micros(nanos: i64, options: ConversionOptions) -> Result<i64> {
    if nanos % 1_000 != 0 && !options.allow_truncated_timestamps {
        return Err(ParquetError::Conversion(format!(
            "Casting from timestamp[ns] to timestamp[us] would lose data: {}",
            nanos
        )));
    }
    Ok(nanos.div_euclid(1_000))
}

/// Build timestamp array in the field's unit and timezone
fn build_timestamp_array(
    values: Vec<ParquetValue>,
    unit: &TimeUnit,
    timezone: Option<Arc<str>>,
    options: ConversionOptions,
) -> Result<ArrayRef> {
    match unit {
        TimeUnit::Microsecond => {
            let mut builder = TimestampMicrosecondBuilder::with_capacity(values.len())
                .with_timezone_opt(timezone);
            for value in values {
                match value {
                    ParquetValue::TimestampMicros(t, _) => builder.append_value(t),
                    ParquetValue::TimestampNanos(t, _) => {
                        builder.append_value(nanos_to_micros(t, options)?)
                    }
                    ParquetValue::Null => builder.append_null(),
                    _ => return Err(unexpected("Timestamp", &value)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        TimeUnit::Nanosecond => {
            let mut builder = TimestampNanosecondBuilder::with_capacity(values.len())
                .with_timezone_opt(timezone);
            for value in values {
                match value {
                    ParquetValue::TimestampNanos(t, _) => builder.append_value(t),
                    ParquetValue::TimestampMicros(t, _) => {
                        let nanos = t.checked_mul(1_000).ok_or_else(|| {
                            ParquetError::Conversion(format!(
                                "Timestamp {}us overflows nanosecond precision",
                                t
                            ))
                        })?;
                        builder.append_value(nanos)
                    }
                    ParquetValue::Null => builder.append_null(),
                    _ => return Err(unexpected("Timestamp", &value)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        _ => Err(ParquetError::Conversion(format!(
            "Unsupported timestamp unit: {:?}",
            unit
        ))),
    }
}

fn build_list_array(
    values: Vec<ParquetValue>,
    item_field: &Arc<Field>,
    options: ConversionOptions,
) -> Result<ArrayRef> {
    let mut all_items = Vec::new();
    let mut offsets = Vec::with_capacity(values.len() + 1);
    let mut null_buffer_builder = arrow_buffer::BooleanBufferBuilder::new(values.len());
    offsets.push(0i32);

    for value in values {
        match value {
            ParquetValue::List(items) => {
                all_items.extend(items);
                offsets.push(all_items.len() as i32);
                null_buffer_builder.append(true);
            }
            ParquetValue::Null => {
                offsets.push(all_items.len() as i32);
                null_buffer_builder.append(false);
            }
            _ => return Err(unexpected("List", &value)),
        }
    }

    let item_array = parquet_values_to_arrow_array(all_items, item_field, options)?;
    let offset_buffer = arrow_buffer::OffsetBuffer::new(offsets.into());
    let null_buffer = null_buffer_builder.finish();

    Ok(Arc::new(ListArray::try_new(
        item_field.clone(),
        offset_buffer,
        item_array,
        Some(null_buffer.into()),
    )?))
}

fn build_map_array(
    values: Vec<ParquetValue>,
    entries_field: &Arc<Field>,
    options: ConversionOptions,
) -> Result<ArrayRef> {
    // Extract the key and value fields from the entries struct
    let struct_fields = match entries_field.data_type() {
        DataType::Struct(fields) if fields.len() == 2 => fields.clone(),
        _ => {
            return Err(ParquetError::Conversion(
                "Map entries field must be a struct with exactly 2 fields".to_string(),
            ))
        }
    };

    let mut all_keys = Vec::new();
    let mut all_values = Vec::new();
    let mut offsets = Vec::with_capacity(values.len() + 1);
    let mut null_buffer_builder = arrow_buffer::BooleanBufferBuilder::new(values.len());
    offsets.push(0i32);

    for value in values {
        match value {
            ParquetValue::Map(entries) => {
                for (k, v) in entries {
                    if k.is_null() {
                        return Err(ParquetError::Conversion(
                            "Map keys cannot be null".to_string(),
                        ));
                    }
                    all_keys.push(k);
                    all_values.push(v);
                }
                offsets.push(all_keys.len() as i32);
                null_buffer_builder.append(true);
            }
            ParquetValue::Null => {
                offsets.push(all_keys.len() as i32);
                null_buffer_builder.append(false);
            }
            _ => return Err(unexpected("Map", &value)),
        }
    }

    let key_array = parquet_values_to_arrow_array(all_keys, &struct_fields[0], options)?;
    let value_array = parquet_values_to_arrow_array(all_values, &struct_fields[1], options)?;

    let struct_array = StructArray::try_new(struct_fields, vec![key_array, value_array], None)?;

    let offset_buffer = arrow_buffer::OffsetBuffer::new(offsets.into());
    let null_buffer = null_buffer_builder.finish();

    Ok(Arc::new(MapArray::try_new(
        entries_field.clone(),
        offset_buffer,
        struct_array,
        Some(null_buffer.into()),
        false, // sorted
    )?))
}

fn build_struct_array(
    values: Vec<ParquetValue>,
    fields: &arrow_schema::Fields,
    options: ConversionOptions,
) -> Result<ArrayRef> {
    let num_rows = values.len();
    let mut field_arrays = Vec::with_capacity(fields.len());
    let mut null_buffer_builder = arrow_buffer::BooleanBufferBuilder::new(num_rows);

    // Prepare columns for each field
    let mut field_columns: Vec<Vec<ParquetValue>> =
        vec![Vec::with_capacity(num_rows); fields.len()];

    for value in values {
        match value {
            ParquetValue::Record(mut map) => {
                null_buffer_builder.append(true);
                for (idx, field) in fields.iter().enumerate() {
                    let field_value = map
                        .swap_remove(field.name().as_str())
                        .unwrap_or(ParquetValue::Null);
                    field_columns[idx].push(field_value);
                }
            }
            ParquetValue::Null => {
                null_buffer_builder.append(false);
                for field_column in field_columns.iter_mut() {
                    field_column.push(ParquetValue::Null);
                }
            }
            _ => return Err(unexpected("Record", &value)),
        }
    }

    for (column, field) in field_columns.into_iter().zip(fields.iter()) {
        let array = parquet_values_to_arrow_array(column, field, options)?;
        field_arrays.push(array);
    }

    let null_buffer = null_buffer_builder.finish();
    Ok(Arc::new(StructArray::try_new(
        fields.clone(),
        field_arrays,
        Some(null_buffer.into()),
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::*;

    fn field(data_type: DataType) -> Field {
        Field::new("test", data_type, true)
    }

    #[test]
    fn test_primitive_conversion_roundtrip() {
        let values = vec![
            ParquetValue::Boolean(true),
            ParquetValue::Boolean(false),
            ParquetValue::Null,
        ];
        let array = parquet_values_to_arrow_array(
            values.clone(),
            &field(DataType::Boolean),
            ConversionOptions::default(),
        )
        .unwrap();

        for (i, expected) in values.iter().enumerate() {
            let actual = arrow_to_parquet_value(array.as_ref(), i).unwrap();
            assert_eq!(&actual, expected);
        }
    }

    #[test]
    fn test_integer_widening() {
        let values = vec![
            ParquetValue::Int64(42),
            ParquetValue::Float64(OrderedFloat(0.5)),
            ParquetValue::UInt64(7),
        ];
        let array = parquet_values_to_arrow_array(
            values,
            &field(DataType::Float64),
            ConversionOptions::default(),
        )
        .unwrap();

        let floats = array.as_any().downcast_ref::<Float64Array>().unwrap();
        assert_eq!(floats.value(0), 42.0);
        assert_eq!(floats.value(1), 0.5);
        assert_eq!(floats.value(2), 7.0);
    }

    #[test]
    fn test_null_column() {
        let array = parquet_values_to_arrow_array(
            vec![ParquetValue::Null, ParquetValue::Null],
            &field(DataType::Null),
            ConversionOptions::default(),
        )
        .unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(
            arrow_to_parquet_value(array.as_ref(), 1).unwrap(),
            ParquetValue::Null
        );
    }

    #[test]
    fn test_timestamp_truncation() {
        let values = vec![ParquetValue::TimestampNanos(1_500, None)];
        let ts_field = field(DataType::Timestamp(TimeUnit::Microsecond, None));

        let err = parquet_values_to_arrow_array(
            values.clone(),
            &ts_field,
            ConversionOptions::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("would lose data"));

        let array = parquet_values_to_arrow_array(
            values,
            &ts_field,
            ConversionOptions {
                allow_truncated_timestamps: true,
            },
        )
        .unwrap();
        assert_eq!(
            arrow_to_parquet_value(array.as_ref(), 0).unwrap(),
            ParquetValue::TimestampMicros(1, None)
        );
    }

    #[test]
    fn test_exact_nanos_never_need_truncation() {
        let array = parquet_values_to_arrow_array(
            vec![ParquetValue::TimestampNanos(3_000, None)],
            &field(DataType::Timestamp(TimeUnit::Microsecond, None)),
            ConversionOptions::default(),
        )
        .unwrap();
        assert_eq!(
            arrow_to_parquet_value(array.as_ref(), 0).unwrap(),
            ParquetValue::TimestampMicros(3, None)
        );
    }

    #[test]
    fn test_struct_fills_missing_fields() {
        let fields = arrow_schema::Fields::from(vec![
            Field::new("a", DataType::Int64, true),
            Field::new("b", DataType::Utf8, true),
        ]);
        let mut first = IndexMap::new();
        first.insert(Arc::from("a"), ParquetValue::Int64(1));
        let mut second = IndexMap::new();
        second.insert(Arc::from("b"), ParquetValue::String(Arc::from("x")));

        let array = parquet_values_to_arrow_array(
            vec![ParquetValue::Record(first), ParquetValue::Record(second)],
            &field(DataType::Struct(fields)),
            ConversionOptions::default(),
        )
        .unwrap();

        let mut expected = IndexMap::new();
        expected.insert(Arc::from("a"), ParquetValue::Int64(1));
        expected.insert(Arc::from("b"), ParquetValue::Null);
        assert_eq!(
            arrow_to_parquet_value(array.as_ref(), 0).unwrap(),
            ParquetValue::Record(expected)
        );
    }

    #[test]
    fn test_type_mismatch_is_conversion_error() {
        let err = parquet_values_to_arrow_array(
            vec![ParquetValue::String(Arc::from("x"))],
            &field(DataType::Int64),
            ConversionOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Conversion error: Expected Int64, got \"String\"");
    }
}
