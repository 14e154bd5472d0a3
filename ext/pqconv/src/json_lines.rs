//! JSON-lines file reading
//!
//! Each non-blank line is one row and must hold a JSON object. Columns are
//! the union of keys over all rows, in the order they are first seen; a row
//! that lacks a key gets a null in that column.

use crate::error::ConvertError;
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use pqconv_core::ParquetValue;
use serde_json::Value as Json;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Named columns of equal length, in first-seen key order
pub type RecordSet = IndexMap<Arc<str>, Vec<ParquetValue>>;

/// Decode a byte path as UTF-8
pub fn path_from_bytes(path: &[u8]) -> Result<PathBuf, ConvertError> {
    std::str::from_utf8(path)
        .map(PathBuf::from)
        .map_err(ConvertError::SourcePath)
}

/// Read the JSON-lines file named by a UTF-8 byte path
pub fn read_json_lines(path: &[u8]) -> Result<RecordSet, ConvertError> {
    read_json_lines_file(&path_from_bytes(path)?)
}

/// Read a JSON-lines file into columns
pub fn read_json_lines_file(path: &Path) -> Result<RecordSet, ConvertError> {
    let read_error = |source| ConvertError::SourceRead {
        path: path.to_path_buf(),
        source,
    };
    let reader = BufReader::new(File::open(path).map_err(read_error)?);

    let mut columns = RecordSet::new();
    let mut rows = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(read_error)?;
        if line.trim().is_empty() {
            continue;
        }

        let row = serde_json::from_str::<Json>(&line).map_err(|source| ConvertError::JsonLine {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        let Json::Object(fields) = row else {
            return Err(ConvertError::NotAnObject {
                path: path.to_path_buf(),
                line: idx + 1,
            });
        };

        for (key, value) in fields {
            columns
                .entry(Arc::from(key))
                .or_insert_with(|| vec![ParquetValue::Null; rows])
                .push(json_to_value(value));
        }
        rows += 1;

        for values in columns.values_mut() {
            if values.len() < rows {
                values.push(ParquetValue::Null);
            }
        }
    }

    debug!(
        "Read {} rows and {} columns from {}",
        rows,
        columns.len(),
        path.display()
    );
    Ok(columns)
}

/// Map a parsed JSON value onto a cell value
pub fn json_to_value(value: Json) -> ParquetValue {
    match value {
        Json::Null => ParquetValue::Null,
        Json::Bool(b) => ParquetValue::Boolean(b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                ParquetValue::Int64(i)
            } else if let Some(u) = n.as_u64() {
                ParquetValue::UInt64(u)
            } else {
                ParquetValue::Float64(OrderedFloat(n.as_f64().unwrap_or(f64::NAN)))
            }
        }
        Json::String(s) => ParquetValue::String(Arc::from(s)),
        Json::Array(items) => ParquetValue::List(items.into_iter().map(json_to_value).collect()),
        Json::Object(fields) => ParquetValue::Record(
            fields
                .into_iter()
                .map(|(k, v)| (Arc::from(k), json_to_value(v)))
                .collect(),
        ),
    }
}
