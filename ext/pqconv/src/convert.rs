//! Conversion entry points

use crate::config::ConvertOptions;
use crate::dump::DumpSource;
use crate::encoder::encode;
use crate::error::ConvertError;
use crate::json_lines::{path_from_bytes, read_json_lines_file};
use crate::msgpack::{decode_msgpack_with, ExtensionHandlers};
use pqconv_core::{ColumnType, Table};
use std::path::Path;

/// Convert one message-pack encoded mapping of columns to Parquet bytes
///
/// The payload must decode to a mapping from column name to a sequence of
/// values. Decoding failures are returned as-is; failures to build or encode
/// the table first dump the decoded structure as JSON.
pub fn msgpack_to_parquet(data: &[u8], options: &ConvertOptions) -> Result<Vec<u8>, ConvertError> {
    msgpack_to_parquet_with(data, &ExtensionHandlers::default(), options)
}

/// [`msgpack_to_parquet`] with a caller-supplied extension registry
pub fn msgpack_to_parquet_with(
    data: &[u8],
    handlers: &ExtensionHandlers,
    options: &ConvertOptions,
) -> Result<Vec<u8>, ConvertError> {
    let decoded = decode_msgpack_with(data, handlers)?;
    encode(DumpSource::Decoded(&decoded), options, || {
        Table::from_value(decoded.clone(), ColumnType::Object)
            .map_err(ConvertError::TableConstruction)
    })
}

/// Convert the JSON-lines file named by a UTF-8 byte path to Parquet bytes
///
/// Any failure after the path is decoded, including an unreadable or
/// malformed file, copies the file verbatim into the dump directory.
pub fn json_lines_to_parquet(path: &[u8], options: &ConvertOptions) -> Result<Vec<u8>, ConvertError> {
    json_lines_file_to_parquet(&path_from_bytes(path)?, options)
}

/// [`json_lines_to_parquet`] for callers that already hold a [`Path`]
pub fn json_lines_file_to_parquet(
    path: &Path,
    options: &ConvertOptions,
) -> Result<Vec<u8>, ConvertError> {
    encode(DumpSource::File(path), options, || {
        let columns = read_json_lines_file(path)?;
        Table::from_columns(columns, ColumnType::Object).map_err(ConvertError::TableConstruction)
    })
}
