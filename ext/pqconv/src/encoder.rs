//! Table to Parquet encoding shared by both conversion paths

use crate::config::ConvertOptions;
use crate::dump::{capture_failure, DumpSource};
use crate::error::ConvertError;
use pqconv_core::{write_table, Table};
use std::fs::{self, File};
use std::path::Path;
use tempfile::TempDir;
use tracing::debug;

/// Name of the encoded file inside the scratch directory
const TARGET_FILE: &str = "pq";

/// Build a table with `build`, encode it, and return the Parquet bytes
///
/// Every step runs inside a scratch directory that is removed on return,
/// whether the conversion succeeded or not. A failure of `build` or of the
/// encoding itself is dumped from `source` before it is returned.
pub fn encode<F>(
    source: DumpSource<'_>,
    options: &ConvertOptions,
    build: F,
) -> Result<Vec<u8>, ConvertError>
where
    F: FnOnce() -> Result<Table, ConvertError>,
{
    let scratch = scratch_dir(options)?;
    let target = scratch.path().join(TARGET_FILE);
    debug!("Encoding into {}", target.display());

    if let Err(failure) = build().and_then(|table| encode_to_path(table, &target, options)) {
        return Err(capture_failure(source, &options.dump_dir, failure));
    }

    let bytes = fs::read(&target)?;
    debug!("Encoded {} bytes of Parquet", bytes.len());
    Ok(bytes)
}

fn scratch_dir(options: &ConvertOptions) -> Result<TempDir, ConvertError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("pqconv-");
    let dir = match &options.work_dir {
        Some(parent) => builder.tempdir_in(parent)?,
        None => builder.tempdir()?,
    };
    Ok(dir)
}

fn encode_to_path(table: Table, target: &Path, options: &ConvertOptions) -> Result<(), ConvertError> {
    debug!(
        "Writing {} rows across {} columns",
        table.num_rows(),
        table.num_columns()
    );
    let file = File::create(target).map_err(|e| ConvertError::Encoding(e.into()))?;
    write_table(options.writer_builder(), file, table).map_err(ConvertError::Encoding)
}
