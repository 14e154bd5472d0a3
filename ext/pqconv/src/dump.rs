//! Error dumps for failed conversions
//!
//! When a table cannot be built or encoded, the input is preserved as
//! `error-<uuid>.json` in the configured dump directory so it can be replayed
//! later. The original failure is always what the caller sees; a dump that
//! cannot be written is reported as [`ConvertError::Dump`] wrapping it.

use crate::error::ConvertError;
use pqconv_core::ParquetValue;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{error, warn};
use uuid::Uuid;

/// What to preserve when a conversion fails
#[derive(Debug, Clone, Copy)]
pub enum DumpSource<'a> {
    /// A decoded structure, written out as JSON
    Decoded(&'a ParquetValue),
    /// A source file, copied byte for byte
    File(&'a Path),
}

/// A fresh, unique dump path inside `dir`
pub fn dump_path(dir: &Path) -> PathBuf {
    dir.join(format!("error-{}.json", Uuid::new_v4()))
}

/// Write the dump for `failure` and hand back the error to propagate
pub fn capture_failure(source: DumpSource<'_>, dump_dir: &Path, failure: ConvertError) -> ConvertError {
    let path = dump_path(dump_dir);
    let written = match source {
        DumpSource::Decoded(value) => write_json(&path, value),
        DumpSource::File(file) => fs::copy(file, &path).map(|_| ()),
    };

    match written {
        Ok(()) => {
            warn!(
                "Conversion failed, input dumped to {}: {}",
                path.display(),
                failure
            );
            failure
        }
        Err(source) => {
            error!(
                "Failed to write error dump {}: {} (while handling: {})",
                path.display(),
                source,
                failure
            );
            ConvertError::Dump {
                path,
                source,
                original: Box::new(failure),
            }
        }
    }
}

fn write_json(path: &Path, value: &ParquetValue) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &value.to_json())?;
    writer.flush()
}
