//! Conversion options

use crate::error::UnknownCodec;
use pqconv_core::{Compression, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Compression codec applied to every column chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionCodec {
    Uncompressed,
    #[default]
    Snappy,
    Zstd,
    Lz4,
}

impl CompressionCodec {
    pub fn to_parquet(self) -> Compression {
        match self {
            CompressionCodec::Uncompressed => Compression::UNCOMPRESSED,
            CompressionCodec::Snappy => Compression::SNAPPY,
            CompressionCodec::Zstd => Compression::ZSTD(Default::default()),
            CompressionCodec::Lz4 => Compression::LZ4_RAW,
        }
    }
}

impl FromStr for CompressionCodec {
    type Err = UnknownCodec;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "uncompressed" => Ok(CompressionCodec::Uncompressed),
            "snappy" => Ok(CompressionCodec::Snappy),
            "zstd" => Ok(CompressionCodec::Zstd),
            "lz4" => Ok(CompressionCodec::Lz4),
            _ => Err(UnknownCodec(s.to_string())),
        }
    }
}

impl fmt::Display for CompressionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompressionCodec::Uncompressed => "uncompressed",
            CompressionCodec::Snappy => "snappy",
            CompressionCodec::Zstd => "zstd",
            CompressionCodec::Lz4 => "lz4",
        };
        f.write_str(name)
    }
}

/// Options shared by both conversion entry points
///
/// The defaults reproduce the fixed behavior callers rely on: snappy
/// compression, sub-microsecond timestamps truncated, and error dumps written
/// to the process working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Directory receiving `error-<uuid>.json` dumps
    pub dump_dir: PathBuf,
    pub compression: CompressionCodec,
    pub allow_truncated_timestamps: bool,
    /// Rows per record batch handed to the encoder
    pub batch_size: Option<usize>,
    /// Parent of the per-call scratch directory, the system temp dir if unset
    pub work_dir: Option<PathBuf>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            dump_dir: PathBuf::from("."),
            compression: CompressionCodec::default(),
            allow_truncated_timestamps: true,
            batch_size: None,
            work_dir: None,
        }
    }
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dump_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dump_dir = dir.into();
        self
    }

    pub fn with_compression(mut self, compression: CompressionCodec) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_allow_truncated_timestamps(mut self, allow: bool) -> Self {
        self.allow_truncated_timestamps = allow;
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    pub(crate) fn writer_builder(&self) -> WriterBuilder {
        let builder = WriterBuilder::new()
            .with_compression(self.compression.to_parquet())
            .with_allow_truncated_timestamps(self.allow_truncated_timestamps);
        match self.batch_size {
            Some(size) => builder.with_batch_size(size),
            None => builder,
        }
    }
}
