//! Columnar payload to Parquet conversion
//!
//! `pqconv` turns a columnar payload into the bytes of a Parquet file. Two
//! inputs are accepted:
//!
//! - a message-pack encoded mapping of column name to values, see
//!   [`msgpack_to_parquet`]
//! - a JSON-lines file with one object per row, see [`json_lines_to_parquet`]
//!
//! Columns carry no declared type; one is resolved per column while encoding
//! (see `pqconv_core::resolve`). When a payload decodes but cannot be turned
//! into a table or encoded, the input is dumped to `error-<uuid>.json` in
//! [`ConvertOptions::dump_dir`] and the original error is returned.
//!
//! ```no_run
//! use pqconv::{json_lines_to_parquet, ConvertOptions};
//!
//! let options = ConvertOptions::default().with_dump_dir("/var/tmp/pqconv");
//! let parquet = json_lines_to_parquet(b"events.jsonl", &options)?;
//! # Ok::<(), pqconv::ConvertError>(())
//! ```
//!
//! The library logs through `tracing` and installs no subscriber.

pub mod config;
pub mod convert;
pub mod dump;
pub mod encoder;
pub mod error;
pub mod json_lines;
pub mod msgpack;

pub use config::{CompressionCodec, ConvertOptions};
pub use convert::{
    json_lines_file_to_parquet, json_lines_to_parquet, msgpack_to_parquet, msgpack_to_parquet_with,
};
pub use error::{ConvertError, DecodeError, UnknownCodec};
pub use json_lines::{read_json_lines, RecordSet};
pub use msgpack::{decode_msgpack, decode_msgpack_with, ExtensionHandler, ExtensionHandlers};
pub use pqconv_core::ParquetValue;
