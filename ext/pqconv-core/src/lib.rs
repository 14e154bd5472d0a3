//! Columnar core for turning decoded records into Parquet
//!
//! `pqconv-core` holds everything between a decoded record set and the bytes
//! of a Parquet file. It wraps the Apache arrow-rs and parquet-rs crates with
//! a small API shaped around one use case: columns that arrive without a
//! declared type.
//!
//! # Key Components
//!
//! - **Values**: [`ParquetValue`], the dynamically typed cell produced by the
//!   decoders (scalars, dates, timestamps, lists, records and maps)
//!
//! - **Table**: [`Table`] of named, equal-length columns, each declared either
//!   [`ColumnType::Object`] (type deferred to the writer) or with an explicit
//!   Arrow type
//!
//! - **Resolution**: [`resolve`] picks one Arrow type per opaque column from
//!   its values and rejects columns whose values cannot share a type
//!
//! - **Writer**: [`Writer`] encodes a table to any `std::io::Write + Send`
//!   sink with configurable compression and timestamp truncation
//!
//! - **Reader**: [`Reader`] decodes Parquet bytes back into values, row-wise
//!   or column-wise
//!
//! - **Arrow Conversion**: value to array conversion for the writer and the
//!   reverse for the reader

pub mod arrow_conversion;
pub mod error;
pub mod reader;
pub mod resolve;
pub mod table;
pub mod value;
pub mod writer;

#[cfg(test)]
pub mod test_utils;

pub use arrow_conversion::ConversionOptions;
pub use error::{ErrorContext, ParquetError, Result};
pub use reader::Reader;
pub use table::{Column, ColumnType, Table};
pub use value::ParquetValue;
pub use writer::{write_table, Writer, WriterBuilder};

// Re-exported so callers can name codecs without depending on parquet directly
pub use parquet::basic::Compression;
