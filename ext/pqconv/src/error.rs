use pqconv_core::ParquetError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while decoding a message-pack payload
///
/// Decoding is all-or-nothing: any of these aborts the conversion before a
/// table exists, so no error dump is written.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Malformed message-pack input: {0}")]
    Malformed(#[from] rmpv::decode::Error),

    #[error("Message-pack string is not valid UTF-8")]
    InvalidUtf8,

    #[error("Invalid date payload {payload:?}: {reason}")]
    InvalidDate { payload: String, reason: String },

    #[error("Invalid timestamp payload: {0}")]
    InvalidTimestamp(String),

    #[error("No handler registered for extension type {0}")]
    UnknownExtension(i8),

    #[error("{0} trailing bytes after the message-pack value")]
    TrailingBytes(usize),
}

/// A compression codec name that is not recognised
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown compression codec '{0}', expected one of: snappy, zstd, lz4, uncompressed")]
pub struct UnknownCodec(pub String);

/// Errors surfaced by the conversion entry points
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Failed to decode message-pack input: {0}")]
    Decode(#[from] DecodeError),

    #[error("Source path is not valid UTF-8: {0}")]
    SourcePath(#[source] std::str::Utf8Error),

    #[error("Failed to read {}: {source}", .path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON on line {line} of {}: {source}", .path.display())]
    JsonLine {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Line {line} of {} is not a JSON object", .path.display())]
    NotAnObject { path: PathBuf, line: usize },

    #[error("Failed to build table: {0}")]
    TableConstruction(#[source] ParquetError),

    #[error("Failed to encode Parquet: {0}")]
    Encoding(#[source] ParquetError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing the error dump failed; `original` is the failure being dumped
    #[error("Failed to write error dump {}: {source} (while handling: {original})", .path.display())]
    Dump {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        original: Box<ConvertError>,
    },
}

impl ConvertError {
    /// The failure that caused the conversion to stop, looking through a
    /// failed dump
    pub fn original(&self) -> &ConvertError {
        match self {
            ConvertError::Dump { original, .. } => original.original(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_error_keeps_original() {
        let original = ConvertError::TableConstruction(ParquetError::table_construction(
            "All arrays must be of the same length",
        ));
        let err = ConvertError::Dump {
            path: PathBuf::from("/nowhere/error-x.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory"),
            original: Box::new(original),
        };

        let message = err.to_string();
        assert!(message.contains("/nowhere/error-x.json"));
        assert!(message.contains("All arrays must be of the same length"));
        assert!(matches!(err.original(), ConvertError::TableConstruction(_)));
    }

    #[test]
    fn test_decode_error_converts() {
        let err: ConvertError = DecodeError::UnknownExtension(42).into();
        assert_eq!(
            err.to_string(),
            "Failed to decode message-pack input: No handler registered for extension type 42"
        );
    }
}
