use thiserror::Error;

/// Core error type for table construction and Parquet operations
#[derive(Error, Debug)]
pub enum ParquetError {
    /// IO errors from file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow errors from Arrow operations
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    /// Parquet format errors
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Schema-related errors
    #[error("Schema error: {0}")]
    Schema(String),

    /// Type conversion errors
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Invalid argument errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The decoded structure cannot be shaped into a table
    #[error("Table construction error: {0}")]
    TableConstruction(String),

    /// Internal errors that shouldn't happen
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Parquet operations
pub type Result<T> = std::result::Result<T, ParquetError>;

impl ParquetError {
    /// Create a new schema error
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        ParquetError::Schema(msg.into())
    }

    /// Create a new conversion error
    pub fn conversion<S: Into<String>>(msg: S) -> Self {
        ParquetError::Conversion(msg.into())
    }

    /// Create a new invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        ParquetError::InvalidArgument(msg.into())
    }

    /// Create a new table construction error
    pub fn table_construction<S: Into<String>>(msg: S) -> Self {
        ParquetError::TableConstruction(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        ParquetError::Internal(msg.into())
    }
}

/// Extension trait to add context to errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn context<S: Into<String>>(self, ctx: S) -> Result<T>;

    /// Add context with a closure that's only called on error
    fn with_context<S: Into<String>, F: FnOnce() -> S>(self, f: F) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<ParquetError>,
{
    fn context<S: Into<String>>(self, ctx: S) -> Result<T> {
        self.map_err(|e| prefix_error(e.into(), ctx.into()))
    }

    fn with_context<S: Into<String>, F: FnOnce() -> S>(self, f: F) -> Result<T> {
        self.map_err(|e| prefix_error(e.into(), f().into()))
    }
}

/// Prefix a message onto an error while keeping its variant where it carries text
fn prefix_error(err: ParquetError, ctx: String) -> ParquetError {
    match err {
        ParquetError::Schema(msg) => ParquetError::Schema(format!("{}: {}", ctx, msg)),
        ParquetError::Conversion(msg) => ParquetError::Conversion(format!("{}: {}", ctx, msg)),
        ParquetError::InvalidArgument(msg) => {
            ParquetError::InvalidArgument(format!("{}: {}", ctx, msg))
        }
        ParquetError::TableConstruction(msg) => {
            ParquetError::TableConstruction(format!("{}: {}", ctx, msg))
        }
        other => ParquetError::Internal(format!("{}: {}", ctx, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ParquetError::schema("Invalid schema");
        assert_eq!(err.to_string(), "Schema error: Invalid schema");

        let err = ParquetError::conversion("Cannot convert value");
        assert_eq!(err.to_string(), "Conversion error: Cannot convert value");

        let err = ParquetError::table_construction("ragged columns");
        assert_eq!(err.to_string(), "Table construction error: ragged columns");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: ParquetError = io_err.into();
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_error_context_keeps_conversion_variant() {
        fn failing_operation() -> Result<()> {
            Err(ParquetError::conversion("cannot unify String with Int64"))
        }

        let err = failing_operation().context("column 'a'").unwrap_err();
        assert!(matches!(err, ParquetError::Conversion(_)));
        assert_eq!(
            err.to_string(),
            "Conversion error: column 'a': cannot unify String with Int64"
        );
    }

    #[test]
    fn test_error_with_context() {
        fn failing_operation() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into())
        }

        let path = "/tmp/out/pq";
        let err = failing_operation()
            .with_context(|| format!("Writing {}", path))
            .unwrap_err();

        assert!(matches!(err, ParquetError::Internal(_)));
        assert!(err.to_string().contains("Writing /tmp/out/pq"));
    }
}
