//! Core Parquet writing functionality

use crate::{
    arrow_conversion::{parquet_values_to_arrow_array, ConversionOptions},
    resolve::resolve_schema,
    ErrorContext, ParquetError, Result, Table,
};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow_schema::SchemaRef;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

// Default configuration constants
const DEFAULT_BATCH_SIZE: usize = 64 * 1024;
const MIN_BATCH_SIZE: usize = 1;

/// Builder for creating a configured Writer
#[derive(Debug, Clone)]
pub struct WriterBuilder {
    compression: Compression,
    batch_size: usize,
    allow_truncated_timestamps: bool,
}

impl Default for WriterBuilder {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            batch_size: DEFAULT_BATCH_SIZE,
            allow_truncated_timestamps: false,
        }
    }
}

impl WriterBuilder {
    /// Create a new WriterBuilder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the compression algorithm
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set the number of rows per record batch handed to the encoder
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(MIN_BATCH_SIZE);
        self
    }

    /// Truncate sub-microsecond timestamp precision instead of rejecting it
    pub fn with_allow_truncated_timestamps(mut self, allow: bool) -> Self {
        self.allow_truncated_timestamps = allow;
        self
    }

    /// Resolve the table's schema and build a Writer over `writer`
    pub fn build<W: std::io::Write + Send>(self, writer: W, table: &Table) -> Result<Writer<W>> {
        let arrow_schema = resolve_schema(table)?;

        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .build();

        let arrow_writer = ArrowWriter::try_new(writer, arrow_schema.clone(), Some(props))?;

        Ok(Writer {
            arrow_writer: Some(arrow_writer),
            arrow_schema,
            batch_size: self.batch_size,
            options: ConversionOptions {
                allow_truncated_timestamps: self.allow_truncated_timestamps,
            },
            rows_written: 0,
        })
    }
}

/// Core Parquet writer that works with any type implementing Write
pub struct Writer<W: std::io::Write> {
    arrow_writer: Option<ArrowWriter<W>>,
    arrow_schema: SchemaRef,
    batch_size: usize,
    options: ConversionOptions,
    rows_written: usize,
}

impl<W> Writer<W>
where
    W: std::io::Write + Send,
{
    /// Create a new writer with default settings
    pub fn new(writer: W, table: &Table) -> Result<Self> {
        WriterBuilder::new().build(writer, table)
    }

    /// The schema resolved for the table this writer was built for
    pub fn schema(&self) -> &SchemaRef {
        &self.arrow_schema
    }

    /// Number of rows handed to the encoder so far
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Write every row of the table
    ///
    /// The table must have the same columns, in the same order, as the one
    /// the writer was built for.
    pub fn write_table(&mut self, table: Table) -> Result<()> {
        let schema_fields = self.arrow_schema.fields();
        if table.num_columns() != schema_fields.len() {
            return Err(ParquetError::Schema(format!(
                "Provided {} columns but schema has {} fields",
                table.num_columns(),
                schema_fields.len()
            )));
        }

        let num_rows = table.num_rows();
        let mut arrow_columns = Vec::with_capacity(schema_fields.len());
        for (column, field) in table.into_columns().into_iter().zip(schema_fields.iter()) {
            if column.name.as_ref() != field.name() {
                return Err(ParquetError::Schema(format!(
                    "Column '{}' does not match schema field '{}'",
                    column.name,
                    field.name()
                )));
            }
            let array = parquet_values_to_arrow_array(column.values, field, self.options)
                .with_context(|| format!("column '{}'", field.name()))?;
            arrow_columns.push(array);
        }

        let batch = RecordBatch::try_new_with_options(
            self.arrow_schema.clone(),
            arrow_columns,
            &RecordBatchOptions::new().with_row_count(Some(num_rows)),
        )?;

        let writer = self.arrow_writer.as_mut().ok_or_else(|| {
            ParquetError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "Writer has been closed",
            ))
        })?;

        let mut offset = 0;
        while offset < num_rows {
            let length = self.batch_size.min(num_rows - offset);
            writer.write(&batch.slice(offset, length))?;
            offset += length;
        }
        self.rows_written += num_rows;

        Ok(())
    }

    /// Flush buffered row groups
    pub fn flush(&mut self) -> Result<()> {
        if let Some(writer) = &mut self.arrow_writer {
            writer.flush()?;
        }
        Ok(())
    }

    /// Close the writer and write the file footer
    ///
    /// This must be called to finalize the Parquet file
    pub fn close(mut self) -> Result<()> {
        if let Some(writer) = self.arrow_writer.take() {
            writer.close()?;
        }
        Ok(())
    }
}

/// Encode a whole table into a sink in one go
pub fn write_table<W: std::io::Write + Send>(
    builder: WriterBuilder,
    sink: W,
    table: Table,
) -> Result<()> {
    let mut writer = builder.build(sink, &table)?;
    writer.write_table(table)?;
    writer.close()
}
