//! Core Parquet reading functionality

use crate::{arrow_conversion::arrow_to_parquet_value, ParquetValue, Result};
use arrow::record_batch::RecordBatch;
use arrow_array::Array;
use parquet::arrow::arrow_reader::{ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder};
use parquet::file::metadata::FileMetaData;
use std::sync::Arc;

/// Core Parquet reader that works with any source implementing ChunkReader
#[derive(Clone)]
pub struct Reader<R> {
    inner: R,
}

impl<R> Reader<R>
where
    R: parquet::file::reader::ChunkReader + Clone + 'static,
{
    /// Create a new reader
    pub fn new(reader: R) -> Self {
        Self { inner: reader }
    }

    /// Get the Parquet file metadata
    pub fn metadata(&self) -> Result<FileMetaData> {
        let builder = ParquetRecordBatchReaderBuilder::try_new(self.inner.clone())?;
        Ok(builder.metadata().file_metadata().clone())
    }

    /// Read rows from the Parquet file
    ///
    /// Returns an iterator over rows where each row is a vector of ParquetValues
    pub fn read_rows(self) -> Result<RowIterator> {
        let builder = ParquetRecordBatchReaderBuilder::try_new(self.inner)?;
        let reader = builder.build()?;

        Ok(RowIterator {
            batch_reader: reader,
            current_batch: None,
            current_row: 0,
        })
    }

    /// Read columns from the Parquet file
    ///
    /// Returns an iterator over column batches where each batch contains
    /// arrays of values for each column.
    pub fn read_columns(self, batch_size: Option<usize>) -> Result<ColumnIterator> {
        let mut builder = ParquetRecordBatchReaderBuilder::try_new(self.inner)?;

        let is_empty = builder.metadata().file_metadata().num_rows() == 0;

        if let Some(size) = batch_size {
            builder = builder.with_batch_size(size);
        }

        let schema = builder.schema().clone();
        let reader = builder.build()?;

        Ok(ColumnIterator {
            batch_reader: reader,
            schema,
            returned_empty_batch: false,
            is_empty_file: is_empty,
        })
    }

    /// Read the whole file into named columns, in file order
    pub fn read_table(self) -> Result<Vec<(String, Vec<ParquetValue>)>> {
        let mut table: Vec<(String, Vec<ParquetValue>)> = Vec::new();
        for batch in self.read_columns(None)? {
            let batch = batch?;
            if table.is_empty() {
                table = batch.columns;
                continue;
            }
            for ((_, values), (_, more)) in table.iter_mut().zip(batch.columns) {
                values.extend(more);
            }
        }
        Ok(table)
    }
}

/// Iterator over rows in a Parquet file
pub struct RowIterator {
    batch_reader: ParquetRecordBatchReader,
    current_batch: Option<RecordBatch>,
    current_row: usize,
}

impl Iterator for RowIterator {
    type Item = Result<Vec<ParquetValue>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // If we have a current batch and haven't exhausted it
            if let Some(ref batch) = self.current_batch {
                if self.current_row < batch.num_rows() {
                    let mut row_values = Vec::with_capacity(batch.num_columns());

                    for column in batch.columns() {
                        let value = match arrow_to_parquet_value(column, self.current_row) {
                            Ok(v) => v,
                            Err(e) => return Some(Err(e)),
                        };
                        row_values.push(value);
                    }

                    self.current_row += 1;
                    return Some(Ok(row_values));
                }
            }

            // Need to fetch next batch
            match self.batch_reader.next() {
                Some(Ok(batch)) => {
                    self.current_batch = Some(batch);
                    self.current_row = 0;
                }
                Some(Err(e)) => return Some(Err(e.into())),
                None => return None,
            }
        }
    }
}

/// Iterator over column batches in a Parquet file
pub struct ColumnIterator {
    batch_reader: ParquetRecordBatchReader,
    schema: Arc<arrow_schema::Schema>,
    returned_empty_batch: bool,
    is_empty_file: bool,
}

/// A batch of columns with their names
pub struct ColumnBatch {
    pub columns: Vec<(String, Vec<ParquetValue>)>,
}

impl Iterator for ColumnIterator {
    type Item = Result<ColumnBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        // An empty file still reports its columns once
        if self.is_empty_file && !self.returned_empty_batch {
            self.returned_empty_batch = true;
            let columns = self
                .schema
                .fields()
                .iter()
                .map(|field| (field.name().to_string(), Vec::new()))
                .collect();

            return Some(Ok(ColumnBatch { columns }));
        }

        match self.batch_reader.next() {
            Some(Ok(batch)) => {
                let mut columns = Vec::with_capacity(batch.num_columns());

                for (idx, column) in batch.columns().iter().enumerate() {
                    let column_name = self.schema.field(idx).name().to_string();

                    let mut values = Vec::with_capacity(column.len());
                    for row_idx in 0..column.len() {
                        match arrow_to_parquet_value(column, row_idx) {
                            Ok(value) => values.push(value),
                            Err(e) => return Some(Err(e)),
                        }
                    }

                    columns.push((column_name, values));
                }

                Some(Ok(ColumnBatch { columns }))
            }
            Some(Err(e)) => Some(Err(e.into())),
            None => None,
        }
    }
}
