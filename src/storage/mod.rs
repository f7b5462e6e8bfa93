//! Storage backend (Arrow/Parquet)
//!
//! Loads the simulation's trial and state datasets into Arrow record
//! batches. Only the requested root columns are decoded, which keeps the
//! large state files (one list column per row) affordable.
//!
//! Tables are read-only snapshots for the duration of a report run.

use crate::{Error, Result};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::{RecordBatch, RecordBatchReader};
use std::path::Path;
use tracing::debug;

/// Rows per decoded batch
pub const READ_BATCH_SIZE: usize = 64 * 1024;

/// In-memory table for one dataset
#[derive(Debug, Clone)]
pub struct StorageEngine {
    dataset: String,
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl StorageEngine {
    /// Create a storage engine from existing batches
    ///
    /// Useful for testing and benchmarking
    #[must_use]
    pub fn new(dataset: impl Into<String>, schema: SchemaRef, batches: Vec<RecordBatch>) -> Self {
        Self {
            dataset: dataset.into(),
            schema,
            batches,
        }
    }

    /// Load the named columns of a Parquet file
    ///
    /// Columns come back in the requested order; a name requested twice is
    /// read once.
    ///
    /// # Errors
    /// Returns [`Error::Load`] if the file cannot be opened or decoded, or if
    /// a requested column is absent from the file schema
    pub fn load_parquet_columns<P: AsRef<Path>>(
        path: P,
        dataset: &str,
        columns: &[&str],
    ) -> Result<Self> {
        use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
        use parquet::arrow::ProjectionMask;
        use std::fs::File;

        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::load(dataset, format!("Failed to open {}: {e}", path.display()))
        })?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| {
            Error::load(dataset, format!("Failed to parse {}: {e}", path.display()))
        })?;

        let mut requested: Vec<&str> = Vec::with_capacity(columns.len());
        for &name in columns {
            if !requested.contains(&name) {
                requested.push(name);
            }
        }

        let file_schema = builder.schema().clone();
        let mut roots = Vec::with_capacity(requested.len());
        for name in &requested {
            let index = file_schema.index_of(name).map_err(|_| {
                Error::load(
                    dataset,
                    format!("Column not found in {}: {name}", path.display()),
                )
            })?;
            roots.push(index);
        }

        let mask = ProjectionMask::roots(builder.parquet_schema(), roots);
        let reader = builder
            .with_projection(mask)
            .with_batch_size(READ_BATCH_SIZE)
            .build()
            .map_err(|e| Error::load(dataset, format!("Failed to create Parquet reader: {e}")))?;

        // Projection keeps file order; map back to the requested order
        let projected = reader.schema();
        let order = requested
            .iter()
            .map(|name| projected.index_of(name))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let schema = SchemaRef::new(projected.project(&order)?);

        let mut storage = Self::new(dataset, schema, Vec::new());
        for batch in reader {
            let batch = batch
                .map_err(|e| Error::load(dataset, format!("Failed to read record batch: {e}")))?;
            storage.append_batch(batch.project(&order)?)?;
        }

        debug!(
            dataset,
            path = %path.display(),
            columns = ?requested,
            rows = storage.num_rows(),
            "loaded parquet columns"
        );
        Ok(storage)
    }

    /// Get all record batches
    #[must_use]
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Total row count across batches
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    /// Append a batch
    ///
    /// # Errors
    ///
    /// Returns error if batch schema doesn't match the table schema
    pub fn append_batch(&mut self, batch: RecordBatch) -> Result<()> {
        if batch.schema() != self.schema {
            return Err(Error::load(
                self.dataset.as_str(),
                format!(
                    "Schema mismatch: expected {:?}, got {:?}",
                    self.schema,
                    batch.schema()
                ),
            ));
        }

        self.batches.push(batch);
        Ok(())
    }

    /// Combine all batches into a single batch
    ///
    /// An empty table yields an empty batch carrying the table schema.
    ///
    /// # Errors
    /// Returns error if Arrow fails to concatenate the batches
    pub fn to_batch(&self) -> Result<RecordBatch> {
        match self.batches.as_slice() {
            [] => Ok(RecordBatch::new_empty(self.schema.clone())),
            [single] => Ok(single.clone()),
            batches => Ok(arrow::compute::concat_batches(&self.schema, batches)?),
        }
    }
}
