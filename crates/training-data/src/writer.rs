//! Parquet persistence with append semantics.
//!
//! Parquet files are immutable, so "append" means read-merge-rewrite: the
//! existing row groups are read back, the new batch is written after them
//! and the result replaces the old file atomically (temp file + rename for
//! local paths, single put for object stores).

use std::fs::File;
use std::path::Path as FsPath;
use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use object_store::{path::Path as ObjectPath, ObjectStore};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use tracing::{debug, instrument};

use snow_common::{SatelliteDataPoint, SnowError, SnowResult};

use crate::batch::records_to_batch;
use crate::schema::training_schema;

fn schema_err(context: &str, e: impl std::fmt::Display) -> SnowError {
    SnowError::SchemaError(format!("{}: {}", context, e))
}

/// Read every record batch out of a Parquet file held in memory.
pub fn read_batches(bytes: Bytes) -> SnowResult<Vec<RecordBatch>> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(bytes)
        .map_err(|e| schema_err("reading parquet metadata", e))?
        .build()
        .map_err(|e| schema_err("building parquet reader", e))?;

    reader
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| schema_err("reading record batch", e))
}

/// Serialize existing batches plus one new batch into a fresh Parquet file.
///
/// All batches must match the training schema; a shape drift in the
/// existing file is surfaced instead of silently widening the table.
pub fn merge_parquet(existing: Option<Bytes>, batch: &RecordBatch) -> SnowResult<Vec<u8>> {
    let schema = training_schema();
    if batch.schema() != schema {
        return Err(SnowError::SchemaError(
            "new batch does not match the training schema".to_string(),
        ));
    }

    let previous = match existing {
        Some(bytes) => read_batches(bytes)?,
        None => Vec::new(),
    };
    for old in &previous {
        if old.schema() != schema {
            return Err(SnowError::SchemaError(
                "existing table does not match the training schema".to_string(),
            ));
        }
    }

    let mut buf = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buf, schema, None)
        .map_err(|e| schema_err("creating parquet writer", e))?;
    for old in &previous {
        writer
            .write(old)
            .map_err(|e| schema_err("writing existing rows", e))?;
    }
    writer
        .write(batch)
        .map_err(|e| schema_err("writing new rows", e))?;
    writer
        .close()
        .map_err(|e| schema_err("closing parquet writer", e))?;

    Ok(buf)
}

/// Append extracted points to a local Parquet file, creating it if absent.
#[instrument(skip(points), fields(points = points.len()))]
pub fn append_to_file(path: &FsPath, points: &[SatelliteDataPoint]) -> SnowResult<usize> {
    let batch = records_to_batch(points)?;

    let existing = match std::fs::read(path) {
        Ok(bytes) => Some(Bytes::from(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };

    let merged = merge_parquet(existing, &batch)?;

    let tmp = path.with_extension("parquet.tmp");
    {
        let mut file = File::create(&tmp)?;
        std::io::Write::write_all(&mut file, &merged)?;
    }
    std::fs::rename(&tmp, path)?;

    debug!(path = %path.display(), rows = points.len(), "training rows appended");
    Ok(points.len())
}

/// A training table living in an object store.
pub struct TrainingTable {
    store: Arc<dyn ObjectStore>,
    path: ObjectPath,
}

impl TrainingTable {
    pub fn new(store: Arc<dyn ObjectStore>, path: impl Into<ObjectPath>) -> Self {
        Self {
            store,
            path: path.into(),
        }
    }

    /// Append extracted points, creating the table on first write.
    #[instrument(skip(self, points), fields(path = %self.path, points = points.len()))]
    pub async fn append(&self, points: &[SatelliteDataPoint]) -> SnowResult<usize> {
        let batch = records_to_batch(points)?;

        let existing = match self.store.get(&self.path).await {
            Ok(result) => Some(
                result
                    .bytes()
                    .await
                    .map_err(|e| SnowError::StorageError(format!("reading table: {}", e)))?,
            ),
            Err(object_store::Error::NotFound { .. }) => None,
            Err(e) => {
                return Err(SnowError::StorageError(format!("fetching table: {}", e)));
            }
        };

        let merged = merge_parquet(existing, &batch)?;
        self.store
            .put(&self.path, Bytes::from(merged))
            .await
            .map_err(|e| SnowError::StorageError(format!("writing table: {}", e)))?;

        Ok(points.len())
    }

    /// Read the whole table back.
    pub async fn read_all(&self) -> SnowResult<Vec<RecordBatch>> {
        let bytes = self
            .store
            .get(&self.path)
            .await
            .map_err(|e| SnowError::StorageError(format!("fetching table: {}", e)))?
            .bytes()
            .await
            .map_err(|e| SnowError::StorageError(format!("reading table: {}", e)))?;
        read_batches(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, StringArray};
    use object_store::memory::InMemory;

    fn point(item_id: &str, depth: Option<f64>) -> SatelliteDataPoint {
        let mut p = SatelliteDataPoint::new(39.9, -105.9, "2024-01-15T18:00:00.000Z", item_id);
        p.band_values.insert("red".to_string(), 1200.0);
        p.snow_depth = depth;
        p
    }

    #[test]
    fn test_merge_round_trip() {
        let batch = records_to_batch(&[point("G1", Some(38.0))]).unwrap();
        let bytes = merge_parquet(None, &batch).unwrap();

        let batches = read_batches(Bytes::from(bytes)).unwrap();
        let total: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(total, 1);

        let first = &batches[0];
        let ids = first
            .column(first.schema().index_of("item_id").unwrap())
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap()
            .clone();
        assert_eq!(ids.value(0), "G1");
    }

    #[test]
    fn test_merge_appends_after_existing_rows() {
        let first = records_to_batch(&[point("G1", Some(38.0))]).unwrap();
        let file = merge_parquet(None, &first).unwrap();

        let second = records_to_batch(&[point("G2", None), point("G3", Some(12.0))]).unwrap();
        let merged = merge_parquet(Some(Bytes::from(file)), &second).unwrap();

        let batches = read_batches(Bytes::from(merged)).unwrap();
        let total: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(total, 3);

        let depths: Vec<Option<f64>> = batches
            .iter()
            .flat_map(|b| {
                b.column(b.schema().index_of("snow_depth").unwrap())
                    .as_any()
                    .downcast_ref::<Float64Array>()
                    .unwrap()
                    .iter()
                    .collect::<Vec<_>>()
            })
            .collect();
        assert_eq!(depths, vec![Some(38.0), None, Some(12.0)]);
    }

    #[test]
    fn test_append_to_file_creates_and_grows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("training.parquet");

        append_to_file(&path, &[point("G1", Some(38.0))]).unwrap();
        append_to_file(&path, &[point("G2", None)]).unwrap();

        let bytes = Bytes::from(std::fs::read(&path).unwrap());
        let total: usize = read_batches(bytes).unwrap().iter().map(|b| b.num_rows()).sum();
        assert_eq!(total, 2);
    }

    #[tokio::test]
    async fn test_object_store_table_append() {
        let table = TrainingTable::new(Arc::new(InMemory::new()), "tables/training.parquet");

        table.append(&[point("G1", Some(38.0))]).await.unwrap();
        table.append(&[point("G2", Some(4.0))]).await.unwrap();

        let batches = table.read_all().await.unwrap();
        let total: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(total, 2);
    }
}
