//! Conversion from extracted points to Arrow record batches.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::record_batch::RecordBatch;

use snow_common::{SatelliteDataPoint, SnowError, SnowResult};

use crate::schema::{training_schema, DERIVED_COLUMNS, REFLECTANCE_COLUMNS};

/// Build a record batch from extracted points.
///
/// Missing band values and unset ground-truth fields become nulls; column
/// order follows [`training_schema`].
pub fn records_to_batch(points: &[SatelliteDataPoint]) -> SnowResult<RecordBatch> {
    let schema = training_schema();

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());

    columns.push(Arc::new(StringArray::from(
        points.iter().map(|p| p.date.as_str()).collect::<Vec<_>>(),
    )));
    columns.push(Arc::new(Float64Array::from(
        points.iter().map(|p| p.snow_depth).collect::<Vec<_>>(),
    )));

    for band in REFLECTANCE_COLUMNS.iter().chain(DERIVED_COLUMNS.iter()) {
        columns.push(Arc::new(Float64Array::from(
            points.iter().map(|p| p.band(band)).collect::<Vec<_>>(),
        )));
    }

    columns.push(Arc::new(StringArray::from(
        points.iter().map(|p| p.item_id.as_str()).collect::<Vec<_>>(),
    )));
    columns.push(Arc::new(StringArray::from(
        points
            .iter()
            .map(|p| p.station_triplet.as_deref())
            .collect::<Vec<_>>(),
    )));
    columns.push(Arc::new(Float64Array::from(
        points.iter().map(|p| p.lat).collect::<Vec<_>>(),
    )));
    columns.push(Arc::new(Float64Array::from(
        points.iter().map(|p| p.lon).collect::<Vec<_>>(),
    )));
    columns.push(Arc::new(Float64Array::from(
        points.iter().map(|p| p.elevation).collect::<Vec<_>>(),
    )));

    RecordBatch::try_new(schema, columns)
        .map_err(|e| SnowError::SchemaError(format!("building record batch: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;

    fn labeled_point() -> SatelliteDataPoint {
        let mut p = SatelliteDataPoint::new(39.9, -105.9, "2024-01-15T18:00:00.000Z", "G1");
        p.band_values.insert("red".to_string(), 1200.0);
        p.band_values.insert("is_snow_fmask".to_string(), 1.0);
        p.snow_depth = Some(38.0);
        p.station_triplet = Some("663:CO:SNTL".to_string());
        p.elevation = Some(9340.0);
        p
    }

    #[test]
    fn test_batch_columns_and_nulls() {
        let mut unlabeled = SatelliteDataPoint::new(40.0, -106.0, "2024-01-16T18:00:00.000Z", "G2");
        unlabeled.band_values.insert("red".to_string(), 900.0);

        let batch = records_to_batch(&[labeled_point(), unlabeled]).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 16);

        let schema = batch.schema();
        let depth = batch
            .column(schema.index_of("snow_depth").unwrap())
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(depth.value(0), 38.0);
        assert!(depth.is_null(1));

        let green = batch
            .column(schema.index_of("green").unwrap())
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        // Neither point extracted a green value
        assert!(green.is_null(0));
        assert!(green.is_null(1));

        let triplet = batch
            .column(schema.index_of("station_triplet").unwrap())
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(triplet.value(0), "663:CO:SNTL");
        assert!(triplet.is_null(1));
    }

    #[test]
    fn test_empty_batch() {
        let batch = records_to_batch(&[]).unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), 16);
    }
}
