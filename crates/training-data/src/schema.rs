//! Columnar schema of the training dataset.

use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema, SchemaRef};

/// Canonical reflectance band columns, in schema order.
pub const REFLECTANCE_COLUMNS: [&str; 7] = [
    "coastal", "blue", "green", "red", "nir08", "swir16", "swir22",
];

/// Derived band columns appended after the reflectance bands.
pub const DERIVED_COLUMNS: [&str; 2] = ["fsca", "is_snow_fmask"];

/// Schema of one training record.
///
/// Band columns are nullable: a record produced from an item with missing
/// or unreadable bands still carries the bands that did extract. The label
/// column `snow_depth` is nullable too; consumers filter on it before
/// training.
pub fn training_schema() -> SchemaRef {
    let mut fields = vec![
        Field::new("date", DataType::Utf8, false),
        Field::new("snow_depth", DataType::Float64, true),
    ];
    for band in REFLECTANCE_COLUMNS.iter().chain(DERIVED_COLUMNS.iter()) {
        fields.push(Field::new(*band, DataType::Float64, true));
    }
    fields.extend([
        Field::new("item_id", DataType::Utf8, false),
        Field::new("station_triplet", DataType::Utf8, true),
        Field::new("latitude", DataType::Float64, false),
        Field::new("longitude", DataType::Float64, false),
        Field::new("elevation", DataType::Float64, true),
    ]);

    Arc::new(Schema::new(fields))
}
