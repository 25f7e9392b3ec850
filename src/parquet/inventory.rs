//! Save inventory rows to a parquet file.

use std::{fs::File, path::Path, sync::Arc};

use anyhow::Result;
use arrow::{
    array::{ArrayRef, Float64Array, Int32Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use parquet::{arrow::ArrowWriter, file::properties::WriterProperties};

use crate::reading::StationRecord;

pub fn save_inventory<'a, I>(stations: I, file_path: &Path) -> Result<()>
where
    I: IntoIterator<Item = &'a StationRecord>,
{
    let file = File::create(file_path)?;

    // Define the schema for the RecordBatch
    let schema = Arc::new(Schema::new(vec![
        Field::new("station_id", DataType::Utf8, false),
        Field::new("lat", DataType::Float64, false),
        Field::new("lon", DataType::Float64, false),
        Field::new("element", DataType::Utf8, false),
        Field::new("first_year", DataType::Int32, false),
        Field::new("last_year", DataType::Int32, false),
    ]));

    let props = WriterProperties::builder()
        .set_compression(parquet::basic::Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

    let mut station_ids = Vec::new();
    let mut latitudes = Vec::new();
    let mut longitudes = Vec::new();
    let mut elements = Vec::new();
    let mut first_years = Vec::new();
    let mut last_years = Vec::new();

    for s in stations {
        station_ids.push(s.station_id.as_str());
        latitudes.push(s.latitude);
        longitudes.push(s.longitude);
        elements.push(s.element.as_str());
        first_years.push(s.first_year);
        last_years.push(s.last_year);
    }

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(station_ids)),
        Arc::new(Float64Array::from(latitudes)),
        Arc::new(Float64Array::from(longitudes)),
        Arc::new(StringArray::from(elements)),
        Arc::new(Int32Array::from(first_years)),
        Arc::new(Int32Array::from(last_years)),
    ];

    let batch = RecordBatch::try_new(schema, columns)?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(())
}

// -- Tests -------------------------------------------------------------------
