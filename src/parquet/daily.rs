//! Save the daily observations to a parquet file.

use std::{fs::File, path::Path, sync::Arc};

use anyhow::Result;
use arrow::{
    array::{ArrayRef, Int32Builder, StringBuilder, UInt32Builder},
    datatypes::{DataType, Field, Schema, SchemaRef},
    record_batch::RecordBatch,
};
use indicatif::ProgressBar;
use parquet::{arrow::ArrowWriter, file::properties::WriterProperties};

use crate::reading::ObservationRecord;

const CHUNK_SIZE: usize = 100_000;

pub fn daily_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("station_id", DataType::Utf8, false),
        Field::new("year", DataType::Int32, false),
        Field::new("month", DataType::UInt32, false),
        Field::new("day", DataType::UInt32, false),
        Field::new("element", DataType::Utf8, false),
        Field::new("value", DataType::Int32, true),
        Field::new("mflag", DataType::Utf8, true),
        Field::new("qflag", DataType::Utf8, true),
        Field::new("sflag", DataType::Utf8, true),
    ]))
}

/// Writes one row per observation. Missing values and absent flags are
/// stored as nulls.
pub fn save_daily(records: &[ObservationRecord], file_path: &Path, pb: &ProgressBar) -> Result<()> {
    let file = File::create(file_path)?;
    let schema = daily_schema();

    let props = WriterProperties::builder()
        .set_compression(parquet::basic::Compression::ZSTD(
            parquet::basic::ZstdLevel::default(),
        ))
        .set_dictionary_enabled(true)
        .build();

    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
    let mut batch = DailyBatch::with_capacity(CHUNK_SIZE.min(records.len()));
    pb.set_length(records.len() as u64);

    for (count, record) in records.iter().enumerate() {
        batch.append(record);

        if batch.rows >= CHUNK_SIZE {
            writer.write(&batch.finish(&schema)?)?;
        }

        // Batch progress updates
        if count % 10_000 == 0 {
            pb.set_position(count as u64);
        }
    }

    if batch.rows > 0 {
        writer.write(&batch.finish(&schema)?)?;
    }

    pb.finish_with_message("Finished writing Parquet file");
    writer.close()?;
    Ok(())
}

struct DailyBatch {
    rows: usize,
    station_ids: StringBuilder,
    years: Int32Builder,
    months: UInt32Builder,
    days: UInt32Builder,
    elements: StringBuilder,
    values: Int32Builder,
    mflags: StringBuilder,
    qflags: StringBuilder,
    sflags: StringBuilder,
}

impl DailyBatch {
    fn with_capacity(capacity: usize) -> Self {
        DailyBatch {
            rows: 0,
            station_ids: StringBuilder::with_capacity(capacity, capacity * 11),
            years: Int32Builder::with_capacity(capacity),
            months: UInt32Builder::with_capacity(capacity),
            days: UInt32Builder::with_capacity(capacity),
            elements: StringBuilder::with_capacity(capacity, capacity * 4),
            values: Int32Builder::with_capacity(capacity),
            mflags: StringBuilder::with_capacity(capacity, capacity),
            qflags: StringBuilder::with_capacity(capacity, capacity),
            sflags: StringBuilder::with_capacity(capacity, capacity),
        }
    }

    fn append(&mut self, record: &ObservationRecord) {
        self.station_ids.append_value(&record.station_id);
        self.years.append_value(record.year);
        self.months.append_value(record.month);
        self.days.append_value(record.day);
        self.elements.append_value(&record.element);
        self.values.append_option(record.value);
        self.mflags.append_option(record.mflag.map(String::from));
        self.qflags.append_option(record.qflag.map(String::from));
        self.sflags.append_option(record.sflag.map(String::from));
        self.rows += 1;
    }

    // Builders are reset by `finish`
    fn finish(&mut self, schema: &SchemaRef) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(self.station_ids.finish()),
            Arc::new(self.years.finish()),
            Arc::new(self.months.finish()),
            Arc::new(self.days.finish()),
            Arc::new(self.elements.finish()),
            Arc::new(self.values.finish()),
            Arc::new(self.mflags.finish()),
            Arc::new(self.qflags.finish()),
            Arc::new(self.sflags.finish()),
        ];
        self.rows = 0;

        Ok(RecordBatch::try_new(schema.clone(), columns)?)
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use std::fs;

    use arrow::array::{Array, Int32Array, StringArray, UInt32Array};
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::NamedTempFile;

    use super::*;

    fn record(day: u32, element: &str, value: Option<i32>, qflag: Option<char>) -> ObservationRecord {
        ObservationRecord {
            station_id: "USW00094728".to_string(),
            year: 2019,
            month: 1,
            day,
            element: element.to_string(),
            value,
            mflag: None,
            qflag,
            sflag: Some('W'),
        }
    }

    #[test]
    fn should_round_trip_long_format() {
        let records = vec![
            record(1, "TMAX", Some(56), None),
            record(2, "TMAX", None, Some('I')),
            record(1, "PRCP", Some(0), None),
        ];

        let temp_file = NamedTempFile::new().unwrap();
        save_daily(&records, temp_file.path(), &ProgressBar::hidden()).unwrap();

        let file = fs::File::open(temp_file.path()).unwrap();
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap();

        let mut total_rows = 0;
        for batch_result in reader {
            let batch = batch_result.unwrap();
            total_rows += batch.num_rows();

            let schema = batch.schema();
            let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
            assert_eq!(
                names,
                vec!["station_id", "year", "month", "day", "element", "value", "mflag", "qflag", "sflag"]
            );

            let days = batch.column(3).as_any().downcast_ref::<UInt32Array>().unwrap();
            let values = batch.column(5).as_any().downcast_ref::<Int32Array>().unwrap();
            let mflags = batch.column(6).as_any().downcast_ref::<StringArray>().unwrap();
            let qflags = batch.column(7).as_any().downcast_ref::<StringArray>().unwrap();

            assert_eq!(days.value(1), 2);
            assert_eq!(values.value(0), 56);
            assert!(values.is_null(1));
            assert_eq!(values.null_count(), 1);
            assert_eq!(mflags.null_count(), 3);
            assert_eq!(qflags.value(1), "I");
        }

        assert_eq!(total_rows, 3);
    }

    #[test]
    fn should_write_empty_table() {
        let temp_file = NamedTempFile::new().unwrap();
        save_daily(&[], temp_file.path(), &ProgressBar::hidden()).unwrap();

        let file = fs::File::open(temp_file.path()).unwrap();
        let builder = ParquetRecordBatchReaderBuilder::try_new(file).unwrap();
        assert_eq!(builder.schema().fields().len(), 9);
    }
}
