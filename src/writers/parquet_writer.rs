use crate::error::{AirQualityError, Result};
use crate::models::ReportRow;
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use arrow::array::{ArrayRef, Float64Array, StringArray, TimestampMicrosecondArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Writes report rows as a flat chart table, one row per region.
pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(AirQualityError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    /// Write report rows to `path`. Nothing is written for an empty slice.
    pub fn write_rows(&self, rows: &[ReportRow], path: &Path) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let schema = Self::create_schema();
        let batch = Self::rows_to_batch(rows, schema.clone())?;

        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
        writer.write(&batch)?;
        writer.close()?;

        debug!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(())
    }

    /// Averages are nullable: a region can lack every value of a metric.
    pub fn create_schema() -> Arc<Schema> {
        let timestamp = DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()));
        let fields = vec![
            Field::new("region", DataType::Utf8, false),
            Field::new("avg_pm25", DataType::Float64, true),
            Field::new("avg_pm10", DataType::Float64, true),
            Field::new("avg_no2", DataType::Float64, true),
            Field::new("avg_co2", DataType::Float64, true),
            Field::new("avg_temperature", DataType::Float64, true),
            Field::new("avg_humidity", DataType::Float64, true),
            Field::new("reading_count", DataType::UInt64, false),
            Field::new("period_start", timestamp.clone(), false),
            Field::new("period_end", timestamp, false),
            Field::new("pm25_band", DataType::Utf8, true),
            Field::new("pm10_band", DataType::Utf8, true),
        ];

        Arc::new(Schema::new(fields))
    }

    fn rows_to_batch(rows: &[ReportRow], schema: Arc<Schema>) -> Result<RecordBatch> {
        let floats = |f: fn(&ReportRow) -> Option<f64>| -> ArrayRef {
            Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
        };

        let regions: Vec<&str> = rows.iter().map(|r| r.region.as_str()).collect();
        let counts: Vec<u64> = rows.iter().map(|r| r.reading_count as u64).collect();
        let starts: Vec<i64> = rows.iter().map(|r| r.period_start.timestamp_micros()).collect();
        let ends: Vec<i64> = rows.iter().map(|r| r.period_end.timestamp_micros()).collect();
        let pm25_bands: Vec<Option<&str>> =
            rows.iter().map(|r| r.pm25_band.map(|b| b.label())).collect();
        let pm10_bands: Vec<Option<&str>> =
            rows.iter().map(|r| r.pm10_band.map(|b| b.label())).collect();

        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(regions)),
            floats(|r| r.avg_pm25),
            floats(|r| r.avg_pm10),
            floats(|r| r.avg_no2),
            floats(|r| r.avg_co2),
            floats(|r| r.avg_temperature),
            floats(|r| r.avg_humidity),
            Arc::new(UInt64Array::from(counts)),
            Arc::new(TimestampMicrosecondArray::from(starts).with_timezone("UTC")),
            Arc::new(TimestampMicrosecondArray::from(ends).with_timezone("UTC")),
            Arc::new(StringArray::from(pm25_bands)),
            Arc::new(StringArray::from(pm10_bands)),
        ];

        Ok(RecordBatch::try_new(schema, columns)?)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let row_groups = metadata.num_row_groups();
        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();

        Ok(ParquetFileInfo {
            total_rows: metadata.file_metadata().num_rows(),
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size: std::fs::metadata(path)?.len(),
            compression: self.compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Parquet File Summary:\n\
            - Regions: {}\n\
            - Row groups: {}\n\
            - File size: {:.1} KB\n\
            - Compression: {:?}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1024.0,
            self.compression,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ThresholdBand;
    use arrow::array::Array;
    use chrono::{TimeZone, Utc};
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::NamedTempFile;

    fn row(region: &str, pm25: Option<f64>) -> ReportRow {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 6, 0, 0).unwrap();
        ReportRow {
            region: region.to_string(),
            avg_pm25: pm25,
            avg_pm10: Some(60.0),
            avg_no2: None,
            avg_co2: Some(340.0),
            avg_temperature: Some(25.5),
            avg_humidity: Some(60.0),
            reading_count: 12,
            period_start: ts,
            period_end: ts,
            pm25_band: pm25.map(ThresholdBand::for_pm25),
            pm10_band: Some(ThresholdBand::Moderate),
        }
    }

    #[test]
    fn test_write_empty_rows() {
        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new().unwrap();

        assert!(writer.write_rows(&[], temp_file.path()).is_ok());
    }

    #[test]
    fn test_rows_round_trip_with_nulls() -> Result<()> {
        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new().unwrap();

        writer.write_rows(&[row("Delta", Some(27.0)), row("Sinai", None)], temp_file.path())?;

        let info = writer.get_file_info(temp_file.path())?;
        assert_eq!(info.total_rows, 2);
        assert!(info.summary().contains("Regions: 2"));

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(temp_file.path())?)?
            .build()?;
        let batch = reader.into_iter().next().unwrap()?;
        let pm25 = batch
            .column(1)
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(pm25.value(0), 27.0);
        assert!(pm25.is_null(1));

        let bands = batch
            .column(10)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(bands.value(0), "Moderate");
        assert!(bands.is_null(1));
        Ok(())
    }

    #[test]
    fn test_different_compressions() -> Result<()> {
        for compression in ["snappy", "gzip", "lz4", "zstd", "none"] {
            let writer = ParquetWriter::new().with_compression(compression)?;
            let temp_file = NamedTempFile::new().unwrap();

            let result = writer.write_rows(&[row("Delta", Some(27.0))], temp_file.path());
            assert!(result.is_ok(), "Failed with compression: {}", compression);
        }

        assert!(ParquetWriter::new().with_compression("brotli-9000").is_err());
        Ok(())
    }
}
