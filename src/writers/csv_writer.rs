use crate::error::Result;
use crate::models::{DailyAverage, ReportRow};
use csv::WriterBuilder;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Writes chart series as CSV with a header row taken from the field names.
#[derive(Debug, Default)]
pub struct CsvWriter;

impl CsvWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write_rows(&self, rows: &[ReportRow], path: &Path) -> Result<()> {
        self.write_records(rows, path)
    }

    pub fn write_trend(&self, trend: &[DailyAverage], path: &Path) -> Result<()> {
        self.write_records(trend, path)
    }

    fn write_records<T: Serialize>(&self, records: &[T], path: &Path) -> Result<()> {
        let mut writer = WriterBuilder::new().has_headers(true).from_path(path)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        debug!("Wrote {} CSV records to {}", records.len(), path.display());
        Ok(())
    }
}
