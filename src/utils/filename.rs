use chrono::{Datelike, Local, NaiveDate};
use std::path::PathBuf;

use crate::utils::constants::{DEFAULT_OUTPUT_DIR, EXPORT_FILE_STEM};

/// Default chart export path: output/airquality-report-{YYMMDD}.parquet
pub fn generate_default_export_filename() -> PathBuf {
    export_filename_for(Local::now().date_naive())
}

pub fn export_filename_for(date: NaiveDate) -> PathBuf {
    let filename = format!(
        "{}-{:02}{:02}{:02}.parquet",
        EXPORT_FILE_STEM,
        date.year() % 100,
        date.month(),
        date.day()
    );
    PathBuf::from(DEFAULT_OUTPUT_DIR).join(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_filename_for_date() {
        let path = export_filename_for(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
        assert_eq!(path, PathBuf::from("output").join("airquality-report-240307.parquet"));
    }

    #[test]
    fn test_generate_default_export_filename() {
        let filename = generate_default_export_filename();
        let file_part = filename.file_name().unwrap().to_string_lossy();

        assert!(filename.starts_with("output"));
        assert!(file_part.starts_with("airquality-report-"));
        assert!(file_part.ends_with(".parquet"));
        assert_eq!(file_part.len(), "airquality-report-YYMMDD.parquet".len());
    }
}
