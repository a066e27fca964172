use thiserror::Error;

pub type Result<T> = std::result::Result<T, AirQualityError>;

#[derive(Error, Debug)]
pub enum AirQualityError {
    #[error("Data source unavailable: {message}")]
    DataSourceUnavailable { message: String },

    #[error("Malformed schema: {0}")]
    MalformedSchema(String),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl AirQualityError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        AirQualityError::DataSourceUnavailable {
            message: message.into(),
        }
    }

    /// True when retrying later (or fixing credentials) may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AirQualityError::DataSourceUnavailable { .. })
    }
}

impl From<config::ConfigError> for AirQualityError {
    fn from(err: config::ConfigError) -> Self {
        AirQualityError::Config(err.to_string())
    }
}

/// Classify a SQLite failure: missing tables or columns are schema problems,
/// everything else means the store could not be used.
impl From<rusqlite::Error> for AirQualityError {
    fn from(err: rusqlite::Error) -> Self {
        let message = err.to_string();
        if message.contains("no such table") || message.contains("no such column") {
            AirQualityError::MalformedSchema(message)
        } else {
            AirQualityError::unavailable(message)
        }
    }
}
