use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Metric;

/// Aggregated statistics for one region over a query window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub region: String,
    pub avg_pm25: Option<f64>,
    pub avg_pm10: Option<f64>,
    pub avg_no2: Option<f64>,
    pub avg_co2: Option<f64>,
    pub avg_temperature: Option<f64>,
    pub avg_humidity: Option<f64>,
    pub reading_count: usize,
    /// Earliest timestamp observed, not the requested window start
    pub period_start: DateTime<Utc>,
    /// Latest timestamp observed
    pub period_end: DateTime<Utc>,
}

impl RegionSummary {
    pub fn average(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Pm25 => self.avg_pm25,
            Metric::Pm10 => self.avg_pm10,
            Metric::No2 => self.avg_no2,
            Metric::Co2 => self.avg_co2,
            Metric::Temperature => self.avg_temperature,
            Metric::Humidity => self.avg_humidity,
        }
    }
}

/// Average of one metric for one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAverage {
    pub date: NaiveDate,
    pub average: Option<f64>,
    pub readings: usize,
}
