use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Metric, RegionFilter};
use crate::utils::constants::{PM10_GOOD_MAX, PM10_MODERATE_MAX, PM25_GOOD_MAX, PM25_MODERATE_MAX};

/// Qualitative health classification of a pollutant average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThresholdBand {
    Good,
    Moderate,
    Poor,
}

impl ThresholdBand {
    /// Good up to and including `good_max`, Moderate up to and including
    /// `moderate_max`, Poor above.
    pub fn classify(value: f64, good_max: f64, moderate_max: f64) -> Self {
        if value <= good_max {
            ThresholdBand::Good
        } else if value <= moderate_max {
            ThresholdBand::Moderate
        } else {
            ThresholdBand::Poor
        }
    }

    pub fn for_pm25(value: f64) -> Self {
        Self::classify(value, PM25_GOOD_MAX, PM25_MODERATE_MAX)
    }

    pub fn for_pm10(value: f64) -> Self {
        Self::classify(value, PM10_GOOD_MAX, PM10_MODERATE_MAX)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ThresholdBand::Good => "Good",
            ThresholdBand::Moderate => "Moderate",
            ThresholdBand::Poor => "Poor",
        }
    }

    pub fn indicator(&self) -> &'static str {
        match self {
            ThresholdBand::Good => "🟢",
            ThresholdBand::Moderate => "🟡",
            ThresholdBand::Poor => "🔴",
        }
    }
}

/// One region's line in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub region: String,
    #[serde(rename = "avgPM25")]
    pub avg_pm25: Option<f64>,
    #[serde(rename = "avgPM10")]
    pub avg_pm10: Option<f64>,
    #[serde(rename = "avgNO2")]
    pub avg_no2: Option<f64>,
    #[serde(rename = "avgCO2")]
    pub avg_co2: Option<f64>,
    pub avg_temperature: Option<f64>,
    pub avg_humidity: Option<f64>,
    pub reading_count: usize,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub pm25_band: Option<ThresholdBand>,
    pub pm10_band: Option<ThresholdBand>,
}

impl ReportRow {
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Pm25 => self.avg_pm25,
            Metric::Pm10 => self.avg_pm10,
            Metric::No2 => self.avg_no2,
            Metric::Co2 => self.avg_co2,
            Metric::Temperature => self.avg_temperature,
            Metric::Humidity => self.avg_humidity,
        }
    }

    pub fn band(&self, metric: Metric) -> Option<ThresholdBand> {
        match metric {
            Metric::Pm25 => self.pm25_band,
            Metric::Pm10 => self.pm10_band,
            _ => None,
        }
    }
}

/// A single point of a chart series: one region, one metric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub region: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub period_days: u32,
    pub generated_at: DateTime<Utc>,
    pub region_filter: RegionFilter,
    pub rows: Vec<ReportRow>,
    /// Set when the query ran and matched nothing
    pub is_empty: bool,
}

impl Report {
    pub fn row(&self, region: &str) -> Option<&ReportRow> {
        self.rows.iter().find(|row| row.region == region)
    }

    pub fn regions(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.region.as_str()).collect()
    }

    /// Values of one metric across all regions, in report order.
    pub fn series(&self, metric: Metric) -> Vec<SeriesPoint> {
        self.rows
            .iter()
            .map(|row| SeriesPoint {
                region: row.region.clone(),
                value: row.metric(metric),
            })
            .collect()
    }

    pub fn total_readings(&self) -> usize {
        self.rows.iter().map(|row| row.reading_count).sum()
    }
}
