use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AirQualityError;
use crate::utils::measurement::parse_measurement;

/// The six quantities measured by every sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Pm25,
    Pm10,
    No2,
    Co2,
    Temperature,
    Humidity,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Pm25,
        Metric::Pm10,
        Metric::No2,
        Metric::Co2,
        Metric::Temperature,
        Metric::Humidity,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Column name in the reading table
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Pm25 => "pm25",
            Metric::Pm10 => "pm10",
            Metric::No2 => "no2",
            Metric::Co2 => "co2",
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
        }
    }

    /// Field name used for the metric's average in reports and chart series
    pub fn report_field(&self) -> &'static str {
        match self {
            Metric::Pm25 => "avgPM25",
            Metric::Pm10 => "avgPM10",
            Metric::No2 => "avgNO2",
            Metric::Co2 => "avgCO2",
            Metric::Temperature => "avgTemperature",
            Metric::Humidity => "avgHumidity",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Metric::Pm25 => "PM2.5",
            Metric::Pm10 => "PM10",
            Metric::No2 => "NO2",
            Metric::Co2 => "CO2",
            Metric::Temperature => "Temperature",
            Metric::Humidity => "Humidity",
        }
    }

    pub fn units(&self) -> &'static str {
        match self {
            Metric::Pm25 | Metric::Pm10 | Metric::No2 => "μg/m³",
            Metric::Co2 => "ppm",
            Metric::Temperature => "°C",
            Metric::Humidity => "%",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Metric {
    type Err = AirQualityError;

    /// Accepts column names (`pm25`), report fields (`avgPM25`) and display
    /// names (`PM2.5`), ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Metric::ALL
            .into_iter()
            .find(|metric| {
                [metric.column(), metric.report_field(), metric.display_name()]
                    .iter()
                    .any(|name| name.eq_ignore_ascii_case(wanted))
            })
            .ok_or_else(|| AirQualityError::UnknownMetric(s.to_string()))
    }
}

/// A measurement cell as stored: the table mixes numeric cells with text
/// cells that carry a unit suffix.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Missing,
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Numeric value of the cell, or `None` when it has to be skipped.
    pub fn coerce(&self) -> Option<f64> {
        match self {
            RawValue::Missing => None,
            RawValue::Number(value) => Some(*value).filter(|v| v.is_finite()),
            RawValue::Text(text) => parse_measurement(text),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

/// One timestamped sensor observation for a region.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub region: String,
    pub timestamp: DateTime<Utc>,
    pub values: [RawValue; 6],
}

impl Reading {
    pub fn new(region: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            region: region.into(),
            timestamp,
            values: [
                RawValue::Missing,
                RawValue::Missing,
                RawValue::Missing,
                RawValue::Missing,
                RawValue::Missing,
                RawValue::Missing,
            ],
        }
    }

    pub fn with_value(mut self, metric: Metric, value: impl Into<RawValue>) -> Self {
        self.values[metric.index()] = value.into();
        self
    }

    pub fn value(&self, metric: Metric) -> &RawValue {
        &self.values[metric.index()]
    }
}
