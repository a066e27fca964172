use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;
use validator::Validate;

use crate::error::Result;
use crate::models::{DailyAverage, Metric, Reading, RegionFilter, TimeWindow};
use crate::store::ReadingStore;

/// Day-by-day average of one metric for one region, for trend charts.
#[derive(Debug, Clone, Validate)]
pub struct TrendQuery {
    #[validate(length(min = 1))]
    region: String,

    metric: Metric,

    #[validate(range(min = 1))]
    window_days: u32,

    now: Option<DateTime<Utc>>,
}

impl TrendQuery {
    pub fn new(region: impl Into<String>, metric: Metric, window_days: u32) -> Self {
        Self {
            region: region.into(),
            metric,
            window_days,
            now: None,
        }
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn execute(&self, store: &dyn ReadingStore) -> Result<Vec<DailyAverage>> {
        self.validate()?;
        let window = TimeWindow::trailing(self.window_days, self.now.unwrap_or_else(Utc::now));
        let filter = RegionFilter::SpecificRegion(self.region.clone());

        let readings = {
            let conn = store.connect()?;
            conn.check_schema()?;
            conn.fetch_readings(&filter, &window)?
        };

        let trend = daily_averages(&readings, &filter, &window, self.metric);
        info!(
            "{} trend for {}: {} days with readings",
            self.metric.display_name(),
            self.region,
            trend.len()
        );
        Ok(trend)
    }
}

/// Group readings by UTC calendar day. Days without readings are absent;
/// days whose values all fail to coerce keep their count with no average.
pub fn daily_averages(
    readings: &[Reading],
    filter: &RegionFilter,
    window: &TimeWindow,
    metric: Metric,
) -> Vec<DailyAverage> {
    let mut days: BTreeMap<NaiveDate, (f64, usize, usize)> = BTreeMap::new();

    for reading in readings
        .iter()
        .filter(|r| filter.matches(&r.region) && window.contains(&r.timestamp))
    {
        let entry = days.entry(reading.timestamp.date_naive()).or_default();
        entry.2 += 1;
        if let Some(value) = reading.value(metric).coerce() {
            entry.0 += value;
            entry.1 += 1;
        }
    }

    days.into_iter()
        .map(|(date, (sum, count, readings))| DailyAverage {
            date,
            average: (count > 0).then(|| sum / count as f64),
            readings,
        })
        .collect()
}
