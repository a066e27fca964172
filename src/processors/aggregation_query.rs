use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use validator::Validate;

use crate::error::Result;
use crate::models::{Metric, Reading, RegionFilter, RegionSummary, TimeWindow};
use crate::store::ReadingStore;

/// Per-region averages over a trailing window of whole days.
#[derive(Debug, Clone, Validate)]
pub struct AggregationQuery {
    region_filter: RegionFilter,

    #[validate(range(min = 1))]
    window_days: u32,

    now: Option<DateTime<Utc>>,
}

impl AggregationQuery {
    pub fn new(region_filter: RegionFilter, window_days: u32) -> Self {
        Self {
            region_filter,
            window_days,
            now: None,
        }
    }

    /// Pin "now" instead of reading the clock at execution time.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn region_filter(&self) -> &RegionFilter {
        &self.region_filter
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow::trailing(self.window_days, self.now.unwrap_or_else(Utc::now))
    }

    /// Run the query against `store`, holding one connection for the call.
    ///
    /// Regions without readings in the window are omitted; an empty result is
    /// not an error.
    pub fn execute(&self, store: &dyn ReadingStore) -> Result<Vec<RegionSummary>> {
        self.validate()?;
        let window = self.window();

        let readings = {
            let conn = store.connect().inspect_err(|e| {
                warn!("Could not reach {}: {}", store.describe(), e);
            })?;
            conn.check_schema()?;
            conn.fetch_readings(&self.region_filter, &window)?
        };

        let summaries = aggregate_readings(&readings, &self.region_filter, &window);
        info!(
            "Aggregated {} readings into {} regions ({}, last {} days)",
            readings.len(),
            summaries.len(),
            self.region_filter,
            self.window_days
        );

        Ok(summaries)
    }
}

#[derive(Debug, Default)]
struct RegionAccumulator {
    sums: [f64; 6],
    counts: [usize; 6],
    readings: usize,
    skipped: usize,
    first: Option<DateTime<Utc>>,
    last: Option<DateTime<Utc>>,
}

impl RegionAccumulator {
    fn add(&mut self, reading: &Reading) {
        self.readings += 1;
        self.first = Some(self.first.map_or(reading.timestamp, |t| t.min(reading.timestamp)));
        self.last = Some(self.last.map_or(reading.timestamp, |t| t.max(reading.timestamp)));

        for metric in Metric::ALL {
            match reading.value(metric).coerce() {
                Some(value) => {
                    self.sums[metric.index()] += value;
                    self.counts[metric.index()] += 1;
                }
                None => self.skipped += 1,
            }
        }
    }

    fn average(&self, metric: Metric) -> Option<f64> {
        let count = self.counts[metric.index()];
        (count > 0).then(|| self.sums[metric.index()] / count as f64)
    }

    fn into_summary(self, region: String) -> Option<RegionSummary> {
        Some(RegionSummary {
            avg_pm25: self.average(Metric::Pm25),
            avg_pm10: self.average(Metric::Pm10),
            avg_no2: self.average(Metric::No2),
            avg_co2: self.average(Metric::Co2),
            avg_temperature: self.average(Metric::Temperature),
            avg_humidity: self.average(Metric::Humidity),
            reading_count: self.readings,
            period_start: self.first?,
            period_end: self.last?,
            region,
        })
    }
}

/// Group readings by region and average each metric over the values that
/// coerce. A reading counts towards `reading_count` whatever its values.
///
/// Output is ordered by region name. Readings outside `filter` or `window`
/// are ignored, so a store that over-fetches cannot widen the result.
pub fn aggregate_readings(
    readings: &[Reading],
    filter: &RegionFilter,
    window: &TimeWindow,
) -> Vec<RegionSummary> {
    let mut groups: BTreeMap<&str, RegionAccumulator> = BTreeMap::new();

    for reading in readings
        .iter()
        .filter(|r| filter.matches(&r.region) && window.contains(&r.timestamp))
    {
        groups.entry(reading.region.as_str()).or_default().add(reading);
    }

    groups
        .into_iter()
        .filter_map(|(region, acc)| {
            if acc.skipped > 0 {
                debug!("{}: {} measurement values skipped", region, acc.skipped);
            }
            acc.into_summary(region.to_string())
        })
        .collect()
}
