//! Query-then-format entry points shared by the CLI and library callers.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::Result;
use crate::models::{DailyAverage, Metric, RegionFilter, Report};
use crate::processors::{AggregationQuery, TrendQuery};
use crate::report::ReportFormatter;
use crate::store::{ReadingStore, SqliteStore};

pub struct AirQualityService {
    store: Box<dyn ReadingStore>,
    formatter: ReportFormatter,
}

impl AirQualityService {
    pub fn new(store: Box<dyn ReadingStore>) -> Self {
        Self {
            store,
            formatter: ReportFormatter::new(),
        }
    }

    /// Service over the SQLite store named by `config`. Fails with
    /// `DataSourceUnavailable` when credentials are incomplete.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        Ok(Self::new(Box::new(SqliteStore::new(config)?)))
    }

    pub fn store(&self) -> &dyn ReadingStore {
        self.store.as_ref()
    }

    pub fn run_report(&self, region_filter: RegionFilter, window_days: u32) -> Result<Report> {
        self.run_report_at(region_filter, window_days, Utc::now())
    }

    /// Aggregate then format, with the window ending at `now`.
    pub fn run_report_at(
        &self,
        region_filter: RegionFilter,
        window_days: u32,
        now: DateTime<Utc>,
    ) -> Result<Report> {
        let query = AggregationQuery::new(region_filter, window_days).at(now);
        let summaries = query.execute(self.store.as_ref())?;

        let report = self
            .formatter
            .format(&summaries, query.region_filter(), window_days, now);
        debug!("Report for {} has {} rows", report.region_filter, report.rows.len());
        Ok(report)
    }

    pub fn trend(&self, region: &str, metric: Metric, window_days: u32) -> Result<Vec<DailyAverage>> {
        self.trend_at(region, metric, window_days, Utc::now())
    }

    pub fn trend_at(
        &self,
        region: &str,
        metric: Metric,
        window_days: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<DailyAverage>> {
        TrendQuery::new(region, metric, window_days)
            .at(now)
            .execute(self.store.as_ref())
    }

    /// Distinct regions present in the store, ascending.
    pub fn regions(&self) -> Result<Vec<String>> {
        let conn = self.store.connect()?;
        conn.check_schema()?;
        conn.distinct_regions()
    }

    pub fn check_connection(&self) -> Result<()> {
        let conn = self.store.connect()?;
        conn.ping()?;
        info!("Connected to {}", self.store.describe());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AirQualityError;
    use crate::models::Reading;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    fn service() -> AirQualityService {
        AirQualityService::new(Box::new(MemoryStore::new(vec![
            Reading::new("Delta", now() - Duration::days(1))
                .with_value(Metric::Pm25, "27.0 µg/m³")
                .with_value(Metric::Temperature, "25.5 °C"),
            Reading::new("Delta", now() - Duration::days(2))
                .with_value(Metric::Pm25, "bad")
                .with_value(Metric::Temperature, "26.0 °C"),
            Reading::new("Sinai", now() - Duration::days(40)).with_value(Metric::Pm25, "9.0"),
        ])))
    }

    #[test]
    fn test_report_for_all_regions() -> Result<()> {
        let report = service().run_report_at(RegionFilter::AllRegions, 30, now())?;

        assert!(!report.is_empty);
        assert_eq!(report.regions(), vec!["Delta"]);
        assert_eq!(report.generated_at, now());
        let delta = report.row("Delta").unwrap();
        assert_eq!(delta.avg_pm25, Some(27.0));
        assert_eq!(delta.avg_temperature, Some(25.75));
        assert_eq!(delta.reading_count, 2);
        Ok(())
    }

    #[test]
    fn test_report_is_idempotent() -> Result<()> {
        let service = service();
        let first = service.run_report_at(RegionFilter::AllRegions, 30, now())?;
        let second = service.run_report_at(RegionFilter::AllRegions, 30, now())?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_region_outside_window_is_empty() -> Result<()> {
        let report =
            service().run_report_at(RegionFilter::SpecificRegion("Sinai".into()), 30, now())?;
        assert!(report.is_empty);
        Ok(())
    }

    #[test]
    fn test_regions_and_ping() -> Result<()> {
        let service = service();
        assert_eq!(service.regions()?, vec!["Delta".to_string(), "Sinai".to_string()]);
        service.check_connection()
    }

    #[test]
    fn test_missing_credentials_are_unavailable() {
        let config = StoreConfig::new("", "airquality", "reader", "");
        let result = AirQualityService::from_config(&config);
        assert!(matches!(
            result,
            Err(AirQualityError::DataSourceUnavailable { .. })
        ));
    }
}
