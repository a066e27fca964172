use chrono::{DateTime, Utc};

use crate::models::{RegionFilter, RegionSummary, Report, ReportRow, ThresholdBand};

/// Turns query results into a [`Report`]. Pure: no I/O, never fails.
pub struct ReportFormatter;

impl ReportFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format(
        &self,
        summaries: &[RegionSummary],
        region_filter: &RegionFilter,
        window_days: u32,
        generated_at: DateTime<Utc>,
    ) -> Report {
        let rows: Vec<ReportRow> = summaries.iter().map(|s| self.format_row(s)).collect();

        Report {
            period_days: window_days,
            generated_at,
            region_filter: region_filter.clone(),
            is_empty: rows.is_empty(),
            rows,
        }
    }

    fn format_row(&self, summary: &RegionSummary) -> ReportRow {
        ReportRow {
            region: summary.region.clone(),
            avg_pm25: summary.avg_pm25,
            avg_pm10: summary.avg_pm10,
            avg_no2: summary.avg_no2,
            avg_co2: summary.avg_co2,
            avg_temperature: summary.avg_temperature,
            avg_humidity: summary.avg_humidity,
            reading_count: summary.reading_count,
            period_start: summary.period_start,
            period_end: summary.period_end,
            pm25_band: summary.avg_pm25.map(ThresholdBand::for_pm25),
            pm10_band: summary.avg_pm10.map(ThresholdBand::for_pm10),
        }
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Metric;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn summary(region: &str, pm25: Option<f64>, pm10: Option<f64>) -> RegionSummary {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        RegionSummary {
            region: region.to_string(),
            avg_pm25: pm25,
            avg_pm10: pm10,
            avg_no2: Some(22.0),
            avg_co2: Some(340.0),
            avg_temperature: Some(25.5),
            avg_humidity: Some(60.0),
            reading_count: 10,
            period_start: ts,
            period_end: ts,
        }
    }

    #[test]
    fn test_bands_follow_averages() {
        let generated = Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap();
        let report = ReportFormatter::new().format(
            &[
                summary("Delta", Some(27.0), Some(60.0)),
                summary("Greater Cairo", Some(56.0), Some(110.0)),
                summary("Sinai", None, Some(24.0)),
            ],
            &RegionFilter::AllRegions,
            30,
            generated,
        );

        assert!(!report.is_empty);
        assert_eq!(report.period_days, 30);
        assert_eq!(report.regions(), vec!["Delta", "Greater Cairo", "Sinai"]);

        let delta = report.row("Delta").unwrap();
        assert_eq!(delta.pm25_band, Some(ThresholdBand::Moderate));
        assert_eq!(delta.pm10_band, Some(ThresholdBand::Moderate));

        let cairo = report.row("Greater Cairo").unwrap();
        assert_eq!(cairo.pm25_band, Some(ThresholdBand::Poor));
        assert_eq!(cairo.pm10_band, Some(ThresholdBand::Poor));

        let sinai = report.row("Sinai").unwrap();
        assert_eq!(sinai.pm25_band, None);
        assert_eq!(sinai.pm10_band, Some(ThresholdBand::Good));
    }

    #[test]
    fn test_empty_input_marks_report_empty() {
        let generated = Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap();
        let filter = RegionFilter::SpecificRegion("Sinai".to_string());
        let report = ReportFormatter::new().format(&[], &filter, 7, generated);

        assert!(report.is_empty);
        assert!(report.rows.is_empty());
        assert_eq!(report.region_filter, filter);
        assert_eq!(report.total_readings(), 0);
    }

    #[test]
    fn test_series_per_metric() {
        let generated = Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap();
        let report = ReportFormatter::new().format(
            &[summary("Delta", Some(27.0), None), summary("Sinai", Some(11.0), None)],
            &RegionFilter::AllRegions,
            30,
            generated,
        );

        let values: Vec<Option<f64>> = report.series(Metric::Pm25).into_iter().map(|p| p.value).collect();
        assert_eq!(values, vec![Some(27.0), Some(11.0)]);

        let pm10: Vec<Option<f64>> = report.series(Metric::Pm10).into_iter().map(|p| p.value).collect();
        assert_eq!(pm10, vec![None, None]);
    }
}
