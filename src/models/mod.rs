pub mod query;
pub mod reading;
pub mod report;
pub mod summary;

pub use query::{RegionFilter, TimeWindow};
pub use reading::{Metric, RawValue, Reading};
pub use report::{Report, ReportRow, SeriesPoint, ThresholdBand};
pub use summary::{DailyAverage, RegionSummary};
