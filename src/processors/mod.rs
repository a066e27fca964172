pub mod aggregation_query;
pub mod trend_query;

pub use aggregation_query::{aggregate_readings, AggregationQuery};
pub use trend_query::{daily_averages, TrendQuery};
