pub mod constants;
pub mod filename;
pub mod measurement;
pub mod progress;
pub mod timestamp;

pub use constants::*;
pub use filename::{export_filename_for, generate_default_export_filename};
pub use measurement::parse_measurement;
pub use progress::ProgressReporter;
pub use timestamp::{format_store_timestamp, parse_timestamp};
