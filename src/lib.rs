pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod processors;
pub mod report;
pub mod service;
pub mod store;
pub mod utils;
pub mod writers;

pub use error::{AirQualityError, Result};
pub use service::AirQualityService;
