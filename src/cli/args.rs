use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::utils::constants::{COMPRESSION_SNAPPY, DEFAULT_WINDOW_DAYS};

#[derive(Parser)]
#[command(name = "airquality-report")]
#[command(about = "Regional air quality averages and reports from a sensor reading store")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        help = "Settings file [default: airquality.toml if present]"
    )]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Hide progress spinners")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Fixed-width table
    Text,
    /// Markdown report (default)
    #[default]
    Markdown,
    /// JSON document
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Per-region averages over the last N days
    Report {
        #[arg(short, long, help = "Region name or \"All Regions\" [default: all]")]
        region: Option<String>,

        #[arg(short, long, default_value_t = DEFAULT_WINDOW_DAYS)]
        days: u32,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,

        #[arg(short, long, help = "Question to answer alongside the report")]
        prompt: Option<String>,

        #[arg(long, help = "Show the plain data summary instead of an analysis")]
        no_ai: bool,
    },

    /// Daily averages of one metric for one region
    Trend {
        #[arg(short, long)]
        region: String,

        #[arg(short, long, default_value = "pm25", help = "pm25, pm10, no2, co2, temperature or humidity")]
        metric: String,

        #[arg(short, long, default_value_t = DEFAULT_WINDOW_DAYS)]
        days: u32,

        #[arg(short, long, help = "Write the series to a CSV file")]
        output: Option<PathBuf>,
    },

    /// Write report rows as a chart table (.parquet or .csv)
    Export {
        #[arg(short, long)]
        region: Option<String>,

        #[arg(short, long, default_value_t = DEFAULT_WINDOW_DAYS)]
        days: u32,

        #[arg(
            short,
            long,
            help = "Output file path [default: output/airquality-report-{YYMMDD}.parquet]"
        )]
        output: Option<PathBuf>,

        #[arg(long, default_value = COMPRESSION_SNAPPY)]
        compression: String,
    },

    /// List regions present in the store
    Regions,

    /// Test the store connection
    Check,

    /// Fill a SQLite store with synthetic readings
    Seed {
        #[arg(long, help = "SQLite file to write [default: from settings]")]
        database: Option<PathBuf>,

        #[arg(short, long, default_value_t = DEFAULT_WINDOW_DAYS)]
        days: u32,

        #[arg(long, default_value = "4")]
        per_day: u32,

        #[arg(long, default_value = "42")]
        seed: u64,

        #[arg(short, long, help = "Limit to these regions [default: all known]")]
        region: Vec<String>,
    },
}
