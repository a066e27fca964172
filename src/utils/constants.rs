/// Default reading table name
pub const DEFAULT_TABLE: &str = "IoT_AirQuality";

/// SQLite file extension appended to the configured store name
pub const STORE_FILE_EXTENSION: &str = "db";

/// Default configuration file looked up when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "airquality.toml";

/// Environment variable prefix for store settings (SYNAPSE_SERVER, ...)
pub const ENV_PREFIX: &str = "SYNAPSE";

/// Columns every reading table must carry
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "region",
    "pm25",
    "pm10",
    "no2",
    "co2",
    "temperature",
    "humidity",
    "timestamp",
];

/// Unit suffixes stripped before numeric coercion
pub const UNIT_SUFFIXES: [&str; 8] = ["µg/m³", "μg/m³", "ug/m³", "ug/m3", "ppm", "°C", "%", "℃"];

/// WHO-style breakpoints (upper bound of Good, upper bound of Moderate)
pub const PM25_GOOD_MAX: f64 = 12.0;
pub const PM25_MODERATE_MAX: f64 = 35.0;
pub const PM10_GOOD_MAX: f64 = 50.0;
pub const PM10_MODERATE_MAX: f64 = 100.0;

/// Query defaults
pub const DEFAULT_WINDOW_DAYS: u32 = 30;
pub const ALL_REGIONS_LABEL: &str = "All Regions";

/// Regions monitored by the sensor network
pub const KNOWN_REGIONS: [&str; 8] = [
    "Red Sea",
    "Delta",
    "Greater Cairo",
    "Sinai",
    "New Valley",
    "Upper Egypt",
    "North Coast",
    "Canal Cities",
];

/// Timestamp format used when writing and comparing stored timestamps
pub const STORE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";

/// Parquet row group size for exported chart tables
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;

/// Directory and stem for default export file names
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const EXPORT_FILE_STEM: &str = "airquality-report";
