use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Datelike;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OpenFlags, Row};
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::{AirQualityError, Result};
use crate::models::{Metric, RawValue, Reading, RegionFilter, TimeWindow};
use crate::store::{ReadingStore, StoreConnection};
use crate::utils::constants::{REQUIRED_COLUMNS, STORE_FILE_EXTENSION};
use crate::utils::timestamp::{format_store_timestamp, parse_timestamp};

const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Date range understood by SQLite's date functions
const SQL_MIN_YEAR: i32 = 0;
const SQL_MAX_YEAR: i32 = 9999;
const SQL_MIN_TIMESTAMP: &str = "0000-01-01 00:00:00";
const SQL_MAX_TIMESTAMP: &str = "9999-12-31 23:59:59";

/// Reading store kept in a SQLite file.
///
/// Queries open the file read-only; a missing file is reported as an
/// unavailable data source rather than silently created.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
    table: String,
}

impl SqliteStore {
    /// Build a store from configuration. The file lives at
    /// `<server>/<database>.db` (the extension is kept if already present).
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let settings = config.require_credentials()?;

        let mut path = PathBuf::from(&settings.server).join(&settings.database);
        if path.extension().is_none() {
            path.set_extension(STORE_FILE_EXTENSION);
        }

        Ok(Self {
            path,
            table: settings.table,
        })
    }

    /// Open a store at an explicit path.
    pub fn open_at(path: impl Into<PathBuf>, table: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            table: table.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the reading table (and the file) if needed.
    pub fn initialize(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&self.path)?;
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS \"{table}\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                region TEXT NOT NULL,
                pm25 TEXT,
                pm10 TEXT,
                no2 TEXT,
                co2 TEXT,
                temperature TEXT,
                humidity TEXT,
                timestamp TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS \"idx_{table}_region_ts\" ON \"{table}\" (region, timestamp);",
            table = self.table
        ))?;

        Ok(())
    }

    /// Append readings in a single transaction. Returns the number written.
    pub fn insert_readings(&self, readings: &[Reading]) -> Result<usize> {
        let mut conn = Connection::open(&self.path)?;
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO \"{}\" (region, pm25, pm10, no2, co2, temperature, humidity, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                self.table
            ))?;

            for reading in readings {
                let cells: Vec<Value> = Metric::ALL
                    .iter()
                    .map(|metric| raw_to_sql(reading.value(*metric)))
                    .collect();

                stmt.execute(params![
                    reading.region,
                    cells[0],
                    cells[1],
                    cells[2],
                    cells[3],
                    cells[4],
                    cells[5],
                    format_store_timestamp(&reading.timestamp),
                ])?;
            }
        }

        tx.commit()?;
        Ok(readings.len())
    }
}

impl ReadingStore for SqliteStore {
    fn describe(&self) -> String {
        format!("sqlite:{}#{}", self.path.display(), self.table)
    }

    fn connect(&self) -> Result<Box<dyn StoreConnection + '_>> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            AirQualityError::unavailable(format!("cannot open {}: {}", self.path.display(), e))
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        debug!("Acquired store connection to {}", self.describe());
        Ok(Box::new(SqliteConnection { conn, store: self }))
    }
}

struct SqliteConnection<'a> {
    conn: Connection,
    store: &'a SqliteStore,
}

impl SqliteConnection<'_> {
    fn table_columns(&self) -> Result<HashSet<String>> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info(\"{}\")", self.store.table))?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .map(|name| name.map(|n| n.to_lowercase()))
            .collect::<rusqlite::Result<HashSet<String>>>()?;
        Ok(columns)
    }

    fn row_to_reading(row: &Row<'_>) -> rusqlite::Result<Option<Reading>> {
        let region: Option<String> = row.get(0)?;
        let timestamp = match row.get::<_, Value>(7)? {
            Value::Text(text) => parse_timestamp(&text),
            _ => None,
        };

        let (Some(region), Some(timestamp)) = (region, timestamp) else {
            return Ok(None);
        };

        let mut reading = Reading::new(region, timestamp);
        for metric in Metric::ALL {
            reading.values[metric.index()] = sql_to_raw(row.get::<_, Value>(1 + metric.index())?);
        }

        Ok(Some(reading))
    }
}

impl StoreConnection for SqliteConnection<'_> {
    fn ping(&self) -> Result<()> {
        self.conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    fn check_schema(&self) -> Result<()> {
        let columns = self.table_columns()?;

        if columns.is_empty() {
            return Err(AirQualityError::MalformedSchema(format!(
                "table '{}' not found",
                self.store.table
            )));
        }

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| !columns.contains(*column))
            .collect();

        if !missing.is_empty() {
            return Err(AirQualityError::MalformedSchema(format!(
                "table '{}' is missing columns: {}",
                self.store.table,
                missing.join(", ")
            )));
        }

        Ok(())
    }

    fn fetch_readings(&self, filter: &RegionFilter, window: &TimeWindow) -> Result<Vec<Reading>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT region, pm25, pm10, no2, co2, temperature, humidity, timestamp
             FROM \"{}\"
             WHERE datetime(timestamp) >= datetime(?1)
               AND datetime(timestamp) < datetime(?2)
               AND (?3 IS NULL OR region = ?3)
             ORDER BY region, timestamp",
            self.store.table
        ))?;

        let (start, end) = sql_bounds(window);

        let mut readings = Vec::new();
        let mut unusable = 0usize;
        let rows = stmt.query_map(params![start, end, filter.region()], Self::row_to_reading)?;
        for row in rows {
            match row? {
                Some(reading) if window.contains(&reading.timestamp) => readings.push(reading),
                Some(_) => {}
                None => unusable += 1,
            }
        }

        if unusable > 0 {
            warn!(
                "Skipped {} rows without a usable region or timestamp in {}",
                unusable,
                self.store.describe()
            );
        }

        debug!(
            "Fetched {} readings for {} between {} and {}",
            readings.len(),
            filter,
            start,
            end
        );
        Ok(readings)
    }

    fn distinct_regions(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT DISTINCT region FROM \"{}\" WHERE region IS NOT NULL ORDER BY region",
            self.store.table
        ))?;
        let regions = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(regions)
    }
}

impl Drop for SqliteConnection<'_> {
    fn drop(&mut self) {
        debug!("Released store connection to {}", self.store.describe());
    }
}

/// Whole-second bounds for `datetime()` comparisons that cover `window`:
/// the start rounded down, the end one second past its truncation. Rows in
/// the widened margin are dropped by the exact check after the fetch.
/// Bounds outside SQLite's year range are pinned to its limits.
fn sql_bounds(window: &TimeWindow) -> (String, String) {
    let start = if window.start.year() < SQL_MIN_YEAR {
        SQL_MIN_TIMESTAMP.to_string()
    } else {
        format_store_timestamp(&window.start)
    };

    let end = window
        .end
        .checked_add_signed(chrono::Duration::seconds(1))
        .filter(|end| end.year() <= SQL_MAX_YEAR)
        .map_or_else(|| SQL_MAX_TIMESTAMP.to_string(), |end| format_store_timestamp(&end));

    (start, end)
}

fn sql_to_raw(value: Value) -> RawValue {
    match value {
        Value::Integer(i) => RawValue::Number(i as f64),
        Value::Real(f) => RawValue::Number(f),
        Value::Text(text) => RawValue::Text(text),
        Value::Null | Value::Blob(_) => RawValue::Missing,
    }
}

fn raw_to_sql(value: &RawValue) -> Value {
    match value {
        RawValue::Missing => Value::Null,
        RawValue::Number(n) => Value::Real(*n),
        RawValue::Text(text) => Value::Text(text.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone, Utc};
    use tempfile::TempDir;

    fn sample_store(dir: &TempDir) -> SqliteStore {
        let store = SqliteStore::open_at(dir.path().join("air.db"), "IoT_AirQuality");
        store.initialize().unwrap();
        store
    }

    #[test]
    fn test_new_builds_path_from_config() {
        let config = StoreConfig::new("/srv/data", "air", "reader", "pw");
        let store = SqliteStore::new(&config).unwrap();
        assert_eq!(store.path(), Path::new("/srv/data/air.db"));

        let config = StoreConfig::new("/srv/data", "air.sqlite", "reader", "pw");
        let store = SqliteStore::new(&config).unwrap();
        assert_eq!(store.path(), Path::new("/srv/data/air.sqlite"));
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open_at(dir.path().join("absent.db"), "IoT_AirQuality");

        let err = store.connect().err().unwrap();
        assert!(err.is_recoverable());
        assert!(!dir.path().join("absent.db").exists());
    }

    #[test]
    fn test_fetch_respects_window_and_region() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let store = sample_store(&dir);
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
        let window = TimeWindow::trailing(7, now);

        store.insert_readings(&[
            Reading::new("Delta", window.start).with_value(Metric::Pm25, "20 µg/m³"),
            Reading::new("Delta", now - Duration::hours(1)).with_value(Metric::Pm25, 30.0),
            Reading::new("Delta", now).with_value(Metric::Pm25, "99"),
            Reading::new("Delta", window.start - Duration::seconds(1)),
            Reading::new("Sinai", now - Duration::days(2)),
        ])?;

        let conn = store.connect()?;
        conn.check_schema()?;

        let all = conn.fetch_readings(&RegionFilter::AllRegions, &window)?;
        assert_eq!(all.len(), 3);

        let delta = conn.fetch_readings(&RegionFilter::SpecificRegion("Delta".into()), &window)?;
        assert_eq!(delta.len(), 2);
        assert_eq!(delta[0].value(Metric::Pm25), &RawValue::Text("20 µg/m³".into()));
        assert_eq!(delta[1].value(Metric::Pm25), &RawValue::Number(30.0));

        let lower = conn.fetch_readings(&RegionFilter::SpecificRegion("delta".into()), &window)?;
        assert!(lower.is_empty());

        assert_eq!(conn.distinct_regions()?, vec!["Delta", "Sinai"]);
        conn.ping()?;
        Ok(())
    }

    #[test]
    fn test_sub_second_now_matches_memory_store() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let store = sample_store(&dir);
        let second = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
        let now = second + Duration::milliseconds(500);
        let window = TimeWindow::trailing(30, now);

        let readings = vec![
            Reading::new("Delta", second).with_value(Metric::Pm25, "20 µg/m³"),
            Reading::new("Delta", second + Duration::seconds(1)).with_value(Metric::Pm25, "99"),
        ];
        store.insert_readings(&readings)?;
        {
            let writer = Connection::open(store.path())?;
            writer.execute(
                "INSERT INTO IoT_AirQuality (region, pm25, timestamp) VALUES ('Delta', '50', ?1)",
                ["2024-06-30 12:00:00.750"],
            )?;
        }

        let from_sqlite = store
            .connect()?
            .fetch_readings(&RegionFilter::AllRegions, &window)?;
        let from_memory = MemoryStore::new(readings)
            .connect()?
            .fetch_readings(&RegionFilter::AllRegions, &window)?;

        assert_eq!(from_sqlite.len(), 1);
        assert_eq!(from_sqlite[0].timestamp, second);
        assert_eq!(from_sqlite, from_memory);
        Ok(())
    }

    #[test]
    fn test_window_reaching_before_year_zero_returns_all_rows() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let store = sample_store(&dir);
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();

        store.insert_readings(&[
            Reading::new("Delta", Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap()),
            Reading::new("Sinai", now - Duration::days(1)),
        ])?;

        let window = TimeWindow::trailing(200_000_000, now);
        let all = store
            .connect()?
            .fetch_readings(&RegionFilter::AllRegions, &window)?;
        assert_eq!(all.len(), 2);
        Ok(())
    }

    #[test]
    fn test_missing_column_is_malformed_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("air.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE IoT_AirQuality (region TEXT, pm25 TEXT, timestamp TEXT);")
            .unwrap();

        let store = SqliteStore::open_at(&path, "IoT_AirQuality");
        let conn = store.connect().unwrap();
        match conn.check_schema() {
            Err(AirQualityError::MalformedSchema(message)) => {
                assert!(message.contains("pm10"));
                assert!(message.contains("humidity"));
                assert!(!message.contains("pm25"));
            }
            other => panic!("expected MalformedSchema, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_table_is_malformed_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("air.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE other (id INTEGER);")
            .unwrap();

        let store = SqliteStore::open_at(&path, "IoT_AirQuality");
        let conn = store.connect().unwrap();
        assert!(matches!(
            conn.check_schema(),
            Err(AirQualityError::MalformedSchema(_))
        ));
    }
}
