//! Access to the reading store.
//!
//! A [`ReadingStore`] hands out one [`StoreConnection`] per query. The
//! connection is released when it is dropped, so every exit path of a query
//! (including `?` on a failed fetch) gives it back.

pub mod memory_store;
pub mod sqlite_store;
pub mod synthetic;

pub use memory_store::MemoryStore;
pub use sqlite_store::SqliteStore;
pub use synthetic::{RegionProfile, SyntheticGenerator, REGION_PROFILES};

use crate::error::Result;
use crate::models::{Reading, RegionFilter, TimeWindow};

pub trait ReadingStore: Send + Sync {
    /// Short human-readable location of the store, for logs
    fn describe(&self) -> String;

    fn connect(&self) -> Result<Box<dyn StoreConnection + '_>>;
}

pub trait StoreConnection {
    /// Round-trip a trivial statement.
    fn ping(&self) -> Result<()>;

    /// Fail with `MalformedSchema` when the reading table or one of its
    /// expected columns is missing.
    fn check_schema(&self) -> Result<()>;

    /// Readings matching `filter` whose timestamp falls inside `window`.
    fn fetch_readings(&self, filter: &RegionFilter, window: &TimeWindow) -> Result<Vec<Reading>>;

    /// Every region present in the store, ascending.
    fn distinct_regions(&self) -> Result<Vec<String>>;
}
