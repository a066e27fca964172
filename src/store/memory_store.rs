use std::collections::BTreeSet;

use crate::error::Result;
use crate::models::{Reading, RegionFilter, TimeWindow};
use crate::store::{ReadingStore, StoreConnection};

/// Readings held in process, with the same filtering rules as the SQL store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    readings: Vec<Reading>,
}

impl MemoryStore {
    pub fn new(readings: Vec<Reading>) -> Self {
        Self { readings }
    }
}

impl ReadingStore for MemoryStore {
    fn describe(&self) -> String {
        format!("memory:{} readings", self.readings.len())
    }

    fn connect(&self) -> Result<Box<dyn StoreConnection + '_>> {
        Ok(Box::new(MemoryConnection {
            readings: &self.readings,
        }))
    }
}

struct MemoryConnection<'a> {
    readings: &'a [Reading],
}

impl StoreConnection for MemoryConnection<'_> {
    fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn check_schema(&self) -> Result<()> {
        Ok(())
    }

    fn fetch_readings(&self, filter: &RegionFilter, window: &TimeWindow) -> Result<Vec<Reading>> {
        let mut matching: Vec<Reading> = self
            .readings
            .iter()
            .filter(|r| filter.matches(&r.region) && window.contains(&r.timestamp))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            a.region
                .cmp(&b.region)
                .then_with(|| a.timestamp.cmp(&b.timestamp))
        });

        Ok(matching)
    }

    fn distinct_regions(&self) -> Result<Vec<String>> {
        let regions: BTreeSet<&str> = self.readings.iter().map(|r| r.region.as_str()).collect();
        Ok(regions.into_iter().map(str::to_string).collect())
    }
}
