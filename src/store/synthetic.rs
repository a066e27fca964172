use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::{Metric, Reading};

/// Typical conditions for a region, used as the centre of synthetic readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionProfile {
    pub region: &'static str,
    pub pm25: f64,
    pub pm10: f64,
    pub no2: f64,
    pub co2: f64,
    pub temperature: f64,
    pub humidity: f64,
}

pub const REGION_PROFILES: [RegionProfile; 8] = [
    RegionProfile { region: "Red Sea", pm25: 9.0, pm10: 20.0, no2: 7.0, co2: 300.0, temperature: 28.0, humidity: 37.0 },
    RegionProfile { region: "Delta", pm25: 27.0, pm10: 60.0, no2: 22.0, co2: 340.0, temperature: 25.5, humidity: 60.0 },
    RegionProfile { region: "Greater Cairo", pm25: 56.0, pm10: 110.0, no2: 63.0, co2: 510.0, temperature: 25.0, humidity: 40.0 },
    RegionProfile { region: "Sinai", pm25: 11.0, pm10: 24.0, no2: 5.0, co2: 280.0, temperature: 30.0, humidity: 31.0 },
    RegionProfile { region: "New Valley", pm25: 24.0, pm10: 52.0, no2: 9.0, co2: 340.0, temperature: 33.0, humidity: 21.0 },
    RegionProfile { region: "Upper Egypt", pm25: 23.0, pm10: 49.0, no2: 13.0, co2: 315.0, temperature: 31.0, humidity: 25.0 },
    RegionProfile { region: "North Coast", pm25: 8.0, pm10: 19.0, no2: 5.0, co2: 300.0, temperature: 25.0, humidity: 69.0 },
    RegionProfile { region: "Canal Cities", pm25: 17.0, pm10: 40.0, no2: 21.0, co2: 355.0, temperature: 27.0, humidity: 51.0 },
];

impl RegionProfile {
    pub fn find(region: &str) -> Option<&'static RegionProfile> {
        REGION_PROFILES.iter().find(|p| p.region == region)
    }

    fn baseline(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Pm25 => self.pm25,
            Metric::Pm10 => self.pm10,
            Metric::No2 => self.no2,
            Metric::Co2 => self.co2,
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
        }
    }
}

/// Upper bound on the up-front allocation; larger runs grow as they go.
const MAX_PREALLOCATED_READINGS: usize = 1 << 20;

/// Deterministic generator of unit-suffixed readings around region profiles.
pub struct SyntheticGenerator {
    rng: StdRng,
    readings_per_day: u32,
    variation: f64,
}

impl SyntheticGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            readings_per_day: 4,
            variation: 0.15,
        }
    }

    pub fn with_readings_per_day(mut self, readings_per_day: u32) -> Self {
        self.readings_per_day = readings_per_day.max(1);
        self
    }

    /// Readings for `days` days ending strictly before `end`, one block per
    /// profile, each stored as text with the metric's unit.
    pub fn generate(
        &mut self,
        profiles: &[RegionProfile],
        days: u32,
        end: DateTime<Utc>,
    ) -> Vec<Reading> {
        let per_day = i64::from(self.readings_per_day);
        let spacing = 1440 / per_day;
        let capacity = profiles
            .len()
            .saturating_mul(days as usize)
            .saturating_mul(self.readings_per_day as usize)
            .min(MAX_PREALLOCATED_READINGS);
        let mut readings = Vec::with_capacity(capacity);

        for profile in profiles {
            for day in 0..i64::from(days) {
                for slot in 0..per_day {
                    let minutes_back = day * 1440 + slot * spacing + self.rng.gen_range(1..=spacing.max(1));
                    let Some(timestamp) = end.checked_sub_signed(Duration::minutes(minutes_back)) else {
                        break;
                    };

                    let mut reading = Reading::new(profile.region, timestamp);
                    for metric in Metric::ALL {
                        let value = self.sample(profile, metric);
                        reading = reading.with_value(metric, format!("{:.1} {}", value, metric.units()));
                    }
                    readings.push(reading);
                }
            }
        }

        readings
    }

    fn sample(&mut self, profile: &RegionProfile, metric: Metric) -> f64 {
        let base = profile.baseline(metric);
        let spread = match metric {
            Metric::Co2 => self.variation / 3.0,
            Metric::Temperature => self.variation / 2.0,
            _ => self.variation,
        };
        let value = base * (1.0 + self.rng.gen_range(-spread..=spread));

        match metric {
            Metric::Co2 => value.max(250.0),
            Metric::Humidity => value.clamp(10.0, 95.0),
            Metric::Temperature => value,
            _ => value.max(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeWindow;
    use chrono::TimeZone;

    #[test]
    fn test_generation_is_deterministic() {
        let end = Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap();
        let a = SyntheticGenerator::new(7).generate(&REGION_PROFILES[..2], 3, end);
        let b = SyntheticGenerator::new(7).generate(&REGION_PROFILES[..2], 3, end);

        assert_eq!(a, b);
        assert_eq!(a.len(), 2 * 3 * 4);
    }

    #[test]
    fn test_large_day_and_rate_counts_do_not_overflow() {
        let end = Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap();
        let readings = SyntheticGenerator::new(1)
            .with_readings_per_day(u32::MAX)
            .generate(&[], u32::MAX, end);

        assert!(readings.is_empty());
    }

    #[test]
    fn test_readings_fall_inside_window() {
        let end = Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap();
        let window = TimeWindow::trailing(5, end);
        let readings = SyntheticGenerator::new(1)
            .with_readings_per_day(6)
            .generate(&REGION_PROFILES, 5, end);

        assert!(readings.iter().all(|r| window.contains(&r.timestamp)));
    }

    #[test]
    fn test_values_carry_units_and_parse() {
        let end = Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap();
        let profile = RegionProfile::find("Greater Cairo").unwrap();
        let readings = SyntheticGenerator::new(3).generate(std::slice::from_ref(profile), 1, end);

        for reading in &readings {
            for metric in Metric::ALL {
                let value = reading.value(metric).coerce().unwrap();
                assert!(value > 0.0, "{} should be positive", metric);
            }
            let humidity = reading.value(Metric::Humidity).coerce().unwrap();
            assert!((10.0..=95.0).contains(&humidity));
        }
    }
}
