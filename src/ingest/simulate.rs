//! Simulated sensor data.
//!
//! There is no physical probe attached to the service; readings are drawn
//! uniformly from ranges wide enough to produce both SAFE and UNSAFE ponds,
//! rounded to two decimals the way a cheap probe reports them, and inserted
//! through the normal store path.

use std::ops::RangeInclusive;

use rand::Rng;

use crate::analysis::summary::round_to_2dp;
use crate::logging::{self, Component};
use crate::model::Reading;
use crate::store::{ReadingStore, StoreError};

/// Upper bound on readings generated per request.
pub const MAX_BATCH: u32 = 50;

// ---------------------------------------------------------------------------
// Simulation ranges
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRanges {
    pub temperature_c: RangeInclusive<f64>,
    pub ph: RangeInclusive<f64>,
    pub dissolved_oxygen_mg_l: RangeInclusive<f64>,
}

impl Default for SimulationRanges {
    fn default() -> Self {
        Self {
            temperature_c: 18.0..=35.0,
            ph: 5.5..=9.0,
            dissolved_oxygen_mg_l: 3.0..=10.0,
        }
    }
}

/// Values for one simulated sample, before the store assigns id and time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedSample {
    pub temperature: f64,
    pub ph: f64,
    pub dissolved_oxygen: f64,
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

pub fn simulate_sample<R: Rng>(rng: &mut R, ranges: &SimulationRanges) -> SimulatedSample {
    SimulatedSample {
        temperature: round_to_2dp(rng.gen_range(ranges.temperature_c.clone())),
        ph: round_to_2dp(rng.gen_range(ranges.ph.clone())),
        dissolved_oxygen: round_to_2dp(rng.gen_range(ranges.dissolved_oxygen_mg_l.clone())),
    }
}

/// Generate `count` samples and insert each one. Returns the stored rows in
/// insertion order. Stops at the first store error.
pub fn simulate_into<R: Rng>(
    store: &dyn ReadingStore,
    count: u32,
    rng: &mut R,
    ranges: &SimulationRanges,
) -> Result<Vec<Reading>, StoreError> {
    let mut inserted = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let sample = simulate_sample(rng, ranges);
        let reading = store.insert(sample.temperature, sample.ph, sample.dissolved_oxygen)?;
        inserted.push(reading);
    }

    logging::info(Component::Simulator, &format!("{} new readings added to the database", inserted.len()));
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn has_at_most_two_decimals(value: f64) -> bool {
        ((value * 100.0).round() - value * 100.0).abs() < 1e-6
    }

    #[test]
    fn test_samples_stay_inside_ranges() {
        let mut rng = StdRng::seed_from_u64(42);
        let ranges = SimulationRanges::default();

        for _ in 0..500 {
            let sample = simulate_sample(&mut rng, &ranges);
            assert!(ranges.temperature_c.contains(&sample.temperature), "{:?}", sample);
            assert!(ranges.ph.contains(&sample.ph), "{:?}", sample);
            assert!(ranges.dissolved_oxygen_mg_l.contains(&sample.dissolved_oxygen), "{:?}", sample);
        }
    }

    #[test]
    fn test_samples_are_rounded_to_two_decimals() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let sample = simulate_sample(&mut rng, &SimulationRanges::default());
            assert!(has_at_most_two_decimals(sample.temperature), "{}", sample.temperature);
            assert!(has_at_most_two_decimals(sample.ph), "{}", sample.ph);
            assert!(has_at_most_two_decimals(sample.dissolved_oxygen), "{}", sample.dissolved_oxygen);
        }
    }

    #[test]
    fn test_same_seed_gives_same_samples() {
        let ranges = SimulationRanges::default();
        let a = simulate_sample(&mut StdRng::seed_from_u64(99), &ranges);
        let b = simulate_sample(&mut StdRng::seed_from_u64(99), &ranges);
        assert_eq!(a, b);
    }

    #[test]
    fn test_degenerate_range_pins_the_value() {
        let ranges = SimulationRanges {
            temperature_c: 25.0..=25.0,
            ph: 7.0..=7.0,
            dissolved_oxygen_mg_l: 6.0..=6.0,
        };
        let sample = simulate_sample(&mut StdRng::seed_from_u64(1), &ranges);
        assert_eq!(sample, SimulatedSample { temperature: 25.0, ph: 7.0, dissolved_oxygen: 6.0 });
    }
}
