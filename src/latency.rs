use crate::error::{Error, Result};
use rand::Rng;
use std::time::Duration;

/// Where a simulated retrieval was served from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    CacheHit,
    ColdRead,
}

/// Result of one latency draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    pub outcome: Outcome,
    pub units: u32,
}

/// Cache-hit vs. cold-read latency model.
///
/// A request is a cache hit with probability `hit_probability` and takes
/// `hit_units`; otherwise it takes a uniform draw from `cold_min..=cold_max`.
/// One unit lasts `unit` of wall-clock time.
#[derive(Debug, Clone, PartialEq)]
pub struct LatencyModel {
    pub hit_probability: f64,
    pub hit_units: u32,
    pub cold_min: u32,
    pub cold_max: u32,
    pub unit: Duration,
}

impl Default for LatencyModel {
    fn default() -> Self {
        LatencyModel {
            hit_probability: 0.8,
            hit_units: 1,
            cold_min: 7,
            cold_max: 10,
            unit: Duration::from_secs(1),
        }
    }
}

impl LatencyModel {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.hit_probability) {
            return Err(Error::InvalidArgument(format!(
                "hit probability must be between 0 and 1, got {}",
                self.hit_probability
            )));
        }
        if self.cold_min > self.cold_max {
            return Err(Error::InvalidArgument(format!(
                "cold read range is empty: {}..={}",
                self.cold_min, self.cold_max
            )));
        }
        Ok(())
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Latency {
        if rng.gen_bool(self.hit_probability) {
            Latency {
                outcome: Outcome::CacheHit,
                units: self.hit_units,
            }
        } else {
            Latency {
                outcome: Outcome::ColdRead,
                units: rng.gen_range(self.cold_min..=self.cold_max),
            }
        }
    }

    /// Wall-clock time to block for `latency`
    pub fn duration(&self, latency: Latency) -> Duration {
        self.unit.saturating_mul(latency.units)
    }
}
