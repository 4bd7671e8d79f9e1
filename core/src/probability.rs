//! Event-rate to per-tick probability conversion.
//!
//! A rate of "3 per day" evaluated on an hourly tick fires with
//! p = 3 * (1h / 24h) = 0.125. A tick longer than the rate's period
//! saturates at p = 1.

use crate::{
    error::{SimError, SimResult},
    rng::RandomSource,
    time_unit::TimeUnit,
};
use serde::{Deserialize, Serialize};

/// "count occurrences per one `per` of virtual time".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRate {
    count: u32,
    per: TimeUnit,
}

impl EventRate {
    /// Build a rate from a signed count, as read from configuration.
    pub fn new(count: i64, per: TimeUnit) -> SimResult<Self> {
        let count = u32::try_from(count).map_err(|_| {
            if count < 0 {
                SimError::InvalidRate { count }
            } else {
                SimError::InvalidConfig(format!("event rate count {count} exceeds u32::MAX"))
            }
        })?;
        Ok(Self { count, per })
    }

    /// Compile-time rates used as simulator defaults.
    pub const fn per(count: u32, per: TimeUnit) -> Self {
        Self { count, per }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn unit(&self) -> TimeUnit {
        self.per
    }
}

/// Decides whether a rated event fires on a tick of `tick_unit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbabilityEngine {
    tick_unit: TimeUnit,
}

impl ProbabilityEngine {
    pub fn new(tick_unit: TimeUnit) -> Self {
        Self { tick_unit }
    }

    pub fn tick_unit(&self) -> TimeUnit {
        self.tick_unit
    }

    /// Per-tick probability, clamped to [0, 1].
    pub fn probability(rate: EventRate, tick_unit: TimeUnit) -> f64 {
        if rate.count == 0 {
            return 0.0;
        }
        let p = f64::from(rate.count) * tick_unit.ratio_to(rate.per);
        p.clamp(0.0, 1.0)
    }

    /// Draw once from `rng` and compare against the per-tick probability.
    /// A zero-count rate never draws.
    pub fn should_fire<R>(&self, rate: EventRate, rng: &mut R) -> bool
    where
        R: RandomSource + ?Sized,
    {
        if rate.count == 0 {
            return false;
        }
        let p = Self::probability(rate, self.tick_unit);
        rng.next_f64() < p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_count_is_rejected() {
        let err = EventRate::new(-1, TimeUnit::Day).unwrap_err();
        assert!(matches!(err, SimError::InvalidRate { count: -1 }));
    }

    #[test]
    fn oversized_count_is_a_config_error() {
        let err = EventRate::new(i64::from(u32::MAX) + 1, TimeUnit::Day).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));
    }

    #[test]
    fn probability_saturates_for_long_ticks() {
        let rate = EventRate::per(3, TimeUnit::Day);
        assert_eq!(ProbabilityEngine::probability(rate, TimeUnit::Day), 1.0);
        assert_eq!(ProbabilityEngine::probability(rate, TimeUnit::Week), 1.0);
    }
}
