//! Per-runner virtual clock. Owns the tick counter for one time unit.

use crate::{
    time_unit::TimeUnit,
    types::{Tick, VirtualSeconds},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VirtualClock {
    pub unit:         TimeUnit,
    pub current_tick: Tick,
}

impl VirtualClock {
    pub fn new(unit: TimeUnit) -> Self {
        Self { unit, current_tick: 0 }
    }

    /// Advance one tick. Returns the new tick number; the first tick is 1.
    pub fn advance(&mut self) -> Tick {
        self.current_tick += 1;
        self.current_tick
    }

    /// Virtual time covered by all completed ticks.
    pub fn elapsed(&self) -> VirtualSeconds {
        self.current_tick * self.unit.seconds()
    }

    /// Virtual time at which tick `tick` begins.
    pub fn start_of(&self, tick: Tick) -> VirtualSeconds {
        tick.saturating_sub(1) * self.unit.seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hourly_clock_counts_virtual_seconds() {
        let mut clock = VirtualClock::new(TimeUnit::Hour);
        assert_eq!(clock.advance(), 1);
        assert_eq!(clock.start_of(1), 0);
        clock.advance();
        clock.advance();
        assert_eq!(clock.elapsed(), 3 * 3_600);
        assert_eq!(clock.start_of(3), 2 * 3_600);
    }
}
