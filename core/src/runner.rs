//! Composite runner: a fixed, ordered group of simulators sharing one time unit.
//!
//! RULES:
//!   - Simulators execute in registration order, every tick.
//!   - Registration is closed once the runner is built.
//!   - Every simulator holds its own RNG slot.
//!   - A later simulator sees mutations made by earlier ones in the same tick.
//!   - A failing simulator (error or panic) is logged and skipped;
//!     its siblings and the next tick still run.

use crate::{
    clock::VirtualClock,
    error::{SimError, SimResult},
    rng::{RngBank, SimulatorSlot},
    simulator::{ComponentSimulator, TickContext, TickOutcome},
    time_unit::TimeUnit,
    types::Tick,
    world::SharedState,
};
use std::panic::{self, AssertUnwindSafe};

pub struct CompositeRunner {
    name:       &'static str,
    clock:      VirtualClock,
    rng_bank:   RngBank,
    state:      SharedState,
    simulators: Vec<(SimulatorSlot, Box<dyn ComponentSimulator>)>,
}

/// Collects simulators in execution order, then freezes them into a runner.
pub struct RunnerBuilder {
    name:       &'static str,
    unit:       TimeUnit,
    rng_bank:   RngBank,
    state:      SharedState,
    simulators: Vec<(SimulatorSlot, Box<dyn ComponentSimulator>)>,
}

impl RunnerBuilder {
    /// Register a simulator. Call in the intended execution order.
    pub fn register(mut self, slot: SimulatorSlot, simulator: Box<dyn ComponentSimulator>) -> Self {
        self.simulators.push((slot, simulator));
        self
    }

    /// Fails if two simulators share a slot: they would draw identical streams.
    pub fn build(self) -> SimResult<CompositeRunner> {
        for (i, (slot, simulator)) in self.simulators.iter().enumerate() {
            if let Some((_, earlier)) = self.simulators[..i].iter().find(|(s, _)| s == slot) {
                return Err(SimError::InvalidConfig(format!(
                    "runner '{}': simulators '{}' and '{}' share the {} slot",
                    self.name,
                    earlier.name(),
                    simulator.name(),
                    slot.name()
                )));
            }
        }
        Ok(CompositeRunner {
            name:       self.name,
            clock:      VirtualClock::new(self.unit),
            rng_bank:   self.rng_bank,
            state:      self.state,
            simulators: self.simulators,
        })
    }
}

impl CompositeRunner {
    pub fn builder(
        name: &'static str,
        unit: TimeUnit,
        state: SharedState,
        rng_bank: RngBank,
    ) -> RunnerBuilder {
        RunnerBuilder {
            name,
            unit,
            rng_bank,
            state,
            simulators: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn unit(&self) -> TimeUnit {
        self.clock.unit
    }

    pub fn current_tick(&self) -> Tick {
        self.clock.current_tick
    }

    pub fn simulator_names(&self) -> Vec<&'static str> {
        self.simulators.iter().map(|(_, s)| s.name()).collect()
    }

    /// Advance one tick: every simulator, in order, against the same unit.
    /// Never fails; faults are captured in the report.
    pub fn run(&mut self) -> TickReport {
        let tick = self.clock.advance();
        let unit = self.clock.unit;
        let virtual_time = self.clock.start_of(tick);
        let mut results = Vec::with_capacity(self.simulators.len());

        for (slot, simulator) in &mut self.simulators {
            let mut rng = self.rng_bank.for_simulator_at_tick(*slot, tick);
            let mut ctx = TickContext::new(tick, unit, virtual_time, &mut rng);
            let state = &self.state;

            let outcome = match panic::catch_unwind(AssertUnwindSafe(|| simulator.tick(&mut ctx, state))) {
                Ok(result) => result,
                Err(payload) => Err(SimError::SimulatorFault {
                    simulator: simulator.name(),
                    tick,
                    reason: panic_message(payload.as_ref()),
                }),
            };

            match &outcome {
                Ok(o) => log::debug!(
                    "runner={} tick={tick} simulator={} mutations={}",
                    self.name,
                    simulator.name(),
                    o.mutations
                ),
                Err(e) => log::warn!(
                    "runner={} tick={tick} simulator={} failed: {e}",
                    self.name,
                    simulator.name()
                ),
            }

            results.push(SimulatorResult {
                simulator: simulator.name(),
                outcome,
            });
        }

        TickReport {
            runner: self.name,
            tick,
            unit,
            results,
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

#[derive(Debug)]
pub struct SimulatorResult {
    pub simulator: &'static str,
    pub outcome:   SimResult<TickOutcome>,
}

/// Aggregated result of one runner tick.
#[derive(Debug)]
pub struct TickReport {
    pub runner:  &'static str,
    pub tick:    Tick,
    pub unit:    TimeUnit,
    pub results: Vec<SimulatorResult>,
}

impl TickReport {
    pub fn mutations(&self) -> usize {
        self.results
            .iter()
            .filter_map(|r| r.outcome.as_ref().ok())
            .map(|o| o.mutations)
            .sum()
    }

    pub fn faults(&self) -> impl Iterator<Item = (&'static str, &SimError)> {
        self.results
            .iter()
            .filter_map(|r| r.outcome.as_ref().err().map(|e| (r.simulator, e)))
    }

    pub fn is_clean(&self) -> bool {
        self.faults().next().is_none()
    }
}
