//! Component simulator trait and the per-tick context handed to it.
//!
//! RULE: Every simulator implements ComponentSimulator.
//! A runner calls tick() on each registered simulator
//! in registration order, once per runner tick.
//! Simulators own no domain state; they go through SharedState.

use crate::{
    error::SimResult,
    probability::{EventRate, ProbabilityEngine},
    rng::SimRng,
    time_unit::TimeUnit,
    types::{Tick, VirtualSeconds},
    world::SharedState,
};

/// Ephemeral per-invocation context. Built fresh for each simulator call.
pub struct TickContext<'a> {
    pub tick:         Tick,
    /// Virtual time at which this tick begins.
    pub virtual_time: VirtualSeconds,
    engine:           ProbabilityEngine,
    rng:              &'a mut SimRng,
}

impl<'a> TickContext<'a> {
    pub fn new(tick: Tick, unit: TimeUnit, virtual_time: VirtualSeconds, rng: &'a mut SimRng) -> Self {
        Self {
            tick,
            virtual_time,
            engine: ProbabilityEngine::new(unit),
            rng,
        }
    }

    /// Virtual time this tick represents.
    pub fn unit(&self) -> TimeUnit {
        self.engine.tick_unit()
    }

    /// One probability draw for `rate` at this tick's granularity.
    pub fn fires(&mut self, rate: EventRate) -> bool {
        self.engine.should_fire(rate, &mut *self.rng)
    }

    pub fn rng(&mut self) -> &mut SimRng {
        &mut *self.rng
    }
}

/// What one simulator invocation did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Entities created or changed.
    pub mutations: usize,
}

impl TickOutcome {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn mutated(mutations: usize) -> Self {
        Self { mutations }
    }
}

/// The contract every simulator must fulfill.
pub trait ComponentSimulator: Send {
    /// Unique stable name for this simulator.
    fn name(&self) -> &'static str;

    /// Called once per runner tick. Must not block or do I/O.
    ///
    /// - `ctx`:   tick number, tick unit and this simulator's RNG stream
    /// - `state`: the shared world; lock it only inside this call
    fn tick(&mut self, ctx: &mut TickContext<'_>, state: &SharedState) -> SimResult<TickOutcome>;
}
