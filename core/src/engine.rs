//! The session engine: wires the standard runner graph over one world.
//!
//! RUNNERS (registration order, fixed):
//!   1. economy   DAY   EconomySimulator
//!   2. company   HOUR  Customer → Order → Delivery
//!   3. movement  HOUR  DeliveryMovementSimulator
//!
//! Within "company", deliveries see orders placed earlier in the same
//! tick because the order simulator is registered first.
//!
//! RULES:
//!   - All randomness flows through the RngBank.
//!   - The engine owns the scheduler; nothing else starts lanes.
//!   - fast_forward() and the real-time scheduler never run together.

use crate::{
    config::{SchedulerConfig, SimConfig},
    customer_simulator::CustomerSimulator,
    delivery_simulator::DeliverySimulator,
    economy_simulator::EconomySimulator,
    error::{SimError, SimResult},
    metrics::{MetricsReporter, MetricsSink, MetricsSnapshot},
    movement_simulator::DeliveryMovementSimulator,
    order_simulator::OrderSimulator,
    rng::{RngBank, SimulatorSlot},
    runner::{CompositeRunner, TickReport},
    scenario,
    scheduler::{RunnerHandle, Shutdown, TimeScaleScheduler},
    time_unit::TimeUnit,
    types::VirtualSeconds,
    world::SharedState,
};
use std::sync::Arc;

pub struct SimEngine {
    pub state:  SharedState,
    rng_bank:   RngBank,
    scheduler:  TimeScaleScheduler,
    reporter:   MetricsReporter,
    /// Runner handles in registration order, for fast-forward.
    runners:    Vec<RunnerHandle>,
}

impl SimEngine {
    /// Bootstrap a scenario from `config.seed` and wire all runners.
    pub fn build(config: &SimConfig) -> SimResult<Self> {
        let rng_bank = RngBank::new(config.seed);
        let state = SharedState::new(scenario::generate(&config.scenario, &rng_bank));
        Self::with_state(config, state)
    }

    /// Wire all runners over an existing world.
    pub fn with_state(config: &SimConfig, state: SharedState) -> SimResult<Self> {
        Self::with_state_and_sink(config, state, Arc::new(crate::metrics::LogSink))
    }

    pub fn with_state_and_sink(
        config: &SimConfig,
        state: SharedState,
        sink: Arc<dyn MetricsSink>,
    ) -> SimResult<Self> {
        let rates = config.rates.validate()?;
        let rng_bank = RngBank::new(config.seed);

        let economy = CompositeRunner::builder("economy", TimeUnit::Day, state.clone(), rng_bank)
            .register(SimulatorSlot::Economy, Box::new(EconomySimulator::new()))
            .build()?;
        let company = CompositeRunner::builder("company", TimeUnit::Hour, state.clone(), rng_bank)
            .register(SimulatorSlot::Customer, Box::new(CustomerSimulator::new(rates.new_customer)))
            .register(SimulatorSlot::Order, Box::new(OrderSimulator::new(rates.new_order)))
            .register(SimulatorSlot::Delivery, Box::new(DeliverySimulator::new(rates.new_delivery)))
            .build()?;
        let movement = CompositeRunner::builder("movement", TimeUnit::Hour, state.clone(), rng_bank)
            .register(SimulatorSlot::Movement, Box::new(DeliveryMovementSimulator::new()))
            .build()?;

        let reporter = MetricsReporter::new(state.clone(), sink);
        let mut scheduler = TimeScaleScheduler::with_config(config.scheduler.clone())?;
        let runners = vec![
            scheduler.add_runner(economy),
            scheduler.add_runner(company),
            scheduler.add_runner(movement),
        ];
        scheduler.set_metrics(reporter.clone());

        Ok(Self {
            state,
            rng_bank,
            scheduler,
            reporter,
            runners,
        })
    }

    pub fn seed(&self) -> u64 {
        self.rng_bank.master_seed()
    }

    // ── Real-time lifecycle ────────────────────────────────────

    pub fn start(&mut self) -> SimResult<()> {
        self.scheduler.start()
    }

    pub fn stop(&mut self) -> Shutdown {
        self.scheduler.stop()
    }

    pub fn restart(&mut self) -> SimResult<Shutdown> {
        self.scheduler.restart()
    }

    pub fn reconfigure(&mut self, config: SchedulerConfig) -> SimResult<()> {
        self.scheduler.reconfigure(config)
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn scheduler(&self) -> &TimeScaleScheduler {
        &self.scheduler
    }

    // ── Headless ───────────────────────────────────────────────

    /// Advance `span` units of virtual time with no real delays.
    ///
    /// Every runner fires at virtual time 0 and then once per its unit.
    /// Runners due at the same virtual instant run in registration order.
    /// Returns the reports of every tick, in execution order.
    pub fn fast_forward(&mut self, span: u64, unit: TimeUnit) -> SimResult<Vec<TickReport>> {
        if self.scheduler.is_running() {
            return Err(SimError::AlreadyRunning);
        }
        let horizon: VirtualSeconds = span.saturating_mul(unit.seconds());

        let mut lanes: Vec<(RunnerHandle, VirtualSeconds, VirtualSeconds)> = self
            .runners
            .iter()
            .map(|r| {
                let runner = r.lock();
                // Resume where a previous session left off.
                let next_due = runner.current_tick() * runner.unit().seconds();
                (r.clone(), runner.unit().seconds(), next_due)
            })
            .collect();
        let start = lanes.iter().map(|(_, _, due)| *due).min().unwrap_or(0);
        let end = start.saturating_add(horizon);

        let mut reports = Vec::new();
        loop {
            let Some(now) = lanes.iter().map(|(_, _, due)| *due).min() else { break };
            if now >= end {
                break;
            }
            for (runner, step, due) in &mut lanes {
                if *due == now {
                    reports.push(runner.lock().run());
                    *due += *step;
                }
            }
        }

        log::info!(
            "Fast-forwarded {span} {unit}(s): {} runner ticks, {} faults",
            reports.len(),
            reports.iter().map(|r| r.faults().count()).sum::<usize>()
        );
        Ok(reports)
    }

    /// One metrics snapshot, emitted to the sink.
    pub fn report_metrics(&self) -> MetricsSnapshot {
        self.reporter.report()
    }

    pub fn sample_metrics(&self) -> MetricsSnapshot {
        self.reporter.sample()
    }
}
