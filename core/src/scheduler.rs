//! Real-time scheduling of composite runners.
//!
//! LANES:
//!   - Simulation lane: one thread runs every runner's ticks, one at a time.
//!     Each runner repeats with a fixed delay of `config.delay_for(unit)`,
//!     measured from the end of its previous tick. The first tick of every
//!     runner is due immediately; ties go to registration order.
//!   - Metrics lane: an optional second thread that only reads the world.
//!
//! Stopping drops the shutdown sender, which wakes every lane out of its
//! timer wait. A tick in progress is never interrupted; stop() waits for it
//! up to `stop_timeout` and then abandons the lane. The lane token keeps an
//! abandoned tick from overlapping with ticks of a later start().

use crate::{
    config::SchedulerConfig,
    error::{SimError, SimResult},
    metrics::MetricsReporter,
    runner::CompositeRunner,
    time_unit::TimeUnit,
};
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub type RunnerHandle = Arc<Mutex<CompositeRunner>>;

struct RegisteredRunner {
    name:   &'static str,
    unit:   TimeUnit,
    handle: RunnerHandle,
}

/// How a stop() call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// All lanes exited within the timeout.
    Clean,
    /// At least one lane was still mid-tick at the deadline and was abandoned.
    TimedOut,
    /// Nothing was running.
    AlreadyStopped,
}

pub struct TimeScaleScheduler {
    runners:    Vec<RegisteredRunner>,
    metrics:    Option<MetricsReporter>,
    config:     Option<SchedulerConfig>,
    lane_token: Arc<Mutex<()>>,
    lanes:      Option<Lanes>,
}

struct Lanes {
    shutdown_tx:  Sender<()>,
    cancelled:    Arc<AtomicBool>,
    simulation:   Lane,
    metrics:      Option<Lane>,
    stop_timeout: Duration,
}

struct Lane {
    name:      &'static str,
    handle:    JoinHandle<()>,
    exited_rx: Receiver<()>,
}

impl Lane {
    fn spawn(name: &'static str, body: impl FnOnce() + Send + 'static) -> SimResult<Self> {
        let (exited_tx, exited_rx) = channel::bounded::<()>(0);
        let handle = thread::Builder::new().name(name.to_string()).spawn(move || {
            // Dropped on exit, including unwinds; the receiver sees Disconnected.
            let _exited = exited_tx;
            body();
        })?;
        Ok(Self { name, handle, exited_rx })
    }

    /// Wait until `deadline` for the lane to exit. False if it is abandoned.
    fn join_until(self, deadline: Instant) -> bool {
        let wait = deadline.saturating_duration_since(Instant::now());
        match self.exited_rx.recv_timeout(wait) {
            Err(RecvTimeoutError::Timeout) => {
                log::warn!(
                    "Lane '{}' still busy after stop timeout; abandoning it, teardown not clean",
                    self.name
                );
                false
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if self.handle.join().is_err() {
                    log::error!("Lane '{}' panicked", self.name);
                }
                true
            }
        }
    }
}

struct ScheduledRunner {
    name:     &'static str,
    runner:   RunnerHandle,
    period:   Duration,
    next_due: Instant,
}

impl TimeScaleScheduler {
    pub fn new() -> Self {
        Self {
            runners:    Vec::new(),
            metrics:    None,
            config:     None,
            lane_token: Arc::new(Mutex::new(())),
            lanes:      None,
        }
    }

    pub fn with_config(config: SchedulerConfig) -> SimResult<Self> {
        let mut scheduler = Self::new();
        scheduler.reconfigure(config)?;
        Ok(scheduler)
    }

    /// Add a runner. Its unit is fixed for the scheduler's lifetime.
    pub fn add_runner(&mut self, runner: CompositeRunner) -> RunnerHandle {
        let registered = RegisteredRunner {
            name:   runner.name(),
            unit:   runner.unit(),
            handle: Arc::new(Mutex::new(runner)),
        };
        let handle = registered.handle.clone();
        self.runners.push(registered);
        handle
    }

    /// Metrics sampling only happens when the config enables it.
    pub fn set_metrics(&mut self, reporter: MetricsReporter) {
        self.metrics = Some(reporter);
    }

    pub fn runner(&self, name: &str) -> Option<RunnerHandle> {
        self.runners
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.handle.clone())
    }

    pub fn config(&self) -> Option<&SchedulerConfig> {
        self.config.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.lanes.is_some()
    }

    /// Replace the configuration. A running schedule keeps its old
    /// delays until restart().
    pub fn reconfigure(&mut self, config: SchedulerConfig) -> SimResult<()> {
        config.validate()?;
        if self.is_running() {
            log::info!("Scheduler reconfigured; new delays apply after restart()");
        }
        self.config = Some(config);
        Ok(())
    }

    pub fn start(&mut self) -> SimResult<()> {
        let config = self.config.clone().ok_or(SimError::NotConfigured)?;
        config.validate()?;
        if self.is_running() {
            return Err(SimError::AlreadyRunning);
        }

        let (shutdown_tx, shutdown_rx) = channel::bounded::<()>(0);
        let cancelled = Arc::new(AtomicBool::new(false));
        let now = Instant::now();

        let entries: Vec<ScheduledRunner> = self
            .runners
            .iter()
            .map(|r| ScheduledRunner {
                name:     r.name,
                runner:   r.handle.clone(),
                period:   config.delay_for(r.unit),
                next_due: now,
            })
            .collect();
        for e in &entries {
            log::info!("Scheduling runner '{}' every {:?}", e.name, e.period);
        }

        let simulation = {
            let shutdown_rx = shutdown_rx.clone();
            let cancelled = cancelled.clone();
            let token = self.lane_token.clone();
            Lane::spawn("sim-lane", move || {
                run_simulation_lane(entries, shutdown_rx, cancelled, token)
            })?
        };

        let metrics = match (&self.metrics, config.display_metrics) {
            (Some(reporter), true) => {
                let reporter = reporter.clone();
                let interval = config.metrics_interval();
                let lane_cancelled = cancelled.clone();
                let spawned = Lane::spawn("metrics-lane", move || {
                    run_metrics_lane(reporter, interval, shutdown_rx, lane_cancelled)
                });
                match spawned {
                    Ok(lane) => Some(lane),
                    Err(e) => {
                        // Take the simulation lane down with us.
                        cancelled.store(true, Ordering::Release);
                        drop(shutdown_tx);
                        simulation.join_until(Instant::now() + config.stop_timeout());
                        return Err(e);
                    }
                }
            }
            (None, true) => {
                log::warn!("display_metrics is set but no metrics reporter is attached");
                None
            }
            _ => None,
        };

        self.lanes = Some(Lanes {
            shutdown_tx,
            cancelled,
            simulation,
            metrics,
            stop_timeout: config.stop_timeout(),
        });
        log::info!("Scheduler started with {} runners", self.runners.len());
        Ok(())
    }

    /// Stop scheduling. After return no new tick starts; a tick that
    /// outlived the timeout may still be finishing on an abandoned lane.
    pub fn stop(&mut self) -> Shutdown {
        let Some(lanes) = self.lanes.take() else {
            return Shutdown::AlreadyStopped;
        };
        lanes.cancelled.store(true, Ordering::Release);
        drop(lanes.shutdown_tx);

        let deadline = Instant::now() + lanes.stop_timeout;
        let mut clean = lanes.simulation.join_until(deadline);
        if let Some(metrics) = lanes.metrics {
            clean &= metrics.join_until(deadline);
        }

        if clean {
            log::info!("Scheduler stopped");
            Shutdown::Clean
        } else {
            log::warn!("Scheduler stopped; teardown was not clean");
            Shutdown::TimedOut
        }
    }

    pub fn restart(&mut self) -> SimResult<Shutdown> {
        let shutdown = self.stop();
        self.start()?;
        Ok(shutdown)
    }
}

impl Default for TimeScaleScheduler {
    fn default() -> Self { Self::new() }
}

impl Drop for TimeScaleScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_simulation_lane(
    mut entries: Vec<ScheduledRunner>,
    shutdown_rx: Receiver<()>,
    cancelled: Arc<AtomicBool>,
    token: Arc<Mutex<()>>,
) {
    loop {
        // min_by_key keeps the first of equal keys: registration order breaks ties.
        let Some(next) = entries
            .iter()
            .enumerate()
            .min_by_key(|(_, e)| e.next_due)
            .map(|(i, _)| i)
        else {
            return;
        };

        let wait = entries[next].next_due.saturating_duration_since(Instant::now());
        if !wait.is_zero() {
            match shutdown_rx.recv_timeout(wait) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
            }
        }
        if cancelled.load(Ordering::Acquire) {
            return;
        }

        let entry = &mut entries[next];
        let report = {
            // May block behind an abandoned tick; stop() can return meanwhile.
            let _lane = token.lock();
            if cancelled.load(Ordering::Acquire) {
                return;
            }
            entry.runner.lock().run()
        };
        if !report.is_clean() {
            log::debug!(
                "runner={} tick={} finished with {} faults",
                report.runner,
                report.tick,
                report.faults().count()
            );
        }
        entry.next_due = Instant::now() + entry.period;
    }
}

fn run_metrics_lane(
    reporter: MetricsReporter,
    interval: Duration,
    shutdown_rx: Receiver<()>,
    cancelled: Arc<AtomicBool>,
) {
    loop {
        match shutdown_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
        }
        if cancelled.load(Ordering::Acquire) {
            return;
        }
        reporter.report();
    }
}
