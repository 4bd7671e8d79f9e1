//! Real-time scheduling: lifecycle, cadence, and teardown.
//!
//! Delays here are a few milliseconds; assertions leave generous slack
//! for loaded machines.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use supplychain_core::{
    config::{SchedulerConfig, SimConfig},
    error::{SimError, SimResult},
    rng::{RngBank, SimulatorSlot},
    runner::CompositeRunner,
    scenario,
    scheduler::{Shutdown, TimeScaleScheduler},
    simulator::{ComponentSimulator, TickContext, TickOutcome},
    time_unit::TimeUnit,
    world::SharedState,
};

fn shared_world() -> (SharedState, RngBank) {
    let cfg = SimConfig::default_test();
    let bank = RngBank::new(cfg.seed);
    (SharedState::new(scenario::generate(&cfg.scenario, &bank)), bank)
}

fn single(name: &'static str, unit: TimeUnit, sim: impl ComponentSimulator + 'static) -> CompositeRunner {
    let (state, bank) = shared_world();
    CompositeRunner::builder(name, unit, state, bank)
        .register(SimulatorSlot::Custom(1), Box::new(sim))
        .build()
        .unwrap()
}

fn hourly_every(micros: u64) -> SchedulerConfig {
    let mut config = SimConfig::default_test().scheduler;
    config.delay_overrides_micros.insert(TimeUnit::Hour, micros);
    config
}

/// Counts ticks and remembers when each one started.
#[derive(Clone, Default)]
struct Probe {
    ticks:   Arc<AtomicUsize>,
    started: Arc<Mutex<Vec<Instant>>>,
}

impl Probe {
    fn count(&self) -> usize {
        self.ticks.load(Ordering::SeqCst)
    }
}

impl ComponentSimulator for Probe {
    fn name(&self) -> &'static str { "probe" }

    fn tick(&mut self, _ctx: &mut TickContext<'_>, _state: &SharedState) -> SimResult<TickOutcome> {
        self.started.lock().push(Instant::now());
        self.ticks.fetch_add(1, Ordering::SeqCst);
        Ok(TickOutcome::idle())
    }
}

/// Sleeps inside its tick and records the peak number of concurrent ticks.
#[derive(Clone)]
struct Sleeper {
    label:  &'static str,
    nap:    Duration,
    active: Arc<AtomicUsize>,
    peak:   Arc<AtomicUsize>,
    trace:  Arc<Mutex<Vec<&'static str>>>,
}

impl Sleeper {
    fn new(label: &'static str, nap: Duration) -> Self {
        Self {
            label,
            nap,
            active: Arc::default(),
            peak:   Arc::default(),
            trace:  Arc::default(),
        }
    }

    fn sharing(&self, label: &'static str) -> Self {
        Self { label, ..self.clone() }
    }
}

impl ComponentSimulator for Sleeper {
    fn name(&self) -> &'static str { self.label }

    fn tick(&mut self, _ctx: &mut TickContext<'_>, _state: &SharedState) -> SimResult<TickOutcome> {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now_active, Ordering::SeqCst);
        self.trace.lock().push(self.label);
        thread::sleep(self.nap);
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(TickOutcome::idle())
    }
}

fn median_interval(stamps: &[Instant]) -> Duration {
    let mut gaps: Vec<Duration> = stamps.windows(2).map(|w| w[1] - w[0]).collect();
    assert!(!gaps.is_empty(), "need at least two ticks");
    gaps.sort();
    gaps[gaps.len() / 2]
}

#[test]
fn start_without_config_schedules_nothing() {
    let probe = Probe::default();
    let mut scheduler = TimeScaleScheduler::new();
    scheduler.add_runner(single("probe", TimeUnit::Hour, probe.clone()));

    assert!(matches!(scheduler.start(), Err(SimError::NotConfigured)));
    assert!(!scheduler.is_running());
    thread::sleep(Duration::from_millis(30));
    assert_eq!(probe.count(), 0);
}

#[test]
fn ticks_stop_after_stop_returns() {
    let probe = Probe::default();
    let mut scheduler = TimeScaleScheduler::with_config(hourly_every(2_000)).unwrap();
    scheduler.add_runner(single("probe", TimeUnit::Hour, probe.clone()));

    scheduler.start().unwrap();
    assert!(scheduler.is_running());
    thread::sleep(Duration::from_millis(80));
    assert_eq!(scheduler.stop(), Shutdown::Clean);
    assert!(!scheduler.is_running());

    let at_stop = probe.count();
    assert!(at_stop >= 3, "only {at_stop} ticks in 80ms");
    thread::sleep(Duration::from_millis(40));
    assert_eq!(probe.count(), at_stop);
}

#[test]
fn first_tick_is_immediate() {
    let probe = Probe::default();
    let mut scheduler = TimeScaleScheduler::with_config(hourly_every(10_000_000)).unwrap();
    scheduler.add_runner(single("probe", TimeUnit::Hour, probe.clone()));

    scheduler.start().unwrap();
    thread::sleep(Duration::from_millis(50));
    assert_eq!(scheduler.stop(), Shutdown::Clean);
    assert_eq!(probe.count(), 1);
}

#[test]
fn second_start_is_rejected_and_stop_is_idempotent() {
    let mut scheduler = TimeScaleScheduler::with_config(hourly_every(5_000)).unwrap();
    scheduler.add_runner(single("probe", TimeUnit::Hour, Probe::default()));

    assert_eq!(scheduler.stop(), Shutdown::AlreadyStopped);
    scheduler.start().unwrap();
    assert!(matches!(scheduler.start(), Err(SimError::AlreadyRunning)));
    assert_eq!(scheduler.stop(), Shutdown::Clean);
    assert_eq!(scheduler.stop(), Shutdown::AlreadyStopped);
}

#[test]
fn restart_keeps_cadence_without_duplicates() {
    let probe = Probe::default();
    let mut scheduler = TimeScaleScheduler::with_config(hourly_every(15_000)).unwrap();
    scheduler.add_runner(single("probe", TimeUnit::Hour, probe.clone()));

    scheduler.start().unwrap();
    let mut splits = vec![0];
    for _ in 0..2 {
        thread::sleep(Duration::from_millis(200));
        assert_eq!(scheduler.restart().unwrap(), Shutdown::Clean);
        splits.push(probe.started.lock().len());
    }
    thread::sleep(Duration::from_millis(200));
    assert_eq!(scheduler.stop(), Shutdown::Clean);
    splits.push(probe.started.lock().len());

    let stamps = probe.started.lock().clone();
    let medians: Vec<Duration> = splits
        .windows(2)
        .map(|w| median_interval(&stamps[w[0]..w[1]]))
        .collect();
    assert_eq!(medians.len(), 3);

    let (lo, hi) = (medians.iter().min().unwrap(), medians.iter().max().unwrap());
    assert!(*lo >= Duration::from_millis(15), "cadence too fast: {medians:?}");
    assert!(*hi - *lo < Duration::from_millis(10), "cadence changed across restarts: {medians:?}");
}

#[test]
fn reconfigure_applies_on_next_start_only() {
    let probe = Probe::default();
    let mut scheduler = TimeScaleScheduler::with_config(hourly_every(2_000)).unwrap();
    scheduler.add_runner(single("probe", TimeUnit::Hour, probe.clone()));
    scheduler.start().unwrap();

    let slow = hourly_every(10_000_000);
    scheduler.reconfigure(slow.clone()).unwrap();
    assert_eq!(scheduler.config(), Some(&slow));

    let mark = probe.count();
    thread::sleep(Duration::from_millis(60));
    assert!(probe.count() - mark >= 5, "running schedule slowed down after reconfigure");

    scheduler.restart().unwrap();
    let mark = probe.count();
    thread::sleep(Duration::from_millis(60));
    assert_eq!(probe.count() - mark, 1, "only the immediate first tick under the slow config");
    assert_eq!(scheduler.stop(), Shutdown::Clean);
}

#[test]
fn invalid_reconfigure_keeps_previous_config() {
    let previous = hourly_every(5_000);
    let mut scheduler = TimeScaleScheduler::with_config(previous.clone()).unwrap();

    let mut broken = previous.clone();
    broken.micros_per_virtual_hour = 0;
    assert!(matches!(scheduler.reconfigure(broken), Err(SimError::InvalidConfig(_))));
    assert_eq!(scheduler.config(), Some(&previous));
}

#[test]
fn tied_runners_start_in_registration_order() {
    let first = Sleeper::new("first", Duration::ZERO);
    let second = first.sharing("second");
    let mut scheduler = TimeScaleScheduler::with_config(hourly_every(1_000_000)).unwrap();
    scheduler.add_runner(single("first", TimeUnit::Hour, first.clone()));
    scheduler.add_runner(single("second", TimeUnit::Hour, second));

    scheduler.start().unwrap();
    thread::sleep(Duration::from_millis(40));
    scheduler.stop();
    assert_eq!(*first.trace.lock(), vec!["first", "second"]);
}

#[test]
fn ticks_never_overlap_across_runners() {
    let hourly = Sleeper::new("hourly", Duration::from_millis(2));
    let minutely = hourly.sharing("minutely");
    let mut config = hourly_every(1_000);
    config.delay_overrides_micros.insert(TimeUnit::Minute, 500);
    let mut scheduler = TimeScaleScheduler::with_config(config).unwrap();
    scheduler.add_runner(single("hourly", TimeUnit::Hour, hourly.clone()));
    scheduler.add_runner(single("minutely", TimeUnit::Minute, minutely));

    scheduler.start().unwrap();
    thread::sleep(Duration::from_millis(80));
    assert_eq!(scheduler.stop(), Shutdown::Clean);

    let trace = hourly.trace.lock();
    assert!(trace.contains(&"hourly") && trace.contains(&"minutely"));
    assert_eq!(hourly.peak.load(Ordering::SeqCst), 1);
}

#[test]
fn stop_gives_up_on_a_stuck_tick() {
    let slow = Sleeper::new("slow", Duration::from_millis(300));
    let mut config = hourly_every(1_000);
    config.stop_timeout_ms = 30;
    let mut scheduler = TimeScaleScheduler::with_config(config).unwrap();
    scheduler.add_runner(single("slow", TimeUnit::Hour, slow.clone()));

    scheduler.start().unwrap();
    thread::sleep(Duration::from_millis(20));
    let began = Instant::now();
    assert_eq!(scheduler.stop(), Shutdown::TimedOut);
    assert!(began.elapsed() < Duration::from_millis(250), "stop blocked on the tick");
    assert!(!scheduler.is_running());

    // The abandoned tick finishes, but nothing new starts.
    thread::sleep(Duration::from_millis(450));
    assert_eq!(slow.trace.lock().len(), 1);
}

#[test]
fn abandoned_tick_does_not_overlap_a_new_start() {
    let slow = Sleeper::new("slow", Duration::from_millis(120));
    let mut config = hourly_every(1_000);
    config.stop_timeout_ms = 20;
    let mut scheduler = TimeScaleScheduler::with_config(config).unwrap();
    scheduler.add_runner(single("slow", TimeUnit::Hour, slow.clone()));

    scheduler.start().unwrap();
    thread::sleep(Duration::from_millis(10));
    assert_eq!(scheduler.stop(), Shutdown::TimedOut);
    scheduler.start().unwrap();
    thread::sleep(Duration::from_millis(300));
    scheduler.stop();
    thread::sleep(Duration::from_millis(150));

    assert!(slow.trace.lock().len() >= 2);
    assert_eq!(slow.peak.load(Ordering::SeqCst), 1);
}

#[test]
fn lane_waiting_on_an_abandoned_tick_never_starts_after_stop() {
    let slow = Sleeper::new("slow", Duration::from_millis(200));
    let mut config = hourly_every(1_000);
    config.stop_timeout_ms = 20;
    let mut scheduler = TimeScaleScheduler::with_config(config).unwrap();
    scheduler.add_runner(single("slow", TimeUnit::Hour, slow.clone()));

    scheduler.start().unwrap();
    thread::sleep(Duration::from_millis(10));
    assert_eq!(scheduler.stop(), Shutdown::TimedOut);

    // The new lane queues behind the abandoned tick, then is stopped.
    scheduler.start().unwrap();
    thread::sleep(Duration::from_millis(10));
    scheduler.stop();
    let at_stop = slow.trace.lock().len();
    assert_eq!(at_stop, 1);

    thread::sleep(Duration::from_millis(600));
    assert_eq!(slow.trace.lock().len(), at_stop, "a tick started after stop() returned");
}
