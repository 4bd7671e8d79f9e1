use crate::{
    economy::{EconomicPhase, Economy},
    error::SimResult,
    rng::SimRng,
    simulator::{ComponentSimulator, TickContext, TickOutcome},
    time_unit::TimeUnit,
    world::SharedState,
};

const DAY: u64 = TimeUnit::Day.seconds();

/// Daily drift step for growth.
pub const GROWTH_STEP: f64 = 0.0025;
/// Daily drift step for demand and sector concurrency.
pub const INDEX_STEP: f64 = 0.02;

/// Moves the economy through its business cycle and random-walks
/// growth, demand and sector concurrency once per virtual day.
/// On sub-day ticks it acts only on the tick that starts a day;
/// on coarser ticks it advances the phase counter by the tick's span.
pub struct EconomySimulator;

impl EconomySimulator {
    pub fn new() -> Self {
        Self
    }

    fn advance_phase(economy: &mut Economy, rng: &mut SimRng) {
        economy.phase = economy.phase.next();
        // Next phase lasts 4–8 quarters.
        let quarters = 4 + rng.next_u64_below(5) as u32;
        economy.phase_days_left = quarters * 90;
    }

    fn drift(economy: &mut Economy, rng: &mut SimRng) {
        let roll = rng.range_f64(-0.5, 0.5) + economy.phase.growth_bias() * 0.2;
        let delta = if roll > 0.0 { GROWTH_STEP } else { -GROWTH_STEP };
        let (lo, hi) = Economy::GROWTH_BOUNDS;
        economy.growth = (economy.growth + delta).clamp(lo, hi);

        // Demand follows growth with noise; contraction phases pull it down.
        let pull = match economy.phase {
            EconomicPhase::Expansion | EconomicPhase::Peak => 1.0,
            EconomicPhase::Contraction | EconomicPhase::Trough => -1.0,
        };
        let demand_delta = INDEX_STEP * (0.5 * pull + rng.range_f64(-1.0, 1.0));
        let (lo, hi) = Economy::DEMAND_BOUNDS;
        economy.demand = (economy.demand + demand_delta).clamp(lo, hi);

        let (lo, hi) = Economy::CONCURRENCY_BOUNDS;
        economy.sector_concurrency =
            (economy.sector_concurrency + INDEX_STEP * rng.range_f64(-1.0, 1.0)).clamp(lo, hi);
    }
}

impl Default for EconomySimulator {
    fn default() -> Self { Self::new() }
}

impl ComponentSimulator for EconomySimulator {
    fn name(&self) -> &'static str { "economy" }

    fn tick(&mut self, ctx: &mut TickContext<'_>, state: &SharedState) -> SimResult<TickOutcome> {
        let span = ctx.unit().seconds();
        if span < DAY && ctx.virtual_time % DAY != 0 {
            return Ok(TickOutcome::idle());
        }
        let days = (span / DAY).max(1) as u32;
        let tick = ctx.tick;
        let rng = ctx.rng();

        state.write(|world| {
            let economy = &mut world.economy;
            economy.phase_days_left = economy.phase_days_left.saturating_sub(days);
            if economy.phase_days_left == 0 {
                Self::advance_phase(economy, rng);
                log::info!("tick={tick} economy entered {:?}", economy.phase);
            }
            Self::drift(economy, rng);
            log::debug!(
                "tick={tick} economy: phase={:?} growth={:.4} demand={:.3} concurrency={:.3}",
                economy.phase,
                economy.growth,
                economy.demand,
                economy.sector_concurrency
            );
        });

        Ok(TickOutcome::mutated(1))
    }
}
