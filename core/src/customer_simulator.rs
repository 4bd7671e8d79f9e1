use crate::{
    error::SimResult,
    probability::EventRate,
    scenario,
    simulator::{ComponentSimulator, TickContext, TickOutcome},
    world::SharedState,
};

/// Acquires new customers. Demand below 1.0 thins acquisitions
/// proportionally; demand above 1.0 does not add extra draws.
pub struct CustomerSimulator {
    rate: EventRate,
}

impl CustomerSimulator {
    pub fn new(rate: EventRate) -> Self {
        Self { rate }
    }
}

impl ComponentSimulator for CustomerSimulator {
    fn name(&self) -> &'static str { "customer" }

    fn tick(&mut self, ctx: &mut TickContext<'_>, state: &SharedState) -> SimResult<TickOutcome> {
        if !ctx.fires(self.rate) {
            return Ok(TickOutcome::idle());
        }
        let demand = state.read(|w| w.economy.demand);
        if !ctx.rng().chance(demand) {
            return Ok(TickOutcome::idle());
        }

        let customer = scenario::new_customer(ctx.rng());
        log::debug!("tick={} new customer {} in {}", ctx.tick, customer.id, customer.address.city);
        state.write(|w| w.company.new_customer(customer));
        Ok(TickOutcome::mutated(1))
    }
}
