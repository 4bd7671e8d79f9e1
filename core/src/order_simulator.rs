use crate::{
    error::SimResult,
    probability::EventRate,
    scenario,
    simulator::{ComponentSimulator, TickContext, TickOutcome},
    world::SharedState,
};

/// Places orders. Each customer is an independent trial per tick,
/// thinned by demand the same way as customer acquisition.
pub struct OrderSimulator {
    rate: EventRate,
}

impl OrderSimulator {
    pub fn new(rate: EventRate) -> Self {
        Self { rate }
    }
}

impl ComponentSimulator for OrderSimulator {
    fn name(&self) -> &'static str { "order" }

    fn tick(&mut self, ctx: &mut TickContext<'_>, state: &SharedState) -> SimResult<TickOutcome> {
        let rate = self.rate;
        let placed_at = ctx.virtual_time;

        let placed = state.write(|world| {
            let demand = world.economy.demand;
            let customer_ids: Vec<_> =
                world.company.customers().iter().map(|c| c.id.clone()).collect();

            let mut placed = 0;
            for customer_id in customer_ids {
                if !ctx.fires(rate) || !ctx.rng().chance(demand) {
                    continue;
                }
                let Some(order) = scenario::random_order(&world.company, &customer_id, placed_at, ctx.rng())
                else {
                    break; // empty catalog
                };
                if world.company.new_order(order) {
                    placed += 1;
                }
            }
            placed
        });

        if placed > 0 {
            log::debug!("tick={} placed {placed} orders", ctx.tick);
        }
        Ok(TickOutcome::mutated(placed))
    }
}
