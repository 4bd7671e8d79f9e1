use crate::{
    error::SimResult,
    probability::EventRate,
    scenario,
    simulator::{ComponentSimulator, TickContext, TickOutcome},
    time_unit::TimeUnit,
    world::SharedState,
};

/// Default dispatch rate for an open order.
pub const DISPATCH_RATE: EventRate = EventRate::per(3, TimeUnit::Day);

/// Dispatches open orders. Each open order independently rolls
/// against the dispatch rate; a winning roll ships it on the first
/// idle vehicle, if any.
// TODO: consolidate several orders into one delivery up to the vehicle's capacity_kg.
pub struct DeliverySimulator {
    rate: EventRate,
}

impl DeliverySimulator {
    pub fn new(rate: EventRate) -> Self {
        Self { rate }
    }
}

impl Default for DeliverySimulator {
    fn default() -> Self { Self::new(DISPATCH_RATE) }
}

impl ComponentSimulator for DeliverySimulator {
    fn name(&self) -> &'static str { "delivery" }

    fn tick(&mut self, ctx: &mut TickContext<'_>, state: &SharedState) -> SimResult<TickOutcome> {
        let rate = self.rate;

        let dispatched = state.write(|world| {
            let company = &mut world.company;
            let mut dispatched = 0;
            for order_id in company.open_order_ids() {
                if !ctx.fires(rate) {
                    continue;
                }
                let Some(delivery) = scenario::plan_delivery(company, &order_id, ctx.rng()) else {
                    continue;
                };
                if company.new_delivery(delivery) {
                    dispatched += 1;
                }
            }
            dispatched
        });

        if dispatched > 0 {
            log::debug!("tick={} dispatched {dispatched} deliveries", ctx.tick);
        }
        Ok(TickOutcome::mutated(dispatched))
    }
}
