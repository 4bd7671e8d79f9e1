use crate::{
    error::SimResult,
    simulator::{ComponentSimulator, TickContext, TickOutcome},
    time_unit::TimeUnit,
    world::SharedState,
};

/// Moves in-transit deliveries along their route by vehicle speed times
/// the tick's virtual span, updates the telemetry position, and completes
/// deliveries that reach their destination. Deterministic: draws nothing.
pub struct DeliveryMovementSimulator;

impl DeliveryMovementSimulator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DeliveryMovementSimulator {
    fn default() -> Self { Self::new() }
}

impl ComponentSimulator for DeliveryMovementSimulator {
    fn name(&self) -> &'static str { "movement" }

    fn tick(&mut self, ctx: &mut TickContext<'_>, state: &SharedState) -> SimResult<TickOutcome> {
        let hours = ctx.unit().ratio_to(TimeUnit::Hour);

        let (moved, arrived) = state.write(|world| {
            let company = &mut world.company;
            let mut moved = 0;
            let mut arrived = Vec::new();
            for delivery_id in company.in_transit_delivery_ids() {
                let Some(speed) = company
                    .deliveries()
                    .iter()
                    .find(|d| d.id == delivery_id)
                    .and_then(|d| company.transportation_by_id(&d.transportation_id))
                    .map(|t| t.speed_kmh)
                else {
                    continue;
                };
                let Some(delivery) = company.delivery_mut(&delivery_id) else { continue };
                delivery.travelled_km += speed * hours;
                delivery.position = delivery.origin.lerp(&delivery.destination, delivery.progress());
                moved += 1;
                if delivery.travelled_km >= delivery.distance_km {
                    arrived.push(delivery_id);
                }
            }
            for delivery_id in &arrived {
                company.complete_delivery(delivery_id);
            }
            (moved, arrived.len())
        });

        if arrived > 0 {
            log::debug!("tick={} {arrived} deliveries arrived", ctx.tick);
        }
        Ok(TickOutcome::mutated(moved))
    }
}
