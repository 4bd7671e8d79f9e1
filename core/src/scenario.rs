//! Seeded bootstrap of a starting world.
//!
//! Runs once per session before the scheduler starts. Uses the
//! Scenario slot at tick 0, so it never shares a stream with a simulator.

use crate::{
    company::{
        Company, CompanyKind, Customer, Delivery, DeliveryStatus, Order, OrderStatus, Product,
        ProductType, Transportation, TransportationMode,
    },
    config::ScenarioConfig,
    economy::Economy,
    name_generator::NameGenerator,
    rng::{RngBank, SimRng, SimulatorSlot},
    world::World,
};

/// (name, origin, unit price, unit weight kg, fragile)
const PRODUCT_TYPES: &[(&str, &str, f64, f64, bool)] = &[
    ("Apple",         "Germany", 0.5,     0.2,  false),
    ("Diamond",       "Brazil",  1000.0,  1.4,  true),
    ("Basketball",    "USA",     30.0,    1.0,  false),
    ("Crystal glass", "France",  198.4,   1.5,  true),
    ("QLED TV",       "Japan",   4509.99, 20.4, true),
];

/// (capacity kg, speed km/h, mode)
const FLEET: &[(f64, f64, TransportationMode)] = &[
    (450.0,    60.0,  TransportationMode::LandRail),
    (259.0,    140.0, TransportationMode::LandRoad),
    (30_000.0, 30.0,  TransportationMode::Water),
];

pub fn generate(config: &ScenarioConfig, rng_bank: &RngBank) -> World {
    let mut rng = rng_bank.for_simulator_at_tick(SimulatorSlot::Scenario, 0);

    let kind = match rng.next_u64_below(3) {
        0 => CompanyKind::Domestic,
        1 => CompanyKind::International,
        _ => CompanyKind::Global,
    };
    let mut company = Company::new(
        kind,
        NameGenerator::company_name(&mut rng),
        NameGenerator::address(&mut rng),
    );

    generate_catalog(&mut company, config, &mut rng);
    generate_fleet(&mut company, &mut rng);
    generate_customers(&mut company, config, &mut rng);
    generate_orders(&mut company, config, &mut rng);
    generate_deliveries(&mut company, &mut rng);

    log::info!(
        "Scenario ready: company='{}' products={} customers={} orders={} deliveries={}",
        company.name,
        company.products().len(),
        company.customers().len(),
        company.orders().len(),
        company.deliveries().len()
    );

    World::new(company, Economy::default())
}

fn generate_catalog(company: &mut Company, config: &ScenarioConfig, rng: &mut SimRng) {
    let warehouse = company.headquarters.location;
    for &(name, origin, price, weight, fragile) in PRODUCT_TYPES {
        let type_id = rng.entity_id();
        company.add_product_type(ProductType {
            id:             type_id.clone(),
            name:           name.to_string(),
            origin_country: origin.to_string(),
            unit_price:     price,
            unit_weight_kg: weight,
            fragile,
        });
        for _ in 0..config.products_per_type {
            // Shelf price within ±10% of list.
            let price = price * rng.range_f64(0.9, 1.1);
            company.add_product(Product {
                id:       rng.entity_id(),
                type_id:  type_id.clone(),
                location: warehouse,
                price,
            });
        }
    }
}

fn generate_fleet(company: &mut Company, rng: &mut SimRng) {
    for &(capacity_kg, speed_kmh, mode) in FLEET {
        company.add_transportation(Transportation {
            id: rng.entity_id(),
            capacity_kg,
            speed_kmh,
            mode,
            available: true,
        });
    }
}

fn generate_customers(company: &mut Company, config: &ScenarioConfig, rng: &mut SimRng) {
    for _ in 0..config.customers {
        company.new_customer(new_customer(rng));
    }
}

/// A fresh random customer. Shared with the customer simulator.
pub fn new_customer(rng: &mut SimRng) -> Customer {
    let name = NameGenerator::full_name(rng);
    Customer {
        id:      rng.entity_id(),
        email:   NameGenerator::email_for(&name, rng),
        address: NameGenerator::address(rng),
        name,
    }
}

fn generate_orders(company: &mut Company, config: &ScenarioConfig, rng: &mut SimRng) {
    if config.max_orders_per_customer == 0 {
        return;
    }
    let customer_ids: Vec<_> = company.customers().iter().map(|c| c.id.clone()).collect();
    for customer_id in customer_ids {
        let n = 1 + rng.next_u64_below(config.max_orders_per_customer as u64);
        for _ in 0..n {
            if let Some(order) = random_order(company, &customer_id, 0, rng) {
                company.new_order(order);
            }
        }
    }
}

/// An open order of 1 to 10 random products. None when the catalog is empty.
pub fn random_order(
    company: &Company,
    customer_id: &str,
    placed_at: u64,
    rng: &mut SimRng,
) -> Option<Order> {
    let products = company.products();
    if products.is_empty() {
        return None;
    }
    let count = 1 + rng.next_u64_below(10);
    let product_ids = (0..count)
        .filter_map(|_| rng.pick_index(products.len()))
        .map(|i| products[i].id.clone())
        .collect();
    Some(Order {
        id: rng.entity_id(),
        customer_id: customer_id.to_string(),
        product_ids,
        placed_at,
        status: OrderStatus::Open,
    })
}

fn generate_deliveries(company: &mut Company, rng: &mut SimRng) {
    let customer_ids: Vec<_> = company.customers().iter().map(|c| c.id.clone()).collect();
    for customer_id in customer_ids {
        let first_open = company
            .orders()
            .iter()
            .find(|o| o.customer_id == customer_id && o.status == OrderStatus::Open)
            .map(|o| o.id.clone());
        let Some(order_id) = first_open else { continue };
        let Some(delivery) = plan_delivery(company, &order_id, rng) else {
            break; // fleet exhausted
        };
        company.new_delivery(delivery);
    }
}

/// A delivery from headquarters to the buyer on the first idle vehicle.
/// None when no vehicle is free or the order/buyer cannot be resolved.
pub fn plan_delivery(company: &Company, order_id: &str, rng: &mut SimRng) -> Option<Delivery> {
    let vehicle = company.available_transportation()?;
    let order = company.orders().iter().find(|o| o.id == order_id)?;
    let buyer = company.customer(&order.customer_id)?;
    let origin = company.headquarters.location;
    let destination = buyer.address.location;
    Some(Delivery {
        id:                rng.entity_id(),
        order_id:          order.id.clone(),
        transportation_id: vehicle.id.clone(),
        origin,
        destination,
        distance_km:       origin.distance_km(&destination),
        travelled_km:      0.0,
        position:          origin,
        status:            DeliveryStatus::InTransit,
    })
}
