//! Read-only observation of the world on its own cadence.
//!
//! RULE: The reporter only ever calls `SharedState::read`.
//! It may sample between two simulators of one tick; snapshots are
//! advisory and never feed back into simulation decisions.

use crate::{economy::EconomicPhase, world::SharedState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub sampled_at:         DateTime<Utc>,
    pub growth:             f64,
    pub demand:             f64,
    pub sector_concurrency: f64,
    pub phase:              EconomicPhase,
    pub products:           usize,
    pub product_types:      usize,
    pub orders:             usize,
    pub open_orders:        usize,
    pub deliveries:         usize,
    pub transportation:     usize,
    pub customers:          usize,
}

/// Where snapshots go. Fire-and-forget; must not block the caller.
pub trait MetricsSink: Send + Sync {
    fn emit(&self, snapshot: &MetricsSnapshot);
}

/// Writes the economy and company lines to the log at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl MetricsSink for LogSink {
    fn emit(&self, s: &MetricsSnapshot) {
        log::info!(
            "Growth: {:.4}, Demand: {:.3}, Sector concurrency: {:.3}",
            s.growth,
            s.demand,
            s.sector_concurrency
        );
        log::info!(
            "Products: {}, Types: {}, Orders: {}, Deliveries: {}, Transportation: {}, Customers: {}",
            s.products,
            s.product_types,
            s.orders,
            s.deliveries,
            s.transportation,
            s.customers
        );
    }
}

#[derive(Clone)]
pub struct MetricsReporter {
    state: SharedState,
    sink:  Arc<dyn MetricsSink>,
}

impl MetricsReporter {
    pub fn new(state: SharedState, sink: Arc<dyn MetricsSink>) -> Self {
        Self { state, sink }
    }

    pub fn with_log_sink(state: SharedState) -> Self {
        Self::new(state, Arc::new(LogSink))
    }

    pub fn sample(&self) -> MetricsSnapshot {
        self.state.read(|w| {
            let c = &w.company;
            MetricsSnapshot {
                sampled_at:         Utc::now(),
                growth:             w.economy.growth,
                demand:             w.economy.demand,
                sector_concurrency: w.economy.sector_concurrency,
                phase:              w.economy.phase,
                products:           c.products().len(),
                product_types:      c.product_types().len(),
                orders:             c.orders().len(),
                open_orders:        c.open_order_ids().len(),
                deliveries:         c.deliveries().len(),
                transportation:     c.transportation().len(),
                customers:          c.customers().len(),
            }
        })
    }

    /// Sample and hand the snapshot to the sink.
    pub fn report(&self) -> MetricsSnapshot {
        let snapshot = self.sample();
        self.sink.emit(&snapshot);
        snapshot
    }
}
