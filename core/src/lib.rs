//! Supply-chain control simulation core.
//!
//! A world (company + economy) is advanced by composite runners of
//! component simulators. Each runner is bound to one virtual time unit and
//! repeats on a real-time cadence derived from the scheduler config.
//! Event rates stated per virtual unit are turned into per-tick
//! probabilities, so frequencies hold at any tick granularity.

pub mod clock;
pub mod company;
pub mod config;
pub mod customer_simulator;
pub mod delivery_simulator;
pub mod economy;
pub mod economy_simulator;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod movement_simulator;
pub mod name_generator;
pub mod order_simulator;
pub mod probability;
pub mod rng;
pub mod runner;
pub mod scenario;
pub mod scheduler;
pub mod simulator;
pub mod time_unit;
pub mod types;
pub mod world;
