//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through SimRng instances derived
//! from the single master seed in the session config.
//!
//! Each simulator gets its own stream per tick, seeded from
//! (master_seed, slot index, tick). This means:
//!   - Adding a new simulator never changes existing simulators' streams.
//!   - A tick can be replayed in isolation from its (slot, tick) pair.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

use crate::types::{EntityId, Tick};

/// The seam through which probability checks draw randomness.
/// Tests substitute fixed or failing sources.
pub trait RandomSource {
    /// A float in [0.0, 1.0).
    fn next_f64(&mut self) -> f64;
}

/// A named, deterministic RNG for a single simulator.
pub struct SimRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SimRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Pick an index into a slice of length `len`. None when empty.
    pub fn pick_index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.next_u64_below(len as u64) as usize)
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        RandomSource::next_f64(self) < p
    }

    /// Uniform float in [lo, hi).
    pub fn range_f64(&mut self, lo: f64, hi: f64) -> f64 {
        lo + RandomSource::next_f64(self) * (hi - lo)
    }

    /// A v4-format UUID built from this stream, so ids replay with the seed.
    pub fn entity_id(&mut self) -> EntityId {
        let mut bytes = [0u8; 16];
        self.inner.fill_bytes(&mut bytes);
        uuid::Builder::from_random_bytes(bytes).into_uuid().to_string()
    }
}

impl RandomSource for SimRng {
    fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

/// Hands out per-simulator, per-tick streams for one session.
#[derive(Debug, Clone, Copy)]
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn for_simulator_at_tick(&self, slot: SimulatorSlot, tick: Tick) -> SimRng {
        let derived = self.master_seed
            ^ slot.index().wrapping_mul(0x9e37_79b9_7f4a_7c15)
            ^ tick.wrapping_mul(0xd1b5_4a32_d192_ed03);
        SimRng::from_seed(derived).with_name(slot.name())
    }
}

/// Stable simulator slot assignments.
/// NEVER reorder or remove entries, only append.
/// Reordering changes every simulator's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SimulatorSlot {
    Economy,
    Customer,
    Order,
    Delivery,
    Movement,
    Scenario,
    /// Simulators registered by embedding applications.
    Custom(u16),
}

impl SimulatorSlot {
    pub fn index(&self) -> u64 {
        match self {
            Self::Economy   => 0,
            Self::Customer  => 1,
            Self::Order     => 2,
            Self::Delivery  => 3,
            Self::Movement  => 4,
            Self::Scenario  => 5,
            Self::Custom(n) => 1_000 + u64::from(*n),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Economy   => "economy",
            Self::Customer  => "customer",
            Self::Order     => "order",
            Self::Delivery  => "delivery",
            Self::Movement  => "movement",
            Self::Scenario  => "scenario",
            Self::Custom(_) => "custom",
        }
    }
}
