//! Shared primitive types used across the entire simulation.

/// A runner tick counter. One tick = one unit of the runner's virtual time.
pub type Tick = u64;

/// A stable, unique identifier for any entity in the simulation.
pub type EntityId = String;

/// Virtual seconds elapsed since the start of a session.
pub type VirtualSeconds = u64;
