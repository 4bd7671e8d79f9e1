//! The shared world and the handle every lane goes through.
//!
//! RULE: Nothing outside this module touches the lock directly.
//! The mutation lane calls `write` once per simulator invocation,
//! never across a tick boundary. The metrics lane only calls `read`.
//! A reader may therefore land between two simulators of the same
//! tick and see a partially advanced state. That is accepted for
//! display purposes.

use crate::{company::Company, economy::Economy};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub company: Company,
    pub economy: Economy,
}

impl World {
    pub fn new(company: Company, economy: Economy) -> Self {
        Self { company, economy }
    }
}

/// Cloneable handle to the session's world.
#[derive(Debug, Clone)]
pub struct SharedState {
    inner: Arc<RwLock<World>>,
}

impl SharedState {
    pub fn new(world: World) -> Self {
        Self { inner: Arc::new(RwLock::new(world)) }
    }

    /// Run `f` against a read view of the world.
    pub fn read<R>(&self, f: impl FnOnce(&World) -> R) -> R {
        let guard = self.inner.read();
        f(&guard)
    }

    /// Run `f` with exclusive access. The lock is released when `f` returns
    /// or unwinds; parking_lot locks do not poison.
    pub fn write<R>(&self, f: impl FnOnce(&mut World) -> R) -> R {
        let mut guard = self.inner.write();
        f(&mut guard)
    }

    /// Deep copy of the current world.
    pub fn snapshot(&self) -> World {
        self.read(World::clone)
    }
}
