//! Ordered `FixedUpdate` phases.
//!
//! ```text
//! PreSim  →  Simulation  →  PostSim
//! ```
//!
//! * **PreSim** – tick counter, structure registration and removal.
//! * **Simulation** – producer output refresh and the per-player utility
//!   pipeline (coverage, pools, distribution).
//! * **PostSim** – publishing the tick's events. Reads state only.

use bevy::prelude::*;

/// Configured as a chain by [`crate::UtilityGridPlugin`]. Host applications
/// can place their own systems relative to these phases with `.in_set()`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    PreSim,
    Simulation,
    PostSim,
}
