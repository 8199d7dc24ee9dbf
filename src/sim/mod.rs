//! Particle simulation
//!
//! Everything that affects motion lives here:
//! - Verlet particles with derived velocity
//! - Sparse uniform grid for neighbor queries
//! - Impulse-based pair collisions
//! - Boundary containment
//! - The fixed-substep solver driving them

pub mod boundary;
pub mod collision;
pub mod grid;
pub mod particle;
pub mod solver;

pub use boundary::Boundary;
pub use collision::{PairOutcome, overlaps, resolve_pair};
pub use grid::{GridCell, NEIGHBOR_OFFSETS, SpatialGrid, cell_of};
pub use particle::{MotionLimits, Particle, ParticleId};
pub use solver::{ParticleSpec, Solver, StepStats};
