//! Verlet Grid - a real-time 2D particle solver
//!
//! Core modules:
//! - `sim`: Particles, spatial grid, collisions, boundary and the substep pipeline
//! - `config`: Solver configuration (JSON loadable, validated)
//! - `spawner`: Population growth over time up to a cap
//! - `render`: GPU-ready particle instances for an external renderer
//! - `error`: Error types

pub mod config;
pub mod error;
pub mod render;
pub mod sim;
pub mod spawner;

pub use config::{GridRepair, SolverConfig, SpawnerConfig};
pub use error::{ConfigError, SolverError};
pub use sim::{Particle, ParticleId, Solver, StepStats};
pub use spawner::Spawner;

use glam::Vec2;

/// RGBA color in linear 0-1 floats
pub type Color = [f32; 4];

/// Simulation defaults
pub mod consts {
    use crate::Color;

    /// Square world edge length (pixels)
    pub const WORLD_SIZE: f32 = 840.0;
    /// Downward gravity (pixels/s²)
    pub const GRAVITY_Y: f32 = 1000.0;
    /// Fixed frame timestep (60 Hz)
    pub const STEP_DT: f32 = 1.0 / 60.0;
    /// Substeps per frame
    pub const SUBSTEPS: u32 = 8;

    /// Grid cell edge, roughly one particle diameter
    pub const CELL_SIZE: f32 = 12.0;

    /// Fraction of closing speed kept after a particle-particle hit
    pub const RESTITUTION: f32 = 0.75;
    /// Velocity scale applied on wall contact
    pub const WALL_DAMPING: f32 = 0.75;
    /// Normal-velocity scale on the circular rim (mirror bounce)
    pub const CIRCLE_DAMPING: f32 = 1.0;

    /// Speed cap (pixels/s)
    pub const MAX_VELOCITY: f32 = 1200.0;
    /// Acceleration cap (pixels/s²)
    pub const MAX_ACCELERATION: f32 = 2000.0;

    /// Solver capacity
    pub const MAX_OBJECTS: usize = 2000;

    pub const DEFAULT_MASS: f32 = 2.0;
    pub const DEFAULT_COLOR: Color = [0.0, 1.0, 1.0, 1.0]; // cyan
}

/// Clamp a vector's length to `max`, keeping its direction.
///
/// Zero-length input stays zero.
#[inline]
pub fn clamp_magnitude(v: Vec2, max: f32) -> Vec2 {
    let len_sq = v.length_squared();
    if len_sq > max * max {
        v * (max / len_sq.sqrt())
    } else {
        v
    }
}
