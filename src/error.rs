//! Error types for the solver and its configuration

use glam::Vec2;
use thiserror::Error;

use crate::sim::ParticleId;

/// Errors surfaced by solver operations.
///
/// `DegenerateCollision` is never fatal: the pipeline counts and skips it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// The particle collection is full.
    #[error("capacity exceeded: solver holds at most {capacity} particles")]
    CapacityExceeded { capacity: usize },
    /// Two overlapping particles share a center, so no contact normal exists.
    #[error("degenerate collision between {a} and {b}: coincident centers")]
    DegenerateCollision { a: ParticleId, b: ParticleId },
    /// Handle does not name a particle in this solver.
    #[error("unknown particle {0}")]
    UnknownParticle(ParticleId),
    /// Spawn parameters outside their physical range.
    #[error("invalid particle at {position}: {reason} (radius {radius}, mass {mass})")]
    InvalidParticle {
        reason: &'static str,
        position: Vec2,
        radius: f32,
        mass: f32,
    },
    /// The grid holds a different number of ids than there are particles.
    #[error("grid holds {found} ids for {expected} particles")]
    GridMismatch { expected: usize, found: usize },
    /// A particle is missing from the cell under its position.
    #[error("particle {0} is not indexed at its cell")]
    MisplacedParticle(ParticleId),
    /// A particle's position is NaN or infinite.
    #[error("particle {0} has a non-finite position")]
    NonFiniteState(ParticleId),
}

/// Configuration loading and validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error while reading a config file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed JSON or unknown fields.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// A value is out of its physical range.
    #[error("invalid config: {0}")]
    Invalid(String),
}
