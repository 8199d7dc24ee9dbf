//! Pairwise collision detection and impulse response
//!
//! Only velocities change on contact. Overlap is worked out over the next
//! substeps as the bodies move apart.

use glam::Vec2;

use super::particle::Particle;
use crate::error::SolverError;

/// What happened to a candidate pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PairOutcome {
    /// Not touching
    Apart,
    /// Touching but already moving apart
    Separating,
    /// Impulse applied
    Resolved { impulse: f32 },
}

/// Center distance below the sum of radii
#[inline]
pub fn overlaps(a: &Particle, b: &Particle) -> bool {
    let r = a.radius() + b.radius();
    a.position().distance_squared(b.position()) < r * r
}

/// Impulse magnitude along the contact normal.
///
/// `closing` is the relative normal velocity (negative when approaching).
#[inline]
pub fn impulse_magnitude(closing: f32, restitution: f32, mass_a: f32, mass_b: f32) -> f32 {
    -(1.0 + restitution) * closing / (1.0 / mass_a + 1.0 / mass_b)
}

/// Test and resolve one pair using velocities over the substep `dt`
pub fn resolve_pair(
    a: &mut Particle,
    b: &mut Particle,
    restitution: f32,
    dt: f32,
) -> Result<PairOutcome, SolverError> {
    if !overlaps(a, b) {
        return Ok(PairOutcome::Apart);
    }

    let delta = a.position() - b.position();
    let dist = delta.length();
    if dist == 0.0 {
        return Err(SolverError::DegenerateCollision {
            a: a.id(),
            b: b.id(),
        });
    }

    // Normal points from B to A
    let normal = delta / dist;
    let va = a.velocity(dt);
    let vb = b.velocity(dt);
    let closing = (va - vb).dot(normal);
    if closing > 0.0 {
        return Ok(PairOutcome::Separating);
    }

    let impulse = impulse_magnitude(closing, restitution, a.mass(), b.mass());
    let impulse_vec: Vec2 = normal * impulse;
    a.set_velocity(va + impulse_vec / a.mass(), dt);
    b.set_velocity(vb - impulse_vec / b.mass(), dt);

    Ok(PairOutcome::Resolved { impulse })
}
