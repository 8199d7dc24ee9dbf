//! Particle state and Verlet integration
//!
//! Velocity is never stored. It is the difference between the current and
//! previous position, divided by the step length that produced it. Every
//! velocity read or write therefore names its `dt` explicitly.

use std::fmt;

use glam::Vec2;

use super::grid::{GridCell, cell_of};
use crate::{Color, clamp_magnitude};

/// Stable handle of a particle inside its solver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub u32);

impl ParticleId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-particle motion caps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionLimits {
    /// Speed cap (units/s), enforced after each integration
    pub max_velocity: f32,
    /// Acceleration cap (units/s²), enforced on each accumulation
    pub max_acceleration: f32,
}

/// One circular body
#[derive(Debug, Clone)]
pub struct Particle {
    id: ParticleId,
    position: Vec2,
    previous_position: Vec2,
    acceleration: Vec2,
    radius: f32,
    mass: f32,
    grid_cell: GridCell,
    limits: MotionLimits,
    /// Display color, ignored by physics
    pub color: Color,
}

impl Particle {
    /// Create a particle at rest.
    pub fn new(
        id: ParticleId,
        position: Vec2,
        radius: f32,
        mass: f32,
        cell_size: f32,
        limits: MotionLimits,
    ) -> Self {
        Self {
            id,
            position,
            previous_position: position,
            acceleration: Vec2::ZERO,
            radius,
            mass,
            grid_cell: cell_of(position, cell_size),
            limits,
            color: crate::consts::DEFAULT_COLOR,
        }
    }

    #[inline]
    pub fn id(&self) -> ParticleId {
        self.id
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn previous_position(&self) -> Vec2 {
        self.previous_position
    }

    #[inline]
    pub fn acceleration(&self) -> Vec2 {
        self.acceleration
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn grid_cell(&self) -> GridCell {
        self.grid_cell
    }

    #[inline]
    pub fn limits(&self) -> MotionLimits {
        self.limits
    }

    /// Add to the acceleration accumulator, then cap its magnitude
    pub fn accelerate(&mut self, delta: Vec2) {
        self.acceleration = clamp_magnitude(self.acceleration + delta, self.limits.max_acceleration);
    }

    /// Impose a velocity by rewriting the position history
    #[inline]
    pub fn set_velocity(&mut self, velocity: Vec2, dt: f32) {
        self.previous_position = self.position - velocity * dt;
    }

    /// Velocity over the last step of length `dt`
    #[inline]
    pub fn velocity(&self, dt: f32) -> Vec2 {
        self.displacement() / dt
    }

    /// Raw position change over the last step
    #[inline]
    pub fn displacement(&self) -> Vec2 {
        self.position - self.previous_position
    }

    /// Move the body while keeping its current displacement.
    ///
    /// The grid cell is left alone; the next integration refreshes it.
    pub(crate) fn translate_to(&mut self, position: Vec2) {
        let displacement = self.displacement();
        self.position = position;
        self.previous_position = position - displacement;
    }

    /// Störmer-Verlet step.
    ///
    /// Returns true if the resulting velocity had to be clamped.
    pub fn integrate(&mut self, dt: f32, cell_size: f32) -> bool {
        let displacement = self.displacement();
        self.previous_position = self.position;
        self.position += displacement + self.acceleration * (dt * dt);
        self.acceleration = Vec2::ZERO;

        let velocity = self.velocity(dt);
        let clamped = velocity.length_squared() > self.limits.max_velocity * self.limits.max_velocity;
        if clamped {
            self.set_velocity(clamp_magnitude(velocity, self.limits.max_velocity), dt);
        }

        self.grid_cell = cell_of(self.position, cell_size);
        clamped
    }
}
