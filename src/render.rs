//! Render extraction
//!
//! Drawing happens elsewhere. This module flattens the particle view into
//! instances that can be copied straight into a GPU instance buffer.

use bytemuck::{Pod, Zeroable};

use crate::Color;
use crate::sim::{Particle, Solver};

/// One circle to draw
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 2],
    pub radius: f32,
    /// Keeps `color` 16-byte aligned for std140/std430 layouts
    pub _pad: f32,
    pub color: Color,
}

impl ParticleInstance {
    pub fn from_particle(particle: &Particle) -> Self {
        Self {
            position: particle.position().to_array(),
            radius: particle.radius(),
            _pad: 0.0,
            color: particle.color,
        }
    }
}

/// Instances in particle id order
pub fn extract_instances(solver: &Solver) -> Vec<ParticleInstance> {
    solver
        .particles()
        .iter()
        .map(ParticleInstance::from_particle)
        .collect()
}

/// Byte view for buffer uploads
pub fn instance_bytes(instances: &[ParticleInstance]) -> &[u8] {
    bytemuck::cast_slice(instances)
}
