//! Fixed-substep simulation pipeline
//!
//! Each `update()` runs `substep_count` substeps of
//! gravity -> collisions -> boundary -> integrate + grid repair,
//! all with the same substep `dt`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::boundary::Boundary;
use super::collision::{PairOutcome, resolve_pair};
use super::grid::{GridCell, SpatialGrid};
use super::particle::{Particle, ParticleId};
use crate::Color;
use crate::config::{GridRepair, SolverConfig};
use crate::error::{ConfigError, SolverError};

/// Counters for one `update()` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepStats {
    pub substeps: u32,
    /// Candidate pairs drawn from the grid
    pub pair_checks: u64,
    pub collisions: u64,
    /// Overlapping pairs already moving apart
    pub separating: u64,
    /// Overlapping pairs with coincident centers
    pub degenerate: u64,
    pub boundary_hits: u64,
    pub velocity_clamps: u64,
    /// Particles that changed grid cell
    pub relocations: u64,
}

/// Explicit particle parameters for `Solver::add_particle_with`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSpec {
    pub position: Vec2,
    pub radius: f32,
    pub mass: f32,
    pub color: Color,
}

impl ParticleSpec {
    /// Finite position, positive finite radius and mass
    pub fn validate(&self) -> Result<(), SolverError> {
        let reason = if !self.position.is_finite() {
            "position must be finite"
        } else if !(self.radius.is_finite() && self.radius > 0.0) {
            "radius must be positive and finite"
        } else if !(self.mass.is_finite() && self.mass > 0.0) {
            "mass must be positive and finite"
        } else {
            return Ok(());
        };
        Err(SolverError::InvalidParticle {
            reason,
            position: self.position,
            radius: self.radius,
            mass: self.mass,
        })
    }
}

/// Owns every particle and the grid indexing them
#[derive(Debug, Clone)]
pub struct Solver {
    config: SolverConfig,
    particles: Vec<Particle>,
    grid: SpatialGrid,
    last_stats: StepStats,
    frame: u64,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        log::info!(
            "Solver: {} substeps of {:.6}s, cell {}, capacity {}, {} grid repair",
            config.substep_count,
            config.substep_dt(),
            config.cell_size,
            config.max_objects,
            config.grid_repair.as_str()
        );
        Ok(Self {
            grid: SpatialGrid::new(config.cell_size),
            particles: Vec::with_capacity(config.max_objects),
            last_stats: StepStats::default(),
            frame: 0,
            config,
        })
    }

    #[inline]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    #[inline]
    pub fn substep_dt(&self) -> f32 {
        self.config.substep_dt()
    }

    /// Read-only view for rendering and inspection
    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(id.index())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.max_objects
    }

    #[inline]
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    #[inline]
    pub fn last_stats(&self) -> StepStats {
        self.last_stats
    }

    /// Frames advanced so far
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Add a particle at rest with the default mass and color
    pub fn add_particle(&mut self, position: Vec2, radius: f32) -> Result<ParticleId, SolverError> {
        self.add_particle_with(ParticleSpec {
            position,
            radius,
            mass: self.config.default_mass,
            color: self.config.default_color,
        })
    }

    pub fn add_particle_with(&mut self, spec: ParticleSpec) -> Result<ParticleId, SolverError> {
        if let Err(err) = spec.validate() {
            log::warn!("Rejected spawn: {err}");
            return Err(err);
        }
        if self.particles.len() >= self.config.max_objects {
            log::warn!(
                "Rejected spawn at ({:.1}, {:.1}): capacity {} reached",
                spec.position.x,
                spec.position.y,
                self.config.max_objects
            );
            return Err(SolverError::CapacityExceeded {
                capacity: self.config.max_objects,
            });
        }

        let id = ParticleId(self.particles.len() as u32);
        let mut particle = Particle::new(
            id,
            spec.position,
            spec.radius,
            spec.mass,
            self.config.cell_size,
            self.config.limits(),
        );
        particle.color = spec.color;
        self.grid.insert(id, particle.grid_cell());
        self.particles.push(particle);
        Ok(id)
    }

    /// Impose a velocity (units/s) using the substep `dt`
    pub fn set_velocity(&mut self, id: ParticleId, velocity: Vec2) -> Result<(), SolverError> {
        let dt = self.substep_dt();
        let particle = self
            .particles
            .get_mut(id.index())
            .ok_or(SolverError::UnknownParticle(id))?;
        particle.set_velocity(velocity, dt);
        Ok(())
    }

    pub fn set_color(&mut self, id: ParticleId, color: Color) -> Result<(), SolverError> {
        let particle = self
            .particles
            .get_mut(id.index())
            .ok_or(SolverError::UnknownParticle(id))?;
        particle.color = color;
        Ok(())
    }

    /// Current velocity (units/s) of a particle
    pub fn velocity(&self, id: ParticleId) -> Option<Vec2> {
        let dt = self.substep_dt();
        self.particle(id).map(|p| p.velocity(dt))
    }

    /// Advance one frame
    pub fn update(&mut self) -> StepStats {
        let dt = self.substep_dt();
        let mut stats = StepStats::default();

        for _ in 0..self.config.substep_count {
            self.apply_gravity();
            self.resolve_collisions(dt, &mut stats);
            self.apply_boundary(dt, &mut stats);
            self.integrate_and_repair_grid(dt, &mut stats);
            stats.substeps += 1;
        }

        self.frame += 1;
        self.last_stats = stats;
        log::debug!(
            "Frame {}: {} particles, {} checks, {} collisions, {} degenerate, {} wall hits",
            self.frame,
            self.particles.len(),
            stats.pair_checks,
            stats.collisions,
            stats.degenerate,
            stats.boundary_hits
        );
        stats
    }

    fn apply_gravity(&mut self) {
        let gravity = self.config.gravity;
        for particle in &mut self.particles {
            particle.accelerate(gravity);
        }
    }

    fn resolve_collisions(&mut self, dt: f32, stats: &mut StepStats) {
        let Self {
            grid,
            particles,
            config,
            ..
        } = self;
        let restitution = config.restitution;

        for (cell, neighbor) in grid.neighbor_pairs() {
            let ids = grid.cell(cell);
            if cell == neighbor {
                for (i, &a) in ids.iter().enumerate() {
                    for &b in &ids[i + 1..] {
                        collide(particles, a, b, restitution, dt, stats);
                    }
                }
            } else {
                let others = grid.cell(neighbor);
                for &a in ids {
                    for &b in others {
                        collide(particles, a, b, restitution, dt, stats);
                    }
                }
            }
        }
    }

    fn apply_boundary(&mut self, dt: f32, stats: &mut StepStats) {
        let world = self.config.world;
        let damping = match world {
            Boundary::Rect { .. } => self.config.damping,
            Boundary::Circle { .. } => self.config.circle_damping,
        };
        for particle in &mut self.particles {
            stats.boundary_hits += u64::from(world.constrain(particle, damping, dt));
        }
    }

    fn integrate_and_repair_grid(&mut self, dt: f32, stats: &mut StepStats) {
        let cell_size = self.config.cell_size;
        let incremental = self.config.grid_repair == GridRepair::Incremental;

        for particle in &mut self.particles {
            let old_cell = particle.grid_cell();
            if particle.integrate(dt, cell_size) {
                stats.velocity_clamps += 1;
            }
            let new_cell = particle.grid_cell();
            if new_cell != old_cell {
                stats.relocations += 1;
                if incremental {
                    self.grid.relocate(particle.id(), old_cell, new_cell);
                }
            }
        }

        if !incremental {
            self.grid.rebuild(&self.particles);
        }
    }

    /// Check that every particle sits in exactly its recorded cell
    pub fn verify_grid(&self) -> Result<(), SolverError> {
        let found = self.grid.entry_count();
        if found != self.particles.len() {
            return Err(SolverError::GridMismatch {
                expected: self.particles.len(),
                found,
            });
        }
        for p in &self.particles {
            if !p.position().is_finite() {
                return Err(SolverError::NonFiniteState(p.id()));
            }
            let expected: GridCell = self.grid.cell_of(p.position());
            if p.grid_cell() != expected || !self.grid.contains(p.id(), expected) {
                return Err(SolverError::MisplacedParticle(p.id()));
            }
        }
        Ok(())
    }
}

/// Resolve one candidate pair and record the outcome
fn collide(
    particles: &mut [Particle],
    a: ParticleId,
    b: ParticleId,
    restitution: f32,
    dt: f32,
    stats: &mut StepStats,
) {
    if a == b {
        return;
    }
    let Some((pa, pb)) = pair_mut(particles, a.index(), b.index()) else {
        return;
    };

    stats.pair_checks += 1;
    match resolve_pair(pa, pb, restitution, dt) {
        Ok(PairOutcome::Apart) => {}
        Ok(PairOutcome::Separating) => stats.separating += 1,
        Ok(PairOutcome::Resolved { .. }) => stats.collisions += 1,
        Err(err) => {
            log::trace!("Skipped pair: {err}");
            stats.degenerate += 1;
        }
    }
}

/// Two distinct mutable elements
fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> Option<(&mut T, &mut T)> {
    if i == j || i.max(j) >= items.len() {
        return None;
    }
    if i < j {
        let (head, tail) = items.split_at_mut(j);
        Some((&mut head[i], &mut tail[0]))
    } else {
        let (head, tail) = items.split_at_mut(i);
        Some((&mut tail[0], &mut head[j]))
    }
}
