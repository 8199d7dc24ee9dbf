//! Population growth over time
//!
//! A column of emitters at the top-left corner launches particles diagonally
//! each frame until the limit is reached. An emitter is added once the frame
//! count divided by `ramp_frames` reaches the current emitter count, so a
//! column that starts large holds its size until the frame count catches up.
//! Colors come from a seeded RNG so
//! runs are repeatable.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::Color;
use crate::config::SpawnerConfig;
use crate::error::SolverError;
use crate::sim::{ParticleSpec, Solver};

/// Spawn colors
pub const PALETTE: [Color; 6] = [
    [0.0, 1.0, 1.0, 1.0],
    [0.2, 0.6, 1.0, 1.0],
    [0.4, 0.9, 0.5, 1.0],
    [1.0, 0.8, 0.2, 1.0],
    [1.0, 0.4, 0.3, 1.0],
    [0.8, 0.4, 1.0, 1.0],
];

#[derive(Debug, Clone)]
pub struct Spawner {
    config: SpawnerConfig,
    emitters: u32,
    frames: u32,
    total: usize,
    rng: Pcg32,
}

impl Spawner {
    pub fn new(config: SpawnerConfig) -> Self {
        Self {
            emitters: config.initial_emitters.min(config.max_emitters),
            frames: 0,
            total: 0,
            rng: Pcg32::seed_from_u64(config.seed),
            config,
        }
    }

    #[inline]
    pub fn emitters(&self) -> u32 {
        self.emitters
    }

    /// Particles spawned so far
    #[inline]
    pub fn total(&self) -> usize {
        self.total
    }

    /// True once the limit or solver capacity is reached
    pub fn is_done(&self, solver: &Solver) -> bool {
        solver.len() >= self.config.limit.min(solver.capacity())
    }

    /// Spawn one frame's worth of particles. Returns how many were added.
    pub fn step(&mut self, solver: &mut Solver) -> usize {
        if self.is_done(solver) {
            return 0;
        }
        self.frames += 1;

        let room = self.config.limit.min(solver.capacity()) - solver.len();
        let count = (self.emitters as usize).min(room);
        let velocity = self.config.direction.normalize_or_zero() * self.config.speed;

        let mut spawned = 0;
        for i in 0..count {
            let position = self.config.origin + Vec2::new(0.0, i as f32 * self.config.row_spacing);
            let color = PALETTE[self.rng.random_range(0..PALETTE.len())];
            match self.spawn_one(solver, position, velocity, color) {
                Ok(()) => spawned += 1,
                Err(err) => {
                    log::warn!("Spawner stopped: {err}");
                    break;
                }
            }
        }
        self.total += spawned;

        let ramp = self.config.ramp_frames.max(1);
        if self.frames / ramp >= self.emitters && self.emitters < self.config.max_emitters {
            self.emitters += 1;
            log::debug!("Spawner ramped to {} emitters", self.emitters);
        }
        if self.is_done(solver) {
            log::info!("Spawner finished with {} particles", solver.len());
        }
        spawned
    }

    fn spawn_one(
        &mut self,
        solver: &mut Solver,
        position: Vec2,
        velocity: Vec2,
        color: Color,
    ) -> Result<(), SolverError> {
        let id = solver.add_particle_with(ParticleSpec {
            position,
            radius: self.config.radius,
            mass: solver.config().default_mass,
            color,
        })?;
        solver.set_velocity(id, velocity)
    }
}
