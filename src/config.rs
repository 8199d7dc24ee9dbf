//! Solver and spawner configuration
//!
//! Loaded from JSON; every field is optional and falls back to `consts`.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::Boundary;
use crate::sim::particle::MotionLimits;
use crate::Color;

/// How the grid follows particle motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GridRepair {
    /// Move only particles whose cell changed
    #[default]
    Incremental,
    /// Clear and rebuild after every substep
    Rebuild,
}

impl GridRepair {
    pub fn as_str(&self) -> &'static str {
        match self {
            GridRepair::Incremental => "incremental",
            GridRepair::Rebuild => "rebuild",
        }
    }
}

/// Physical constants of one solver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Containment region
    pub world: Boundary,
    /// Acceleration applied to every particle each substep
    pub gravity: Vec2,
    /// Frame length (seconds)
    pub step_dt: f32,
    /// Substeps per frame
    pub substep_count: u32,
    /// Grid cell edge
    pub cell_size: f32,
    /// Particle-particle restitution (0 = inelastic, 1 = elastic)
    pub restitution: f32,
    /// Wall damping for the rectangular world
    pub damping: f32,
    /// Normal-velocity scale on the circular rim. 1 mirrors the velocity.
    pub circle_damping: f32,
    pub max_velocity: f32,
    pub max_acceleration: f32,
    /// Capacity of the particle collection
    pub max_objects: usize,
    pub default_mass: f32,
    pub default_color: Color,
    pub grid_repair: GridRepair,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            world: Boundary::default(),
            gravity: Vec2::new(0.0, GRAVITY_Y),
            step_dt: STEP_DT,
            substep_count: SUBSTEPS,
            cell_size: CELL_SIZE,
            restitution: RESTITUTION,
            damping: WALL_DAMPING,
            circle_damping: CIRCLE_DAMPING,
            max_velocity: MAX_VELOCITY,
            max_acceleration: MAX_ACCELERATION,
            max_objects: MAX_OBJECTS,
            default_mass: DEFAULT_MASS,
            default_color: DEFAULT_COLOR,
            grid_repair: GridRepair::Incremental,
        }
    }
}

impl SolverConfig {
    /// Length of one substep
    #[inline]
    pub fn substep_dt(&self) -> f32 {
        self.step_dt / self.substep_count as f32
    }

    pub fn limits(&self) -> MotionLimits {
        MotionLimits {
            max_velocity: self.max_velocity,
            max_acceleration: self.max_acceleration,
        }
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded solver config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("step_dt", self.step_dt)?;
        positive("cell_size", self.cell_size)?;
        positive("max_velocity", self.max_velocity)?;
        positive("max_acceleration", self.max_acceleration)?;
        positive("default_mass", self.default_mass)?;
        unit_interval("restitution", self.restitution)?;
        unit_interval("damping", self.damping)?;
        unit_interval("circle_damping", self.circle_damping)?;
        if self.substep_count == 0 {
            return Err(ConfigError::Invalid("substep_count must be at least 1".into()));
        }
        if self.max_objects == 0 {
            return Err(ConfigError::Invalid("max_objects must be at least 1".into()));
        }
        if !self.gravity.is_finite() {
            return Err(ConfigError::Invalid("gravity must be finite".into()));
        }
        match self.world {
            Boundary::Rect { width, height } => {
                positive("world.width", width)?;
                positive("world.height", height)?;
            }
            Boundary::Circle { center, radius } => {
                positive("world.radius", radius)?;
                if !center.is_finite() {
                    return Err(ConfigError::Invalid("world.center must be finite".into()));
                }
            }
        }
        Ok(())
    }
}

fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
    }
}

fn unit_interval(name: &str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be within [0, 1], got {value}")))
    }
}

/// Emitter layout for `Spawner`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpawnerConfig {
    /// Position of the first emitter
    pub origin: Vec2,
    /// Vertical gap between emitters
    pub row_spacing: f32,
    /// Launch speed (units/s)
    pub speed: f32,
    /// Launch direction, normalized on use
    pub direction: Vec2,
    pub radius: f32,
    /// Emitters active on the first frame
    pub initial_emitters: u32,
    pub max_emitters: u32,
    /// Frames between emitter count increases
    pub ramp_frames: u32,
    /// Stop after this many particles exist
    pub limit: usize,
    /// Color RNG seed
    pub seed: u64,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            origin: Vec2::new(4.0, 4.0),
            row_spacing: 8.0,
            speed: 600.0,
            direction: Vec2::new(0.8, 0.6),
            radius: 2.0,
            initial_emitters: 24,
            max_emitters: 24,
            ramp_frames: 50,
            limit: 100,
            seed: 0x5eed,
        }
    }
}

impl SpawnerConfig {
    /// Read a JSON spawner file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded spawner config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        positive("radius", config.radius)?;
        if config.ramp_frames == 0 {
            return Err(ConfigError::Invalid("ramp_frames must be at least 1".into()));
        }
        Ok(config)
    }
}
