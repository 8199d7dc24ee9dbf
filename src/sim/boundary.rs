//! World containment
//!
//! Two shapes: the default axis-aligned box with its corner at the origin,
//! and a circular arena.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::particle::Particle;

/// Region particles are kept inside
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Boundary {
    /// `[0, width] x [0, height]`
    Rect { width: f32, height: f32 },
    /// Disc around `center`
    Circle { center: Vec2, radius: f32 },
}

impl Default for Boundary {
    fn default() -> Self {
        Boundary::Rect {
            width: crate::consts::WORLD_SIZE,
            height: crate::consts::WORLD_SIZE,
        }
    }
}

impl Boundary {
    /// Keep `particle` inside, bouncing it with `damping`.
    ///
    /// Returns the number of walls hit.
    pub fn constrain(&self, particle: &mut Particle, damping: f32, dt: f32) -> u32 {
        match *self {
            Boundary::Rect { width, height } => {
                constrain_rect(particle, Vec2::new(width, height), damping, dt)
            }
            Boundary::Circle { center, radius } => {
                constrain_circle(particle, center, radius, damping, dt)
            }
        }
    }

    /// Whether a body of `radius` at `position` is fully inside
    pub fn contains(&self, position: Vec2, radius: f32) -> bool {
        match *self {
            Boundary::Rect { width, height } => {
                position.x >= radius
                    && position.x <= width - radius
                    && position.y >= radius
                    && position.y <= height - radius
            }
            Boundary::Circle { center, radius: rim } => {
                position.distance(center) <= rim - radius
            }
        }
    }
}

/// Per axis: clamp, invert and damp the normal component, damp the
/// tangential one as well.
fn constrain_rect(particle: &mut Particle, extent: Vec2, damping: f32, dt: f32) -> u32 {
    let r = particle.radius();
    let mut hits = 0;

    let pos = particle.position();
    if pos.x < r || pos.x + r > extent.x {
        let v = particle.velocity(dt);
        particle.translate_to(Vec2::new(clamp_axis(pos.x, r, extent.x), pos.y));
        particle.set_velocity(Vec2::new(-v.x * damping, v.y * damping), dt);
        hits += 1;
    }

    let pos = particle.position();
    if pos.y < r || pos.y + r > extent.y {
        let v = particle.velocity(dt);
        particle.translate_to(Vec2::new(pos.x, clamp_axis(pos.y, r, extent.y)));
        particle.set_velocity(Vec2::new(v.x * damping, -v.y * damping), dt);
        hits += 1;
    }

    hits
}

/// A body wider than the box sits in the middle.
#[inline]
fn clamp_axis(value: f32, radius: f32, extent: f32) -> f32 {
    if 2.0 * radius >= extent {
        extent * 0.5
    } else {
        value.clamp(radius, extent - radius)
    }
}

fn constrain_circle(
    particle: &mut Particle,
    center: Vec2,
    rim: f32,
    damping: f32,
    dt: f32,
) -> u32 {
    let limit = (rim - particle.radius()).max(0.0);
    let offset = particle.position() - center;
    let dist = offset.length();
    if dist <= limit {
        return 0;
    }

    // Inward normal; a body exactly at the center cannot be outside
    let normal = -offset / dist;
    let v = particle.velocity(dt);
    particle.translate_to(center - normal * limit);

    let vn = v.dot(normal);
    let reflected = if vn < 0.0 {
        v - (1.0 + damping) * vn * normal
    } else {
        v
    };
    particle.set_velocity(reflected, dt);
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::particle::{MotionLimits, ParticleId};

    const DT: f32 = 1.0 / 480.0;

    fn body(x: f32, y: f32, radius: f32) -> Particle {
        Particle::new(
            ParticleId(0),
            Vec2::new(x, y),
            radius,
            1.0,
            12.0,
            MotionLimits {
                max_velocity: 1.0e6,
                max_acceleration: 1.0e6,
            },
        )
    }

    fn rect() -> Boundary {
        Boundary::Rect {
            width: 100.0,
            height: 50.0,
        }
    }

    #[test]
    fn test_inside_is_untouched() {
        let mut p = body(50.0, 25.0, 2.0);
        p.set_velocity(Vec2::new(30.0, -30.0), DT);
        let before = p.previous_position();
        assert_eq!(rect().constrain(&mut p, 0.75, DT), 0);
        assert_eq!(p.previous_position(), before);
    }

    #[test]
    fn test_right_wall_bounce_damps_both_components() {
        let mut p = body(99.0, 25.0, 2.0);
        p.set_velocity(Vec2::new(40.0, 8.0), DT);
        assert_eq!(rect().constrain(&mut p, 0.75, DT), 1);

        assert!((p.position().x - 98.0).abs() < 1e-4);
        let v = p.velocity(DT);
        assert!((v.x - -30.0).abs() < 0.05, "vx = {}", v.x);
        assert!((v.y - 6.0).abs() < 0.05, "vy = {}", v.y);
    }

    #[test]
    fn test_corner_hits_both_axes() {
        let mut p = body(-1.0, 60.0, 2.0);
        p.set_velocity(Vec2::new(-10.0, 20.0), DT);
        assert_eq!(rect().constrain(&mut p, 0.5, DT), 2);
        assert!(rect().contains(p.position(), 2.0));
        let v = p.velocity(DT);
        // x: inverted then damped on the y pass as tangential
        assert!((v.x - 2.5).abs() < 0.05, "vx = {}", v.x);
        assert!((v.y - -5.0).abs() < 0.05, "vy = {}", v.y);
    }

    #[test]
    fn test_circle_reflects_inward() {
        let arena = Boundary::Circle {
            center: Vec2::new(0.0, 0.0),
            radius: 10.0,
        };
        let mut p = body(9.5, 0.0, 1.0);
        p.set_velocity(Vec2::new(10.0, 3.0), DT);
        assert_eq!(arena.constrain(&mut p, 0.5, DT), 1);

        assert!((p.position().x - 9.0).abs() < 1e-4);
        let v = p.velocity(DT);
        assert!((v.x - -5.0).abs() < 0.05, "vx = {}", v.x);
        assert!((v.y - 3.0).abs() < 0.05, "vy = {}", v.y);
    }

    #[test]
    fn test_contains() {
        assert!(rect().contains(Vec2::new(2.0, 2.0), 2.0));
        assert!(!rect().contains(Vec2::new(1.0, 2.0), 2.0));
    }
}
