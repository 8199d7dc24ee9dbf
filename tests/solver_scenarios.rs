//! End-to-end solver behavior

use std::collections::HashMap;

use glam::Vec2;
use verlet_grid::sim::{Boundary, ParticleId};
use verlet_grid::{GridRepair, Solver, SolverConfig, Spawner, SpawnerConfig};

fn zero_gravity(width: f32, height: f32) -> SolverConfig {
    SolverConfig {
        gravity: Vec2::ZERO,
        world: Boundary::Rect { width, height },
        ..Default::default()
    }
}

/// Every particle's id appears once, in the cell under its position
fn assert_grid_invariant(solver: &Solver) {
    let mut seen: HashMap<ParticleId, usize> = HashMap::new();
    for cell in solver.grid().occupied_cells() {
        for &id in solver.grid().cell(cell) {
            *seen.entry(id).or_default() += 1;
            let p = solver.particle(id).expect("grid holds a live id");
            assert_eq!(solver.grid().cell_of(p.position()), cell, "particle {id}");
        }
    }
    assert_eq!(seen.len(), solver.len());
    assert!(seen.values().all(|&n| n == 1));
    solver.verify_grid().unwrap();
}

#[test]
fn test_wall_bounce_scales_normal_speed_by_damping() {
    let mut config = zero_gravity(100.0, 100.0);
    config.substep_count = 1;
    let damping = config.damping;
    let mut solver = Solver::new(config).unwrap();

    // Edge already past the right wall, heading further out
    let id = solver.add_particle(Vec2::new(99.5, 50.0), 1.0).unwrap();
    solver.set_velocity(id, Vec2::new(40.0, 0.0)).unwrap();
    let stats = solver.update();

    assert_eq!(stats.boundary_hits, 1);
    let v = solver.velocity(id).unwrap();
    assert!((v.x - -40.0 * damping).abs() < 0.05, "vx = {}", v.x);
    assert!(v.y.abs() < 1e-3);
    assert!(solver.particle(id).unwrap().position().x <= 99.0);
}

#[test]
fn test_floor_bounce_from_free_fall() {
    let config = SolverConfig {
        world: Boundary::Rect {
            width: 200.0,
            height: 200.0,
        },
        ..Default::default()
    };
    let mut solver = Solver::new(config).unwrap();
    let id = solver.add_particle(Vec2::new(100.0, 100.0), 5.0).unwrap();

    let mut max_y = 0.0f32;
    let mut bounced = false;
    for _ in 0..240 {
        let stats = solver.update();
        let p = solver.particle(id).unwrap();
        max_y = max_y.max(p.position().y);
        bounced |= stats.boundary_hits > 0;
    }
    assert!(bounced);
    // Never sinks more than one substep of travel into the floor
    let slack = solver.config().max_velocity * solver.substep_dt();
    assert!(max_y <= 195.0 + slack, "max_y = {max_y}");
}

#[test]
fn test_two_body_restitution() {
    let r = 5.0;
    let v = 200.0;
    let mut config = zero_gravity(1000.0, 1000.0);
    config.substep_count = 1;
    let e = config.restitution;
    let mut solver = Solver::new(config).unwrap();

    let b = solver.add_particle(Vec2::new(300.0, 300.0), r).unwrap();
    let a = solver.add_particle(Vec2::new(300.0 + 1.5 * r, 300.0), r).unwrap();
    solver.set_velocity(a, Vec2::new(-v, 0.0)).unwrap();

    let stats = solver.update();
    assert_eq!(stats.collisions, 1);

    let va = solver.velocity(a).unwrap();
    let vb = solver.velocity(b).unwrap();
    let expected_a = -v * (1.0 - e) / 2.0;
    let expected_b = -v * (1.0 + e) / 2.0;
    assert!((va.x - expected_a).abs() < 0.5, "va = {va}");
    assert!((vb.x - expected_b).abs() < 0.5, "vb = {vb}");
    assert!(va.y.abs() < 1e-3 && vb.y.abs() < 1e-3);
}

#[test]
fn test_speed_never_exceeds_cap() {
    let config = SolverConfig {
        gravity: Vec2::new(0.0, 2000.0),
        max_velocity: 300.0,
        max_acceleration: 5000.0,
        world: Boundary::Rect {
            width: 100.0,
            height: 1.0e6,
        },
        ..Default::default()
    };
    let cap = config.max_velocity;
    let mut solver = Solver::new(config).unwrap();
    let id = solver.add_particle(Vec2::new(50.0, 10.0), 2.0).unwrap();

    let mut clamps = 0;
    for _ in 0..300 {
        clamps += solver.update().velocity_clamps;
        let speed = solver.velocity(id).unwrap().length();
        assert!(speed <= cap * 1.01, "speed = {speed}");
    }
    assert!(clamps > 0);
    let speed = solver.velocity(id).unwrap().length();
    assert!((speed - cap).abs() < cap * 0.01, "terminal speed = {speed}");
}

#[test]
fn test_adjacent_cells_checked_once_per_pair() {
    let mut config = zero_gravity(1000.0, 1000.0);
    config.substep_count = 1;
    config.cell_size = 12.0;
    let mut solver = Solver::new(config).unwrap();
    // One particle in each cell of a 2x2 block
    for (x, y) in [(6.0, 6.0), (18.0, 6.0), (6.0, 18.0), (18.0, 18.0)] {
        solver
            .add_particle(Vec2::new(x + 120.0, y + 120.0), 1.0)
            .unwrap();
    }
    assert_eq!(solver.grid().len(), 4);
    let stats = solver.update();
    assert_eq!(stats.pair_checks, 6);
    assert_eq!(stats.collisions, 0);
}

#[test]
fn test_crowd_keeps_grid_invariant() {
    for repair in [GridRepair::Incremental, GridRepair::Rebuild] {
        let config = SolverConfig {
            grid_repair: repair,
            max_objects: 300,
            ..Default::default()
        };
        let mut solver = Solver::new(config).unwrap();
        let mut spawner = Spawner::new(SpawnerConfig {
            limit: 300,
            initial_emitters: 6,
            max_emitters: 12,
            ..Default::default()
        });

        for _ in 0..240 {
            spawner.step(&mut solver);
            solver.update();
            assert_grid_invariant(&solver);
        }
        assert_eq!(solver.len(), 300);

        let cap = solver.config().max_velocity * 1.01;
        let dt = solver.substep_dt();
        for p in solver.particles() {
            assert!(p.position().is_finite());
            assert!(p.velocity(dt).length() <= cap);
        }
    }
}

#[test]
fn test_circle_arena_contains_particles() {
    let center = Vec2::new(420.0, 420.0);
    let config = SolverConfig {
        world: Boundary::Circle {
            center,
            radius: 100.0,
        },
        ..Default::default()
    };
    let mut solver = Solver::new(config).unwrap();
    for i in 0..20 {
        let angle = i as f32 * 0.3;
        let pos = center + Vec2::new(angle.cos(), angle.sin()) * 40.0;
        let id = solver.add_particle(pos, 4.0).unwrap();
        solver.set_velocity(id, Vec2::new(-angle.sin(), angle.cos()) * 400.0).unwrap();
    }

    let slack = solver.config().max_velocity * solver.substep_dt();
    for _ in 0..180 {
        solver.update();
        for p in solver.particles() {
            let reach = p.position().distance(center) + p.radius();
            assert!(reach <= 100.0 + slack, "reach = {reach}");
        }
    }
    assert_grid_invariant(&solver);
}

#[test]
fn test_capacity_overflow_leaves_state_intact() {
    let config = SolverConfig {
        max_objects: 10,
        ..Default::default()
    };
    let mut solver = Solver::new(config).unwrap();
    for i in 0..10 {
        solver
            .add_particle(Vec2::new(50.0 + 20.0 * i as f32, 50.0), 3.0)
            .unwrap();
    }
    solver.update();
    let snapshot: Vec<(Vec2, Vec2)> = solver
        .particles()
        .iter()
        .map(|p| (p.position(), p.previous_position()))
        .collect();

    assert!(solver.add_particle(Vec2::new(5.0, 5.0), 3.0).is_err());

    let after: Vec<(Vec2, Vec2)> = solver
        .particles()
        .iter()
        .map(|p| (p.position(), p.previous_position()))
        .collect();
    assert_eq!(snapshot, after);
    assert_grid_invariant(&solver);
}
