//! Sparse uniform grid for neighbor queries
//!
//! Space is cut into square cells of `cell_size`. Each occupied cell keeps an
//! unordered list of the particle ids inside it. Cells are stored in a
//! `BTreeMap` so traversal order is stable and there are no world bounds:
//! a particle that drifts outside the boundary is still indexed.
//!
//! Collision candidates come from a half neighborhood: each occupied cell is
//! paired with itself and the four cells at `NEIGHBOR_OFFSETS` other than
//! `(0, 0)`. The other four of the eight neighbors are reached from the
//! opposite side, so every adjacent pair of cells is visited exactly once.

use std::collections::BTreeMap;
use std::ops::Add;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::particle::{Particle, ParticleId};

/// Integer cell coordinate
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

impl GridCell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance, 1 for the eight surrounding cells
    pub fn chebyshev(self, other: GridCell) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

impl Add<(i32, i32)> for GridCell {
    type Output = GridCell;

    fn add(self, (dx, dy): (i32, i32)) -> GridCell {
        GridCell::new(self.x + dx, self.y + dy)
    }
}

/// Half neighborhood, self included
pub const NEIGHBOR_OFFSETS: [(i32, i32); 5] = [(1, 0), (1, 1), (0, 0), (0, 1), (-1, 1)];

/// Cell containing `position`
#[inline]
pub fn cell_of(position: Vec2, cell_size: f32) -> GridCell {
    let c = (position / cell_size).floor();
    GridCell::new(c.x as i32, c.y as i32)
}

/// Cell -> particle ids
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: BTreeMap<GridCell, Vec<ParticleId>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    pub fn cell_of(&self, position: Vec2) -> GridCell {
        cell_of(position, self.cell_size)
    }

    pub fn insert(&mut self, id: ParticleId, cell: GridCell) {
        self.cells.entry(cell).or_default().push(id);
    }

    /// Erase `id` from `cell`. Returns false if it was not there.
    pub fn remove(&mut self, id: ParticleId, cell: GridCell) -> bool {
        let Some(ids) = self.cells.get_mut(&cell) else {
            return false;
        };
        let Some(slot) = ids.iter().position(|&other| other == id) else {
            return false;
        };
        ids.swap_remove(slot);
        if ids.is_empty() {
            self.cells.remove(&cell);
        }
        true
    }

    /// Move `id` between cells
    pub fn relocate(&mut self, id: ParticleId, from: GridCell, to: GridCell) {
        if from == to {
            return;
        }
        if !self.remove(id, from) {
            log::warn!("particle {} missing from cell {:?} during relocation", id, from);
        }
        self.insert(id, to);
    }

    /// Ids in `cell`, empty if unoccupied
    pub fn cell(&self, cell: GridCell) -> &[ParticleId] {
        self.cells.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Occupied cells in ascending order
    pub fn occupied_cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        self.cells.keys().copied()
    }

    /// Number of occupied cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Clear and reinsert every particle at its recorded cell
    pub fn rebuild(&mut self, particles: &[Particle]) {
        self.cells.clear();
        for p in particles {
            self.insert(p.id(), p.grid_cell());
        }
    }

    pub fn contains(&self, id: ParticleId, cell: GridCell) -> bool {
        self.cell(cell).contains(&id)
    }

    /// Find the cell holding `id` (linear in occupied cells)
    pub fn locate(&self, id: ParticleId) -> Option<GridCell> {
        self.cells
            .iter()
            .find(|(_, ids)| ids.contains(&id))
            .map(|(&cell, _)| cell)
    }

    /// Total ids stored across all cells
    pub fn entry_count(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    /// Every (occupied cell, occupied half-neighbor) pair, self pairs included
    pub fn neighbor_pairs(&self) -> impl Iterator<Item = (GridCell, GridCell)> + '_ {
        self.cells.keys().flat_map(move |&cell| {
            NEIGHBOR_OFFSETS.iter().filter_map(move |&offset| {
                let other = cell + offset;
                self.cells.contains_key(&other).then_some((cell, other))
            })
        })
    }
}
