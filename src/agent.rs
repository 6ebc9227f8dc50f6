use serde::Serialize;

use crate::maze::CellPos;
use crate::pathfinding::{Path, Strategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    /// Races to the goal cell.
    Runner,
    /// Chases the runner with id `quarry`.
    Hunter { quarry: usize },
}

/// A maze walker with a discrete cell and a continuous pixel position.
#[derive(Debug, Clone)]
pub struct Agent {
    pub id: usize,
    pub role: Role,
    pub strategy: Strategy,
    pub speed: f32,
    cell: CellPos,
    x: f32,
    y: f32,
    path: Path,
    path_index: usize,
}

pub fn cell_center(cell: CellPos, cell_size: f32) -> (f32, f32) {
    (
        cell.col as f32 * cell_size + cell_size / 2.0,
        cell.row as f32 * cell_size + cell_size / 2.0,
    )
}

impl Agent {
    /// Places the agent at the centre of `cell`.
    pub fn new(id: usize, role: Role, cell: CellPos, speed: f32, cell_size: f32) -> Self {
        let (x, y) = cell_center(cell, cell_size);
        Self {
            id,
            role,
            strategy: Strategy::Bfs,
            speed,
            cell,
            x,
            y,
            path: Vec::new(),
            path_index: 0,
        }
    }

    pub fn cell(&self) -> CellPos {
        self.cell
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn path(&self) -> &[CellPos] {
        &self.path
    }

    pub fn path_index(&self) -> usize {
        self.path_index
    }

    pub fn is_on_cell(&self, cell: CellPos) -> bool {
        self.cell == cell
    }

    pub fn is_exhausted(&self) -> bool {
        self.path_index >= self.path.len()
    }

    /// Replaces the route and rewinds the cursor. Empty paths are ignored.
    pub fn set_path(&mut self, path: Path) {
        if path.is_empty() {
            return;
        }
        self.path = path;
        self.path_index = 0;
    }

    /// Advances along the path by `speed * cell_size * dt` pixels.
    ///
    /// The discrete cell only changes on the tick the agent lands exactly on
    /// a waypoint centre; it never overshoots.
    pub fn update(&mut self, dt: f32, cell_size: f32) {
        let Some(&target) = self.path.get(self.path_index) else {
            return;
        };

        let (tx, ty) = cell_center(target, cell_size);
        let dx = tx - self.x;
        let dy = ty - self.y;
        let distance = dx.hypot(dy);
        let step = self.speed * cell_size * dt;

        if distance == 0.0 {
            self.path_index += 1;
            return;
        }

        if step >= distance {
            self.x = tx;
            self.y = ty;
            self.cell = target;
            self.path_index += 1;
            return;
        }

        self.x += dx / distance * step;
        self.y += dy / distance * step;
    }

    /// Pixels left to travel: to the current waypoint, then one cell per
    /// waypoint after it.
    pub fn remaining_distance(&self, cell_size: f32) -> f32 {
        let Some(&target) = self.path.get(self.path_index) else {
            return 0.0;
        };
        let (tx, ty) = cell_center(target, cell_size);
        let later = self.path.len() - self.path_index - 1;
        (tx - self.x).hypot(ty - self.y) + later as f32 * cell_size
    }
}
