//! Maze lattice and perfect-maze generation.
//!
//! Every cell carries a 4-bit wall mask. Passages are only ever opened in
//! matched pairs, so the mask of a cell and the mask of its neighbour always
//! agree about the edge they share.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

pub const WALL_TOP: u8 = 1;
pub const WALL_RIGHT: u8 = 2;
pub const WALL_BOTTOM: u8 = 4;
pub const WALL_LEFT: u8 = 8;
pub const ALL_WALLS: u8 = WALL_TOP | WALL_RIGHT | WALL_BOTTOM | WALL_LEFT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Top,
    Right,
    Bottom,
    Left,
}

impl Direction {
    /// Neighbour scan order shared by generation and path search.
    pub const SCAN_ORDER: [Direction; 4] = [
        Direction::Top,
        Direction::Bottom,
        Direction::Left,
        Direction::Right,
    ];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Top => (-1, 0),
            Direction::Bottom => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Bottom => Direction::Top,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn wall_bit(self) -> u8 {
        match self {
            Direction::Top => WALL_TOP,
            Direction::Right => WALL_RIGHT,
            Direction::Bottom => WALL_BOTTOM,
            Direction::Left => WALL_LEFT,
        }
    }

    /// Direction leading from `from` to the adjacent cell `to`.
    fn between(from: CellPos, to: CellPos) -> Option<Direction> {
        let dr = to.row as isize - from.row as isize;
        let dc = to.col as isize - from.col as isize;
        Direction::SCAN_ORDER
            .into_iter()
            .find(|dir| dir.delta() == (dr, dc))
    }
}

/// A rectangular lattice of cells. Immutable once generation returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeGrid {
    rows: usize,
    cols: usize,
    walls: Vec<u8>,
}

impl MazeGrid {
    /// Carves a perfect maze with randomized depth-first backtracking,
    /// starting from the top-left cell.
    pub fn generate(rows: usize, cols: usize, rng: &mut impl Rng) -> Result<Self> {
        let mut grid = Self::closed(rows, cols)?;
        let mut visited = vec![false; rows * cols];
        let mut stack = vec![CellPos::new(0, 0)];
        visited[0] = true;

        while let Some(&current) = stack.last() {
            let mut candidates = Vec::with_capacity(4);
            for dir in Direction::SCAN_ORDER {
                if let Some(next) = grid.neighbor(current, dir) {
                    if !visited[grid.index(next)] {
                        candidates.push(next);
                    }
                }
            }

            match candidates.choose(rng) {
                Some(&next) => {
                    grid.remove_wall_between(current, next);
                    visited[grid.index(next)] = true;
                    stack.push(next);
                }
                None => {
                    stack.pop();
                }
            }
        }

        debug!(
            rows,
            cols,
            passages = grid.passage_count(),
            "generated maze"
        );
        Ok(grid)
    }

    /// Sizes the lattice from a pixel canvas: `floor(height / cell_size)` rows
    /// by `floor(width / cell_size)` columns.
    pub fn from_canvas(
        width: u32,
        height: u32,
        cell_size: u32,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        if cell_size == 0 {
            return Err(Error::InvalidCellSize);
        }
        let rows = (height / cell_size) as usize;
        let cols = (width / cell_size) as usize;
        Self::generate(rows, cols, rng)
    }

    /// A grid with every wall standing.
    pub(crate) fn closed(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::EmptyMaze { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            walls: vec![ALL_WALLS; rows * cols],
        })
    }

    /// Opens the shared edge between two adjacent cells, clearing both flags.
    pub(crate) fn remove_wall_between(&mut self, a: CellPos, b: CellPos) {
        let Some(dir) = Direction::between(a, b) else {
            return;
        };
        let ia = self.index(a);
        let ib = self.index(b);
        self.walls[ia] &= !dir.wall_bit();
        self.walls[ib] &= !dir.opposite().wall_bit();
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn contains(&self, pos: CellPos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    pub(crate) fn index(&self, pos: CellPos) -> usize {
        pos.row * self.cols + pos.col
    }

    /// Wall flag for one side of a cell. `pos` must be in bounds.
    pub fn is_blocked(&self, pos: CellPos, dir: Direction) -> bool {
        self.walls[self.index(pos)] & dir.wall_bit() != 0
    }

    /// Wall mask for a cell (`WALL_TOP | WALL_RIGHT | ...`). `pos` must be in bounds.
    pub fn walls(&self, pos: CellPos) -> u8 {
        self.walls[self.index(pos)]
    }

    pub fn wall_masks(&self) -> &[u8] {
        &self.walls
    }

    pub fn center(&self) -> CellPos {
        CellPos::new(self.rows / 2, self.cols / 2)
    }

    /// The adjacent cell across `dir`, ignoring walls.
    pub fn neighbor(&self, pos: CellPos, dir: Direction) -> Option<CellPos> {
        let (dr, dc) = dir.delta();
        let row = pos.row.checked_add_signed(dr)?;
        let col = pos.col.checked_add_signed(dc)?;
        let next = CellPos::new(row, col);
        self.contains(next).then_some(next)
    }

    /// Neighbours reachable through an open wall, in scan order.
    pub fn open_neighbors(&self, pos: CellPos) -> impl Iterator<Item = CellPos> + '_ {
        Direction::SCAN_ORDER.into_iter().filter_map(move |dir| {
            if self.is_blocked(pos, dir) {
                None
            } else {
                self.neighbor(pos, dir)
            }
        })
    }

    /// Number of open edges between cells, each counted once.
    pub fn passage_count(&self) -> usize {
        let mut open = 0;
        for row in 0..self.rows {
            for col in 0..self.cols {
                let pos = CellPos::new(row, col);
                if col + 1 < self.cols && !self.is_blocked(pos, Direction::Right) {
                    open += 1;
                }
                if row + 1 < self.rows && !self.is_blocked(pos, Direction::Bottom) {
                    open += 1;
                }
            }
        }
        open
    }
}
