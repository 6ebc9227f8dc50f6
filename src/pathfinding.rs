//! Breadth-first and depth-first route search over a [`MazeGrid`].

use std::collections::VecDeque;

use rand::Rng;
use serde::Serialize;

use crate::maze::{CellPos, MazeGrid};

pub type Path = Vec<CellPos>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Strategy {
    /// FIFO frontier; fewest cells.
    Bfs,
    /// LIFO frontier; some path, often a wandering one.
    Dfs,
}

impl Strategy {
    pub fn random(rng: &mut impl Rng) -> Self {
        if rng.gen_bool(0.5) {
            Strategy::Bfs
        } else {
            Strategy::Dfs
        }
    }
}

/// Frontier shared by both searches; only the pop end differs.
trait Frontier {
    fn push(&mut self, pos: CellPos);
    fn pop(&mut self) -> Option<CellPos>;
}

impl Frontier for VecDeque<CellPos> {
    fn push(&mut self, pos: CellPos) {
        self.push_back(pos);
    }

    fn pop(&mut self) -> Option<CellPos> {
        self.pop_front()
    }
}

impl Frontier for Vec<CellPos> {
    fn push(&mut self, pos: CellPos) {
        Vec::push(self, pos);
    }

    fn pop(&mut self) -> Option<CellPos> {
        Vec::pop(self)
    }
}

pub struct PathFinder<'a> {
    maze: &'a MazeGrid,
}

impl<'a> PathFinder<'a> {
    pub fn new(maze: &'a MazeGrid) -> Self {
        Self { maze }
    }

    /// Route from `start` to `target`, both inclusive.
    ///
    /// Returns an empty path when either endpoint lies outside the maze. On a
    /// generated maze two in-bounds cells are always connected, so an empty
    /// result for valid endpoints means the lattice itself is broken.
    pub fn find_path(&self, strategy: Strategy, start: CellPos, target: CellPos) -> Path {
        if !self.maze.contains(start) || !self.maze.contains(target) {
            return Vec::new();
        }
        match strategy {
            Strategy::Bfs => self.search(VecDeque::new(), start, target),
            Strategy::Dfs => self.search(Vec::new(), start, target),
        }
    }

    fn search(&self, mut frontier: impl Frontier, start: CellPos, target: CellPos) -> Path {
        let mut visited = vec![false; self.maze.cell_count()];
        let mut parent: Vec<Option<CellPos>> = vec![None; self.maze.cell_count()];

        visited[self.maze.index(start)] = true;
        frontier.push(start);

        while let Some(current) = frontier.pop() {
            if current == target {
                return self.reconstruct(&parent, start, target);
            }
            for next in self.maze.open_neighbors(current) {
                let idx = self.maze.index(next);
                if !visited[idx] {
                    visited[idx] = true;
                    parent[idx] = Some(current);
                    frontier.push(next);
                }
            }
        }

        Vec::new()
    }

    fn reconstruct(&self, parent: &[Option<CellPos>], start: CellPos, target: CellPos) -> Path {
        let mut path = vec![target];
        let mut current = target;
        while current != start {
            match parent[self.maze.index(current)] {
                Some(prev) => {
                    path.push(prev);
                    current = prev;
                }
                None => break,
            }
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::Strategy;
    use crate::maze::Direction;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn connected(maze: &MazeGrid, a: CellPos, b: CellPos) -> bool {
        maze.open_neighbors(a).any(|n| n == b)
    }

    fn all_cells(maze: &MazeGrid) -> Vec<CellPos> {
        (0..maze.rows())
            .flat_map(|row| (0..maze.cols()).map(move |col| CellPos::new(row, col)))
            .collect()
    }

    /// Open 3x3 grid: every internal wall removed, so it has loops.
    fn open_grid() -> MazeGrid {
        let mut grid = MazeGrid::closed(3, 3).unwrap();
        for pos in all_cells(&grid) {
            for dir in [Direction::Right, Direction::Bottom] {
                if let Some(next) = grid.neighbor(pos, dir) {
                    grid.remove_wall_between(pos, next);
                }
            }
        }
        grid
    }

    #[test]
    fn out_of_bounds_endpoints_give_empty_path() {
        let maze = MazeGrid::generate(4, 4, &mut ChaCha8Rng::seed_from_u64(9)).unwrap();
        let finder = PathFinder::new(&maze);
        let inside = CellPos::new(1, 1);
        let outside = CellPos::new(4, 0);
        for strategy in [Strategy::Bfs, Strategy::Dfs] {
            assert!(finder.find_path(strategy, outside, inside).is_empty());
            assert!(finder.find_path(strategy, inside, outside).is_empty());
            assert!(finder
                .find_path(strategy, inside, CellPos::new(0, usize::MAX))
                .is_empty());
        }
    }

    #[test]
    fn start_equals_target_is_single_cell() {
        let maze = MazeGrid::generate(5, 5, &mut ChaCha8Rng::seed_from_u64(2)).unwrap();
        let finder = PathFinder::new(&maze);
        let cell = CellPos::new(3, 2);
        assert_eq!(finder.find_path(Strategy::Bfs, cell, cell), vec![cell]);
        assert_eq!(finder.find_path(Strategy::Dfs, cell, cell), vec![cell]);
    }

    #[test]
    fn walled_off_cell_gives_empty_path() {
        let mut grid = MazeGrid::closed(1, 3).unwrap();
        grid.remove_wall_between(CellPos::new(0, 0), CellPos::new(0, 1));
        let finder = PathFinder::new(&grid);
        assert!(finder
            .find_path(Strategy::Bfs, CellPos::new(0, 0), CellPos::new(0, 2))
            .is_empty());
    }

    #[test]
    fn bfs_beats_dfs_when_loops_exist() {
        let grid = open_grid();
        let finder = PathFinder::new(&grid);
        let start = CellPos::new(0, 0);
        let target = CellPos::new(2, 0);

        let bfs = finder.find_path(Strategy::Bfs, start, target);
        let dfs = finder.find_path(Strategy::Dfs, start, target);

        assert_eq!(
            bfs,
            vec![CellPos::new(0, 0), CellPos::new(1, 0), CellPos::new(2, 0)]
        );
        // The stack pops the last pushed neighbour (right) first and sweeps
        // around the outer ring before reaching the target.
        assert_eq!(
            dfs,
            vec![
                CellPos::new(0, 0),
                CellPos::new(0, 1),
                CellPos::new(0, 2),
                CellPos::new(1, 2),
                CellPos::new(2, 2),
                CellPos::new(2, 1),
                CellPos::new(2, 0),
            ]
        );
    }

    #[test]
    fn seeded_three_by_three_route_is_pinned() {
        let build = || MazeGrid::generate(3, 3, &mut ChaCha8Rng::seed_from_u64(2024)).unwrap();
        let (a, b) = (build(), build());
        assert_eq!(a.wall_masks(), &[11, 13, 3, 12, 5, 2, 13, 5, 6]);
        assert_eq!(a.passage_count(), 8);

        let start = CellPos::new(0, 0);
        let target = CellPos::new(2, 2);
        let route = PathFinder::new(&a).find_path(Strategy::Bfs, start, target);
        assert_eq!(
            route,
            vec![
                CellPos::new(0, 0),
                CellPos::new(1, 0),
                CellPos::new(1, 1),
                CellPos::new(1, 2),
                CellPos::new(2, 2),
            ]
        );
        assert_eq!(route, PathFinder::new(&b).find_path(Strategy::Bfs, start, target));
        for pair in route.windows(2) {
            assert!(connected(&a, pair[0], pair[1]));
        }
    }

    #[test]
    fn seeded_route_can_wind_back() {
        let maze = MazeGrid::generate(3, 3, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        let route =
            PathFinder::new(&maze).find_path(Strategy::Bfs, CellPos::new(0, 0), CellPos::new(2, 2));
        assert_eq!(
            route,
            vec![
                CellPos::new(0, 0),
                CellPos::new(1, 0),
                CellPos::new(2, 0),
                CellPos::new(2, 1),
                CellPos::new(1, 1),
                CellPos::new(1, 2),
                CellPos::new(2, 2),
            ]
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn paths_are_valid_and_bfs_is_minimal(
            rows in 1usize..8,
            cols in 1usize..8,
            seed in any::<u64>(),
        ) {
            let maze = MazeGrid::generate(rows, cols, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
            let finder = PathFinder::new(&maze);
            let cells = all_cells(&maze);

            for &s in &cells {
                for &t in &cells {
                    let bfs = finder.find_path(Strategy::Bfs, s, t);
                    let dfs = finder.find_path(Strategy::Dfs, s, t);

                    prop_assert!(!bfs.is_empty());
                    prop_assert_eq!(bfs[0], s);
                    prop_assert_eq!(*bfs.last().unwrap(), t);
                    for pair in bfs.windows(2) {
                        prop_assert!(connected(&maze, pair[0], pair[1]));
                    }
                    for pair in dfs.windows(2) {
                        prop_assert!(connected(&maze, pair[0], pair[1]));
                    }
                    prop_assert!(bfs.len() <= dfs.len());
                }
            }
        }
    }
}
