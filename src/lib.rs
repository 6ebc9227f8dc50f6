//! Maze-chase simulation core.
//!
//! A perfect maze is carved by depth-first backtracking, agents are routed
//! through it with BFS or DFS, and a frame-driven [`Match`] moves them until
//! one reaches the goal or a hunter catches its quarry. The core reads no
//! clock and does no I/O; callers hand in the elapsed time for every tick.

pub mod agent;
pub mod config;
pub mod error;
pub mod game;
pub mod intercept;
pub mod maze;
pub mod pathfinding;

pub use agent::{Agent, Role};
pub use config::{create_match, MatchConfig};
pub use error::{Error, Result};
pub use game::{AgentSnapshot, Match, MatchSnapshot, MatchState, Outcome, WinKind};
pub use intercept::{compute_intercept_cell, LEAD_FRACTION};
pub use maze::{CellPos, Direction, MazeGrid};
pub use pathfinding::{Path, PathFinder, Strategy};
