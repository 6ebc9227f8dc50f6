use thiserror::Error;

use crate::maze::CellPos;

/// Failures that prevent a match from being built.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("cell size must be at least one pixel")]
    InvalidCellSize,

    #[error("maze would have no cells ({rows} rows x {cols} cols)")]
    EmptyMaze { rows: usize, cols: usize },

    #[error("invalid speed settings: base {base}, jitter {jitter}")]
    InvalidSpeed { base: f32, jitter: f32 },

    #[error("{hunters} hunters among {agents} agents leaves nobody to chase the goal")]
    NoRunners { agents: usize, hunters: usize },

    #[error("hunter {hunter} chases agent {quarry}, which is not a runner in this match")]
    UnknownQuarry { hunter: usize, quarry: usize },

    #[error("no path from {from} to {to}; the maze is not fully connected")]
    Unreachable { from: CellPos, to: CellPos },
}

pub type Result<T> = std::result::Result<T, Error>;
