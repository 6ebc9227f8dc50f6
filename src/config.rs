//! Match settings and the `create_match` entry point.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use crate::agent::{Agent, Role};
use crate::error::{Error, Result};
use crate::game::Match;
use crate::maze::{CellPos, MazeGrid};

pub const CELL_SIZE: u32 = 20;
pub const CANVAS_WIDTH: u32 = 600;
pub const CANVAS_HEIGHT: u32 = 600;
pub const BASE_SPEED: f32 = 4.0;
pub const SPEED_JITTER: f32 = 0.3;
pub const AGENT_MIN: usize = 1;
pub const AGENT_MAX: usize = 8;
/// Hunters get this multiplier on top of their rolled speed.
pub const HUNTER_SPEED_BONUS: f32 = 1.15;

#[derive(Debug, Clone, PartialEq)]
pub struct MatchConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Pixels per grid cell.
    pub cell_size: u32,
    /// Total agents, hunters included. Clamped to `AGENT_MIN..=AGENT_MAX`.
    pub agent_count: usize,
    pub hunter_count: usize,
    /// Cells per second before jitter.
    pub speed_base: f32,
    /// Each agent runs at `speed_base * (1 + u * speed_jitter)`, `u` uniform in `[0, 1)`.
    pub speed_jitter: f32,
    /// Fixed seed for a reproducible match; drawn at random when unset.
    pub seed: Option<u64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            cell_size: CELL_SIZE,
            agent_count: AGENT_MIN,
            hunter_count: 0,
            speed_base: BASE_SPEED,
            speed_jitter: SPEED_JITTER,
            seed: None,
        }
    }
}

impl MatchConfig {
    pub fn clamped_agent_count(&self) -> usize {
        self.agent_count.clamp(AGENT_MIN, AGENT_MAX)
    }

    /// Rejects settings that cannot produce a playable match.
    pub fn validate(&self) -> Result<()> {
        if self.cell_size == 0 {
            return Err(Error::InvalidCellSize);
        }
        let rows = (self.height / self.cell_size) as usize;
        let cols = (self.width / self.cell_size) as usize;
        if rows == 0 || cols == 0 {
            return Err(Error::EmptyMaze { rows, cols });
        }
        let speed_ok = self.speed_base.is_finite()
            && self.speed_base > 0.0
            && self.speed_jitter.is_finite()
            && self.speed_jitter >= 0.0;
        if !speed_ok {
            return Err(Error::InvalidSpeed {
                base: self.speed_base,
                jitter: self.speed_jitter,
            });
        }
        let agents = self.clamped_agent_count();
        if self.hunter_count >= agents {
            return Err(Error::NoRunners {
                agents,
                hunters: self.hunter_count,
            });
        }
        Ok(())
    }
}

/// Spawn points: the four corners, then the four edge midpoints.
pub fn entrances(maze: &MazeGrid) -> Vec<CellPos> {
    let last_row = maze.rows() - 1;
    let last_col = maze.cols() - 1;
    let mid_row = maze.rows() / 2;
    let mid_col = maze.cols() / 2;
    vec![
        CellPos::new(0, 0),
        CellPos::new(0, last_col),
        CellPos::new(last_row, last_col),
        CellPos::new(last_row, 0),
        CellPos::new(0, mid_col),
        CellPos::new(mid_row, last_col),
        CellPos::new(last_row, mid_col),
        CellPos::new(mid_row, 0),
    ]
}

/// Builds a ready-to-start match: maze, spawns, speeds and paths.
///
/// Everything random is drawn from one ChaCha stream seeded by
/// `config.seed`, so equal seeds give identical matches.
pub fn create_match(config: &MatchConfig) -> Result<Match> {
    if config.agent_count != config.clamped_agent_count() {
        warn!(
            requested = config.agent_count,
            used = config.clamped_agent_count(),
            "agent count out of range, clamping"
        );
    }
    config.validate()?;

    let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let maze = MazeGrid::from_canvas(config.width, config.height, config.cell_size, &mut rng)?;

    let total = config.clamped_agent_count();
    let runners = total - config.hunter_count;
    let cell_size = config.cell_size as f32;

    let mut spawns = entrances(&maze);
    spawns.shuffle(&mut rng);

    let mut agents = Vec::with_capacity(total);
    for (id, &spawn) in spawns.iter().take(total).enumerate() {
        let mut speed = config.speed_base * (1.0 + rng.gen::<f32>() * config.speed_jitter);
        let role = if id < runners {
            Role::Runner
        } else {
            speed *= HUNTER_SPEED_BONUS;
            Role::Hunter {
                quarry: (id - runners) % runners,
            }
        };
        agents.push(Agent::new(id, role, spawn, speed, cell_size));
    }

    debug!(seed, runners, hunters = config.hunter_count, "spawned agents");

    let goal = maze.center();
    Match::new(maze, goal, agents, cell_size, seed, &mut rng)
}
