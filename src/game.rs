//! The match state machine: owns the agents and decides who wins.

use rand::Rng;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::agent::{Agent, Role};
use crate::error::{Error, Result};
use crate::intercept::compute_intercept_cell;
use crate::maze::{CellPos, MazeGrid};
use crate::pathfinding::{Path, PathFinder, Strategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchState {
    Running,
    Stopped,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WinKind {
    ReachedGoal,
    Caught { quarry: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub winner: usize,
    pub kind: WinKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentSnapshot {
    pub id: usize,
    pub role: Role,
    pub strategy: Strategy,
    pub x: f32,
    pub y: f32,
    pub cell: CellPos,
    pub path: Path,
    pub path_index: usize,
    pub speed: f32,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct MatchSnapshot {
    pub rows: usize,
    pub cols: usize,
    pub cell_size: f32,
    pub walls: Vec<u8>,
    pub goal: CellPos,
    pub agents: Vec<AgentSnapshot>,
    pub state: MatchState,
    pub outcome: Option<Outcome>,
    pub seed: u64,
}

#[derive(Debug)]
pub struct Match {
    maze: MazeGrid,
    goal: CellPos,
    agents: Vec<Agent>,
    cell_size: f32,
    state: MatchState,
    outcome: Option<Outcome>,
    seed: u64,
}

impl Match {
    /// Assigns every agent its route and returns a stopped match.
    ///
    /// Runners draw BFS or DFS from `rng` in list order and route to the
    /// goal. Hunters then route by BFS to the intercept cell of their quarry.
    /// Routes are never recomputed afterwards. A hunter whose quarry is not
    /// a runner in `agents` is an error.
    pub fn new(
        maze: MazeGrid,
        goal: CellPos,
        mut agents: Vec<Agent>,
        cell_size: f32,
        seed: u64,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        let finder = PathFinder::new(&maze);

        for agent in agents.iter_mut().filter(|a| a.role == Role::Runner) {
            agent.strategy = Strategy::random(rng);
            let path = plan(&finder, agent.strategy, agent.cell(), goal)?;
            debug!(agent = agent.id, strategy = ?agent.strategy, len = path.len(), "runner path");
            agent.set_path(path);
        }

        for i in 0..agents.len() {
            let Role::Hunter { quarry } = agents[i].role else {
                continue;
            };
            let hunter_id = agents[i].id;
            let Some(target) = agents.iter().find(|a| a.id == quarry && a.role == Role::Runner) else {
                error!(hunter = hunter_id, quarry, "hunter has no runner to chase");
                return Err(Error::UnknownQuarry {
                    hunter: hunter_id,
                    quarry,
                });
            };
            let aim = compute_intercept_cell(agents[i].speed, target);
            let hunter = &mut agents[i];
            hunter.strategy = Strategy::Bfs;
            let path = plan(&finder, Strategy::Bfs, hunter.cell(), aim)?;
            debug!(agent = hunter.id, quarry, aim = %aim, len = path.len(), "hunter path");
            hunter.set_path(path);
        }

        Ok(Self {
            maze,
            goal,
            agents,
            cell_size,
            state: MatchState::Stopped,
            outcome: None,
            seed,
        })
    }

    /// Returns `false` when already running or ended.
    pub fn start(&mut self) -> bool {
        if self.state != MatchState::Stopped {
            return false;
        }
        self.state = MatchState::Running;
        info!(seed = self.seed, "match running");
        true
    }

    /// Pauses a running match. Returns `false` otherwise.
    pub fn stop(&mut self) -> bool {
        if self.state != MatchState::Running {
            return false;
        }
        self.state = MatchState::Stopped;
        info!("match stopped");
        true
    }

    /// Moves every agent by `dt` seconds, then checks for a winner.
    ///
    /// Only acts while running. Negative or non-finite `dt` counts as zero.
    /// Returns the outcome on the tick that ends the match.
    pub fn update(&mut self, dt: f32) -> Option<Outcome> {
        if self.state != MatchState::Running {
            return None;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        for agent in &mut self.agents {
            agent.update(dt, self.cell_size);
        }

        let outcome = self.check_win()?;
        self.outcome = Some(outcome);
        self.state = MatchState::Ended;
        info!(winner = outcome.winner, kind = ?outcome.kind, "match ended");
        Some(outcome)
    }

    /// First qualifying agent in list order wins; the rest are not examined.
    fn check_win(&self) -> Option<Outcome> {
        for agent in &self.agents {
            match agent.role {
                Role::Runner if agent.is_on_cell(self.goal) => {
                    return Some(Outcome {
                        winner: agent.id,
                        kind: WinKind::ReachedGoal,
                    });
                }
                Role::Hunter { quarry } => {
                    let caught = self
                        .agent(quarry)
                        .is_some_and(|target| agent.is_on_cell(target.cell()));
                    if caught {
                        return Some(Outcome {
                            winner: agent.id,
                            kind: WinKind::Caught { quarry },
                        });
                    }
                }
                Role::Runner => {}
            }
        }
        None
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn winner(&self) -> Option<&Agent> {
        self.outcome.and_then(|o| self.agent(o.winner))
    }

    pub fn agent(&self, id: usize) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn maze(&self) -> &MazeGrid {
        &self.maze
    }

    pub fn goal(&self) -> CellPos {
        self.goal
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            rows: self.maze.rows(),
            cols: self.maze.cols(),
            cell_size: self.cell_size,
            walls: self.maze.wall_masks().to_vec(),
            goal: self.goal,
            agents: self
                .agents
                .iter()
                .map(|a| {
                    let (x, y) = a.position();
                    AgentSnapshot {
                        id: a.id,
                        role: a.role,
                        strategy: a.strategy,
                        x,
                        y,
                        cell: a.cell(),
                        path: a.path().to_vec(),
                        path_index: a.path_index(),
                        speed: a.speed,
                    }
                })
                .collect(),
            state: self.state,
            outcome: self.outcome,
            seed: self.seed,
        }
    }
}

fn plan(finder: &PathFinder<'_>, strategy: Strategy, from: CellPos, to: CellPos) -> Result<Path> {
    let path = finder.find_path(strategy, from, to);
    if path.is_empty() {
        error!(from = %from, to = %to, "no route between in-bounds cells");
        return Err(Error::Unreachable { from, to });
    }
    Ok(path)
}
