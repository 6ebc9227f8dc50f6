use std::io::{self, Stdout, Write};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use maze_chase::config::{AGENT_MAX, AGENT_MIN};
use maze_chase::maze::Direction;
use maze_chase::{
    create_match, CellPos, Match, MatchConfig, MatchState, Outcome, Role, Strategy, WinKind,
};

const CELL_W: usize = 2;
const DEFAULT_RENDER_FPS: u64 = 60;
const HEADLESS_DT: f32 = 1.0 / 60.0;
/// Longest frame delta handed to the simulation; a stalled terminal should
/// not teleport agents across the maze.
const MAX_FRAME_DT: f32 = 0.25;

const PALETTE: [(&str, Color); 8] = [
    ("Red", Color::Red),
    ("Orange", Color::Rgb { r: 255, g: 165, b: 0 }),
    ("Yellow", Color::Yellow),
    ("Green", Color::Green),
    ("Blue", Color::Blue),
    ("Purple", Color::Magenta),
    ("Brown", Color::Rgb { r: 165, g: 42, b: 42 }),
    ("Grey", Color::DarkGrey),
];

/// Mice race through a generated maze to the cheese.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of agents, hunters included.
    #[arg(short, long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(1..=8))]
    players: u8,
    /// How many of the agents are cats hunting a mouse.
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=7))]
    hunters: u8,
    /// Canvas width in pixels.
    #[arg(long, default_value_t = 600)]
    width: u32,
    /// Canvas height in pixels.
    #[arg(long, default_value_t = 400)]
    height: u32,
    /// Pixels per maze cell.
    #[arg(long, default_value_t = maze_chase::config::CELL_SIZE, value_parser = clap::value_parser!(u32).range(1..))]
    cell_size: u32,
    /// Base speed in cells per second.
    #[arg(long, default_value_t = maze_chase::config::BASE_SPEED)]
    speed: f32,
    /// Random speed bonus range, as a fraction of the base speed.
    #[arg(long, default_value_t = maze_chase::config::SPEED_JITTER)]
    jitter: f32,
    /// Seed for the first match; resets always draw a fresh one.
    #[arg(long)]
    seed: Option<u64>,
    /// Simulate this many 1/60 s frames without a terminal and print a JSON report.
    #[arg(long, value_name = "FRAMES")]
    headless: Option<usize>,
}

impl Cli {
    fn config(&self, players: usize, seed: Option<u64>) -> MatchConfig {
        MatchConfig {
            width: self.width,
            height: self.height,
            cell_size: self.cell_size,
            agent_count: players,
            hunter_count: self.hunters as usize,
            speed_base: self.speed,
            speed_jitter: self.jitter,
            seed,
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Wall,
    Empty,
    Trail,
    Goal,
    Runner,
    Hunter,
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

const EMPTY: Cell = Cell {
    glyph: Glyph::Empty,
    color: Color::Reset,
};

struct Renderer {
    last: Vec<Cell>,
    last_hud: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    fn new(width: usize, height: usize) -> Self {
        Self {
            last: vec![EMPTY; width * height],
            last_hud: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }
}

/// Terminal-side view state that outlives a single match.
struct Session {
    game: Match,
    players: usize,
    pending_players: usize,
}

#[derive(Serialize)]
struct HeadlessReport {
    seed: u64,
    frames: usize,
    state: MatchState,
    outcome: Option<Outcome>,
    agents: Vec<AgentReport>,
}

#[derive(Serialize)]
struct AgentReport {
    id: usize,
    role: Role,
    strategy: Strategy,
    speed: f32,
    cell: CellPos,
    path_len: usize,
    path_index: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(frames) = cli.headless {
        return run_headless(&cli, frames);
    }

    let players = cli.players as usize;
    let game = create_match(&cli.config(players, cli.seed)).context("failed to build match")?;
    let mut session = Session {
        game,
        players,
        pending_players: players,
    };

    let mut stdout = io::stdout();
    terminal::enable_raw_mode().context("failed to enable raw mode")?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &cli, &mut session);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn run_headless(cli: &Cli, frames: usize) -> Result<()> {
    let mut game = create_match(&cli.config(cli.players as usize, cli.seed))
        .context("failed to build match")?;
    game.start();

    let mut ran = 0;
    while ran < frames {
        ran += 1;
        if game.update(HEADLESS_DT).is_some() {
            break;
        }
    }

    let report = HeadlessReport {
        seed: game.seed(),
        frames: ran,
        state: game.state(),
        outcome: game.outcome(),
        agents: game
            .agents()
            .iter()
            .map(|a| AgentReport {
                id: a.id,
                role: a.role,
                strategy: a.strategy,
                speed: a.speed,
                cell: a.cell(),
                path_len: a.path().len(),
                path_index: a.path_index(),
            })
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run(stdout: &mut Stdout, cli: &Cli, session: &mut Session) -> Result<()> {
    let (mut grid_w, mut grid_h) = grid_size(&session.game);
    let mut renderer = Renderer::new(grid_w, grid_h);
    let frame_time = Duration::from_micros(1_000_000 / read_fps_setting().max(1));
    let mut last_frame = Instant::now();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Char('s') => {
                        if session.game.start() {
                            last_frame = Instant::now();
                        }
                    }
                    KeyCode::Char('p') => {
                        session.game.stop();
                    }
                    KeyCode::Char('r') => {
                        session.game.stop();
                        let players = session.pending_players;
                        session.game = restart(cli, players)?;
                        last_frame = Instant::now();
                        session.players = players;
                        (grid_w, grid_h) = grid_size(&session.game);
                        renderer = Renderer::new(grid_w, grid_h);
                        stdout.queue(Clear(ClearType::All))?;
                    }
                    KeyCode::Char('+') | KeyCode::Char('=') => {
                        session.pending_players = (session.pending_players + 1).min(AGENT_MAX);
                    }
                    KeyCode::Char('-') => {
                        let floor = AGENT_MIN.max(cli.hunters as usize + 1);
                        session.pending_players =
                            session.pending_players.saturating_sub(1).max(floor);
                    }
                    _ => {}
                }
            }
        }

        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f32().min(MAX_FRAME_DT);
        last_frame = now;
        session.game.update(dt);

        render(stdout, session, &mut renderer, grid_w, grid_h)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

/// Builds a fresh match with a new seed and sets it running.
fn restart(cli: &Cli, players: usize) -> Result<Match> {
    let mut game = create_match(&cli.config(players, None)).context("failed to rebuild match")?;
    game.start();
    Ok(game)
}

fn read_fps_setting() -> u64 {
    std::env::var("MAZE_CHASE_FPS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_RENDER_FPS)
}

/// Character grid: walls and corners on even coordinates, cells on odd ones.
fn grid_size(game: &Match) -> (usize, usize) {
    let maze = game.maze();
    (maze.cols() * 2 + 1, maze.rows() * 2 + 1)
}

/// Terminal columns and rows the board needs, or `None` past what a
/// terminal can address.
fn required_size(grid_w: usize, grid_h: usize) -> Option<(u16, u16)> {
    let cols = u16::try_from(grid_w.checked_mul(CELL_W)?).ok()?;
    let rows = u16::try_from(grid_h.checked_add(3)?).ok()?;
    Some((cols, rows))
}

fn agent_color(id: usize) -> (&'static str, Color) {
    PALETTE[id % PALETTE.len()]
}

fn render(
    stdout: &mut Stdout,
    session: &Session,
    renderer: &mut Renderer,
    grid_w: usize,
    grid_h: usize,
) -> io::Result<()> {
    let game = &session.game;
    stdout.queue(MoveTo(0, 0))?;

    let (term_w, term_h) = terminal::size()?;
    let fits = required_size(grid_w, grid_h).filter(|&(w, h)| term_w >= w && term_h >= h);
    let Some((needed_w, needed_h)) = fits else {
        stdout.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            grid_w.saturating_mul(CELL_W),
            grid_h.saturating_add(3),
            term_w,
            term_h
        );
        stdout.queue(Print(msg))?;
        stdout.flush()?;
        renderer.needs_full = true;
        return Ok(());
    };

    let origin_x = (term_w - needed_w) / 2;
    let origin_y = (term_h - needed_h) / 2 + 1;
    if origin_x != renderer.origin_x || origin_y != renderer.origin_y {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
    }

    let hud = format!(
        "{:?}  Players: {} (next: {})  Seed: {}  [s]tart [p]ause [r]eset [+/-] players [q]uit",
        game.state(),
        session.players,
        session.pending_players,
        game.seed()
    );
    if renderer.needs_full || hud != renderer.last_hud {
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y - 1))?;
        stdout.queue(SetForegroundColor(Color::White))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(Print(&hud))?;
        stdout.queue(ResetColor)?;
        renderer.last_hud = hud;
    }

    let frame = compose(game, grid_w, grid_h);
    for y in 0..grid_h {
        for x in 0..grid_w {
            let idx = y * grid_w + x;
            let cell = frame[idx];
            if renderer.needs_full || cell != renderer.last[idx] {
                renderer.last[idx] = cell;
                draw_cell(stdout, renderer, x, y, cell)?;
            }
        }
    }
    renderer.needs_full = false;

    let status_y = renderer.origin_y + grid_h as u16;
    stdout.queue(MoveTo(renderer.origin_x, status_y))?;
    stdout.queue(Clear(ClearType::CurrentLine))?;
    if let Some(outcome) = game.outcome() {
        let (name, color) = agent_color(outcome.winner);
        let line = match outcome.kind {
            WinKind::ReachedGoal => format!("🏆 {} mouse WINS! (r to play again)", name),
            WinKind::Caught { quarry } => format!(
                "🏆 {} cat caught the {} mouse! (r to play again)",
                name,
                agent_color(quarry).0
            ),
        };
        stdout.queue(SetForegroundColor(color))?;
        stdout.queue(Print(line))?;
        stdout.queue(ResetColor)?;
    }

    stdout.flush()?;
    Ok(())
}

/// Lays out one frame: walls, then trails, then the goal, then agents.
fn compose(game: &Match, grid_w: usize, grid_h: usize) -> Vec<Cell> {
    let maze = game.maze();
    let mut frame = vec![EMPTY; grid_w * grid_h];

    for gy in 0..grid_h {
        for gx in 0..grid_w {
            if is_wall(game, gx, gy) {
                frame[gy * grid_w + gx] = Cell {
                    glyph: Glyph::Wall,
                    color: Color::Blue,
                };
            }
        }
    }

    for agent in game.agents() {
        let color = agent_color(agent.id).1;
        let walked = &agent.path()[..agent.path_index()];
        for (i, &cell) in walked.iter().enumerate() {
            let (gx, gy) = (cell.col * 2 + 1, cell.row * 2 + 1);
            frame[gy * grid_w + gx] = Cell {
                glyph: Glyph::Trail,
                color,
            };
            if let Some(&next) = walked.get(i + 1) {
                let (nx, ny) = (next.col * 2 + 1, next.row * 2 + 1);
                frame[(gy + ny) / 2 * grid_w + (gx + nx) / 2] = Cell {
                    glyph: Glyph::Trail,
                    color,
                };
            }
        }
    }

    let goal = game.goal();
    frame[(goal.row * 2 + 1) * grid_w + goal.col * 2 + 1] = Cell {
        glyph: Glyph::Goal,
        color: Color::Yellow,
    };

    let cell_size = game.cell_size();
    for agent in game.agents() {
        // Half-cell resolution: centres land on odd coordinates and the
        // midpoint between two cells lands on the open passage between them.
        let (x, y) = agent.position();
        let gx = ((2.0 * x / cell_size).round() as usize).min(maze.cols() * 2 - 1);
        let gy = ((2.0 * y / cell_size).round() as usize).min(maze.rows() * 2 - 1);
        let glyph = match agent.role {
            Role::Runner => Glyph::Runner,
            Role::Hunter { .. } => Glyph::Hunter,
        };
        frame[gy * grid_w + gx] = Cell {
            glyph,
            color: agent_color(agent.id).1,
        };
    }

    frame
}

fn is_wall(game: &Match, gx: usize, gy: usize) -> bool {
    let maze = game.maze();
    match (gx % 2, gy % 2) {
        (0, 0) => true,
        (1, 1) => false,
        // Horizontal edge above row gy/2.
        (1, 0) => {
            let (row, col) = (gy / 2, (gx - 1) / 2);
            if row == 0 {
                maze.is_blocked(CellPos::new(0, col), Direction::Top)
            } else {
                maze.is_blocked(CellPos::new(row - 1, col), Direction::Bottom)
            }
        }
        // Vertical edge left of column gx/2.
        _ => {
            let (row, col) = ((gy - 1) / 2, gx / 2);
            if col == 0 {
                maze.is_blocked(CellPos::new(row, 0), Direction::Left)
            } else {
                maze.is_blocked(CellPos::new(row, col - 1), Direction::Right)
            }
        }
    }
}

fn draw_cell(stdout: &mut Stdout, renderer: &Renderer, x: usize, y: usize, cell: Cell) -> io::Result<()> {
    let text = match cell.glyph {
        Glyph::Wall => "██",
        Glyph::Empty => "  ",
        Glyph::Trail => "· ",
        Glyph::Goal => "🧀",
        Glyph::Runner => "● ",
        Glyph::Hunter => "🐱",
    };
    let x_pos = renderer.origin_x + (x * CELL_W) as u16;
    let y_pos = renderer.origin_y + y as u16;
    stdout.queue(MoveTo(x_pos, y_pos))?;
    stdout.queue(SetForegroundColor(cell.color))?;
    stdout.queue(Print(text))?;
    let w = UnicodeWidthStr::width(text);
    if w < CELL_W {
        for _ in 0..(CELL_W - w) {
            stdout.queue(Print(' '))?;
        }
    }
    stdout.queue(ResetColor)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_size_fits_in_terminal_coordinates() {
        assert_eq!(required_size(61, 41), Some((122, 44)));
        assert_eq!(required_size(u16::MAX as usize / 2, 10), Some((u16::MAX - 1, 13)));
        // 100000 px wide at 1 px per cell.
        assert_eq!(required_size(200_001, 41), None);
        assert_eq!(required_size(61, u16::MAX as usize), None);
        assert_eq!(required_size(usize::MAX, 1), None);
    }

    #[test]
    fn reset_starts_the_new_match() {
        let cli = Cli::parse_from(["maze-chase", "--players", "3", "--width", "200", "--height", "200"]);
        let first = restart(&cli, 3).unwrap();
        assert_eq!(first.state(), MatchState::Running);
        assert_eq!(first.agents().len(), 3);

        let next = restart(&cli, 5).unwrap();
        assert_eq!(next.state(), MatchState::Running);
        assert_eq!(next.agents().len(), 5);
    }
}
