//! Lead targeting for hunters.
//!
//! The prediction is one-shot: it reads the quarry's planned route when
//! paths are assigned and is never refreshed as the quarry actually moves.

use crate::agent::Agent;
use crate::maze::CellPos;

/// Share of the quarry's route a hunter aims ahead, at equal speed.
pub const LEAD_FRACTION: f64 = 0.35;

/// Cell along `target`'s planned path where a hunter moving at
/// `hunter_speed` should aim.
pub fn compute_intercept_cell(hunter_speed: f32, target: &Agent) -> CellPos {
    let path = target.path();
    if path.is_empty() {
        return target.cell();
    }

    let speed_ratio = if target.speed > 0.0 {
        f64::from(hunter_speed) / f64::from(target.speed)
    } else {
        f64::INFINITY
    };

    let last = path.len() - 1;
    let lead = (path.len() as f64 * LEAD_FRACTION * speed_ratio).floor();
    let index = if lead.is_nan() || lead <= 0.0 {
        0
    } else if lead >= last as f64 {
        last
    } else {
        lead as usize
    };

    path[index]
}
