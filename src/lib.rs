//! Paper Planet - a twin-stick planet defense shooter core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, combat, rounds)
//! - `catalog`: Immutable data tables (bullets, enemies, items, statuses, rounds)
//! - `tuning`: Data-driven game balance
//! - `platform`: Browser/native platform glue
//! - `highscores`: Score sink for finished runs

pub mod catalog;
pub mod highscores;
pub mod platform;
pub mod sim;
pub mod tuning;

pub use catalog::{Catalog, CatalogError};
pub use highscores::{HighScores, ScoreSink};
pub use tuning::Tuning;

use glam::Vec2;

/// Simulation clock constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Largest frame delta accepted before clamping (stall protection)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 12;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}

/// Angle of a direction vector
#[inline]
pub fn heading(dir: Vec2) -> f32 {
    dir.y.atan2(dir.x)
}
