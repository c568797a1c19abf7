//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use glam::Vec2;

use super::enemy::update_enemies;
use super::player::update_player;
use super::projectile::update_projectiles;
use super::round::update_round;
use super::state::{GamePhase, SimulationState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Orbit direction, -1 (clockwise) to 1 (counter-clockwise)
    pub rotate: f32,
    /// Manual aim direction; `None` falls back to auto-aim
    pub aim: Option<Vec2>,
    /// Hold to fire
    pub fire: bool,
    /// Open a block window (one-shot)
    pub block: bool,
    /// Pause toggle (one-shot)
    pub pause: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut SimulationState, input: &TickInput, dt: f32) {
    if input.pause && state.phase != GamePhase::GameOver {
        state.paused = !state.paused;
        log::info!("{}", if state.paused { "Paused" } else { "Resumed" });
    }

    // Don't tick if paused or game over
    if state.paused || state.phase == GamePhase::GameOver {
        return;
    }

    state.time_ticks += 1;
    state.time += dt;

    // Decay screen shake
    state.screen_shake *= 0.9;
    if state.screen_shake < 0.01 {
        state.screen_shake = 0.0;
    }

    update_player(state, input, dt);
    update_projectiles(state, dt);
    update_enemies(state, dt);
    update_particles(state, dt);
    update_round(state, dt);
    state.progress.update_combo(&state.tuning, dt);

    state.flush_spawns();
    state.sweep_dead();
}

fn update_particles(state: &mut SimulationState, dt: f32) {
    for particle in state.particles.iter_mut() {
        particle.pos += particle.vel * dt;
        particle.vel *= 0.96;
        particle.life -= dt * 2.0;
        particle.size *= 0.995;
    }
    state.particles.retain(|p| p.life > 0.0);
}
