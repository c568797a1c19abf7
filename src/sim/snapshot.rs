//! Read-only render snapshot
//!
//! Everything a renderer or HUD needs for one frame, detached from the
//! simulation and serializable for the web host.

use glam::Vec2;
use serde::Serialize;

use crate::catalog::BulletShape;

use super::state::{GamePhase, OwnedItem, Owner, Particle, RewardOffer, SimulationState};

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub orbit_angle: f32,
    pub aim_angle: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub blocking: bool,
    pub invulnerable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnemyView {
    pub id: u32,
    pub spec_id: String,
    pub pos: Vec2,
    pub facing: f32,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// Active status effect ids
    pub effects: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectileView {
    pub id: u32,
    pub bullet_id: String,
    pub hostile: bool,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub lifetime: f32,
    pub shape: BulletShape,
}

#[derive(Debug, Clone, Serialize)]
pub struct Hud {
    pub round: u32,
    pub round_timer: f32,
    pub score: u64,
    pub combo: f32,
    pub currency: u32,
    pub kills: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub time: f32,
    pub phase: GamePhase,
    pub paused: bool,
    pub screen_shake: f32,
    pub hud: Hud,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub particles: Vec<Particle>,
    pub offers: Vec<RewardOffer>,
    pub items: Vec<OwnedItem>,
}

impl Snapshot {
    pub fn capture(state: &SimulationState) -> Self {
        let player = &state.player;
        Self {
            time: state.time,
            phase: state.phase,
            paused: state.paused,
            screen_shake: state.screen_shake,
            hud: Hud {
                round: state.round.round,
                round_timer: state.round.timer.max(0.0),
                score: state.progress.score,
                combo: state.progress.combo,
                currency: state.progress.currency,
                kills: state.progress.total_kills,
            },
            player: PlayerView {
                pos: player.pos(),
                orbit_angle: player.orbit_angle,
                aim_angle: player.aim_angle,
                hp: player.hp,
                max_hp: player.max_hp,
                blocking: player.is_blocking(),
                invulnerable: player.invulnerable > 0.0,
            },
            enemies: state
                .enemies
                .iter()
                .filter(|e| e.alive)
                .map(|e| EnemyView {
                    id: e.id,
                    spec_id: e.spec_id.clone(),
                    pos: e.pos,
                    facing: e.facing,
                    radius: e.radius,
                    hp: e.hp,
                    max_hp: e.max_hp,
                    effects: e.effects.keys().cloned().collect(),
                })
                .collect(),
            projectiles: state
                .projectiles
                .iter()
                .map(|p| ProjectileView {
                    id: p.id,
                    bullet_id: p.bullet_id.clone(),
                    hostile: p.owner == Owner::Hostile,
                    pos: p.pos,
                    vel: p.vel,
                    radius: p.radius,
                    lifetime: p.lifetime,
                    shape: p.shape,
                })
                .collect(),
            particles: state.particles.clone(),
            offers: state.offers.clone(),
            items: state.items.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
