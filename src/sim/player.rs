//! Player ship and the defended planet
//!
//! The ship orbits the planet and fires with stats resolved from owned
//! items. Planet and ship share one hp pool.

use std::sync::Arc;

use glam::Vec2;

use crate::catalog::{BulletSpec, ItemEffect, StatKind, TriggerAction};
use crate::{heading, normalize_angle, polar_to_cartesian};

use super::state::{DamageTarget, GameEvent, GamePhase, Owner, Projectile, SimulationState, palette};
use super::stats::active_effects;
use super::tick::TickInput;

/// Fan angle per extra projectile when the bullet has no spread of its own
const EXTRA_SHOT_FAN: f32 = 0.12;

/// Fan angle for `on_shot_spawn` side projectiles
const SIDE_SHOT_FAN: f32 = 0.3;

/// Item-derived modifiers applied to every player projectile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotModifiers {
    pub damage_scale: f32,
    pub speed_scale: f32,
    pub pierce: u32,
    pub bounce: u32,
    pub chain: u32,
    pub aoe: f32,
}

impl ShotModifiers {
    pub fn resolve(state: &SimulationState) -> Self {
        let base_damage = state.player.base.damage;
        let damage_scale = if base_damage > 0.0 {
            state.stat(StatKind::Damage) / base_damage
        } else {
            1.0
        };
        let count = |stat: StatKind| state.stat(stat).max(0.0).round() as u32;
        Self {
            damage_scale: damage_scale.max(0.0),
            speed_scale: state.stat(StatKind::ProjectileSpeed).max(0.0),
            pierce: count(StatKind::Pierce),
            bounce: count(StatKind::Bounce),
            chain: count(StatKind::Chain),
            aoe: state.stat(StatKind::Aoe).max(0.0),
        }
    }
}

/// A player-owned projectile from `bullet`, flying along `dir`
pub fn player_projectile(
    state: &mut SimulationState,
    bullet: &BulletSpec,
    origin: Vec2,
    dir: Vec2,
    mods: &ShotModifiers,
) -> Projectile {
    let id = state.next_entity_id();
    let vel = dir.normalize_or_zero() * bullet.speed * mods.speed_scale;
    let mut projectile = Projectile::from_bullet(id, bullet, Owner::Player, origin, vel, bullet.damage * mods.damage_scale);
    projectile.pierce += mods.pierce;
    projectile.bounce += mods.bounce;
    projectile.chain += mods.chain;
    projectile.aoe_radius += mods.aoe;
    projectile
}

/// Advance the ship: orbit, timers, block, aim and fire
pub fn update_player(state: &mut SimulationState, input: &TickInput, dt: f32) {
    let tuning = &state.tuning;
    let player = &mut state.player;

    let rotate = input.rotate.clamp(-1.0, 1.0);
    player.orbit_angle = normalize_angle(player.orbit_angle + rotate * tuning.orbit_speed * dt);

    player.invulnerable = (player.invulnerable - dt).max(0.0);
    player.block_window = (player.block_window - dt).max(0.0);
    player.block_cooldown = (player.block_cooldown - dt).max(0.0);
    player.fire_cooldown = (player.fire_cooldown - dt).max(0.0);

    if input.block && player.block_cooldown <= 0.0 {
        player.block_window = tuning.block_window;
        player.block_cooldown = tuning.block_cooldown;
    }

    let can_fire = matches!(state.phase, GamePhase::Spawning | GamePhase::Reward);
    if input.fire && can_fire && state.player.fire_cooldown <= 0.0 {
        let aim = input
            .aim
            .filter(|dir| dir.length_squared() > 1e-6)
            .or_else(|| auto_aim(state))
            .unwrap_or_else(|| state.player.pos());
        fire(state, heading(aim));
    }
}

/// Direction to the nearest enemy the ship can see past the planet
pub fn auto_aim(state: &SimulationState) -> Option<Vec2> {
    let from = state.player.pos();
    let planet = state.tuning.planet_radius;
    state
        .enemies
        .iter()
        .filter(|e| e.alive && segment_clears_circle(from, e.pos, Vec2::ZERO, planet))
        .min_by(|a, b| {
            a.pos
                .distance_squared(from)
                .partial_cmp(&b.pos.distance_squared(from))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|e| e.pos - from)
}

/// True when segment `a`-`b` stays outside the circle
pub fn segment_clears_circle(a: Vec2, b: Vec2, center: Vec2, radius: f32) -> bool {
    let ab = b - a;
    let len_sq = ab.length_squared();
    let t = if len_sq > 0.0 {
        ((center - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (a + ab * t).distance(center) > radius
}

fn fire(state: &mut SimulationState, aim: f32) {
    let catalog = Arc::clone(&state.catalog);
    let bullet_id = state.player_bullet_id();
    let fire_rate = state.stat(StatKind::FireRate);

    let Some(bullet) = catalog.bullet(&bullet_id) else {
        log::warn!("Unknown player bullet '{}'", bullet_id);
        state.player.fire_cooldown = 1.0 / fire_rate.max(0.01);
        return;
    };
    state.player.fire_cooldown = 1.0 / (fire_rate * bullet.fire_rate).max(0.01);

    let mods = ShotModifiers::resolve(state);
    let extra = state.stat(StatKind::ProjectilesPerShot).max(0.0).round() as u32;
    let (count, fan) = match bullet.spread {
        Some(spread) => (spread.count.max(1) + extra, spread.angle),
        None => (1 + extra, EXTRA_SHOT_FAN * extra as f32),
    };
    let origin = state.player.pos();
    volley(state, bullet, origin, aim, count, fan, &mods);

    state.player.aim_angle = aim;
    state.player.shots_fired += 1;
    let shots = state.player.shots_fired;

    let mut side_shots = Vec::new();
    let mut triggers = Vec::new();
    for (effect, stacks) in active_effects(&state.items, &catalog) {
        match effect {
            ItemEffect::OnShotSpawn { bullet, count } => side_shots.push((bullet.as_str(), count * stacks)),
            ItemEffect::OnShotCount { every, action } if *every > 0 && shots % *every as u64 == 0 => {
                triggers.push((action.clone(), stacks));
            }
            _ => {}
        }
    }
    for (side_id, count) in side_shots {
        match catalog.bullet(side_id) {
            Some(side) => volley(state, side, origin, aim, count, SIDE_SHOT_FAN, &mods),
            None => log::warn!("Unknown on-shot bullet '{}' skipped", side_id),
        }
    }
    for (action, stacks) in triggers {
        run_trigger(state, &action, stacks);
    }
}

/// Fire `count` projectiles fanned evenly over `fan` radians around `aim`
fn volley(
    state: &mut SimulationState,
    bullet: &BulletSpec,
    origin: Vec2,
    aim: f32,
    count: u32,
    fan: f32,
    mods: &ShotModifiers,
) {
    for k in 0..count {
        let offset = if count > 1 {
            (k as f32 / (count - 1) as f32 - 0.5) * fan
        } else {
            0.0
        };
        let projectile = player_projectile(state, bullet, origin, polar_to_cartesian(1.0, aim + offset), mods);
        state.projectiles.push(projectile);
    }
}

/// Execute an item trigger action, scaled by stacks
pub fn run_trigger(state: &mut SimulationState, action: &TriggerAction, stacks: u32) {
    let stacks = stacks.max(1);
    match action {
        TriggerAction::SpawnBullets { bullet, count } => {
            let catalog = Arc::clone(&state.catalog);
            let Some(spec) = catalog.bullet(bullet) else {
                log::warn!("Unknown trigger bullet '{}' skipped", bullet);
                return;
            };
            let mods = ShotModifiers::resolve(state);
            let origin = state.player.pos();
            let total = (count * stacks).max(1);
            for k in 0..total {
                let angle = k as f32 / total as f32 * std::f32::consts::TAU;
                let projectile = player_projectile(state, spec, origin, polar_to_cartesian(1.0, angle), &mods);
                state.projectiles.push(projectile);
            }
        }
        TriggerAction::Heal { amount } => heal(state, amount * stacks as f32),
        TriggerAction::GainCurrency { amount } => {
            state.progress.currency = state.progress.currency.saturating_add(amount * stacks);
        }
        TriggerAction::Unknown => {}
    }
}

pub fn heal(state: &mut SimulationState, amount: f32) {
    let player = &mut state.player;
    player.hp = (player.hp + amount.max(0.0)).min(player.max_hp);
}

/// Apply incoming damage. Returns true if any hp was lost.
pub fn damage_player(state: &mut SimulationState, amount: f32, target: DamageTarget) -> bool {
    if state.phase == GamePhase::GameOver || amount <= 0.0 {
        return false;
    }
    if state.player.is_blocking() {
        state.events.push(GameEvent::Blocked);
        let pos = state.player.pos();
        state.emit_burst(pos, palette::BLOCK, 4, 60.0);
        return false;
    }
    if target == DamageTarget::Orbiter && state.player.invulnerable > 0.0 {
        return false;
    }

    let reduction = state
        .stat(StatKind::DamageReduction)
        .clamp(0.0, state.tuning.max_damage_reduction);
    let dealt = amount * (1.0 - reduction);

    let player = &mut state.player;
    player.hp = (player.hp - dealt).max(0.0);
    if target == DamageTarget::Orbiter {
        player.invulnerable = state.tuning.player_invulnerability;
    }
    let dead = player.hp <= 0.0;

    state.events.push(GameEvent::PlayerDamaged { target, amount: dealt });
    state.add_shake(0.2);

    if dead {
        state.phase = GamePhase::GameOver;
        let score = state.progress.score;
        log::info!("Game over on round {} with score {}", state.round.round, score);
        state.events.push(GameEvent::GameOver { score });
    }
    true
}
