//! Enemy engine
//!
//! Spawning, per-tick behavior/movement, damage resolution and death.
//! Enemies are never removed mid-tick: death clears `alive` and the sweep at
//! the end of the tick compacts the collection. New enemies (spawner,
//! on-death offspring) land in the spawn queue and join the live set then.

use std::sync::Arc;

use glam::Vec2;
use rand::Rng;

use crate::catalog::{ItemEffect, RangedAttack, StatKind, StatusTrigger, TriggerAction};
use crate::{heading, normalize_angle, polar_to_cartesian};

use super::behavior::{self, Attack};
use super::player::{damage_player, run_trigger};
use super::projectile::hostile_projectile;
use super::state::{BehaviorState, DamageTarget, Enemy, GameEvent, SimulationState, palette};
use super::stats::active_effects;
use super::status::{apply_status_effect, damage_taken_multiplier, tick_status_effects};

/// Where a hit came from and what it carries
#[derive(Debug, Clone, Copy)]
pub struct HitContext<'a> {
    /// Point of impact (shield arc test)
    pub impact: Vec2,
    /// Velocity impulse added to the target
    pub knockback: Vec2,
    pub triggers: &'a [StatusTrigger],
    pub can_crit: bool,
    pub projectile_id: Option<u32>,
}

impl<'a> HitContext<'a> {
    /// Plain hit with no extras
    pub fn at(impact: Vec2) -> Self {
        HitContext {
            impact,
            knockback: Vec2::ZERO,
            triggers: &[],
            can_crit: false,
            projectile_id: None,
        }
    }
}

/// Result of a damage application that landed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    pub dealt: f32,
    pub crit: bool,
    pub killed: bool,
}

/// Create an enemy from its spec. Returns `None` (and logs) for unknown ids
/// or when the enemy cap is reached.
pub fn spawn_enemy(state: &mut SimulationState, spec_id: &str, pos: Vec2) -> Option<u32> {
    let Some(spec) = state.catalog.enemy(spec_id) else {
        log::warn!("Unknown enemy '{}' not spawned", spec_id);
        return None;
    };
    if state.live_enemy_count() >= state.tuning.max_enemies {
        log::debug!("Enemy cap reached, dropping spawn of '{}'", spec_id);
        return None;
    }

    let enemy = Enemy {
        id: 0,
        spec_id: spec.id.clone(),
        pos,
        vel: Vec2::ZERO,
        hp: spec.hp,
        max_hp: spec.hp,
        speed: spec.speed,
        contact_damage: spec.contact_damage,
        radius: spec.radius,
        behavior: BehaviorState::for_profile(spec.behavior, spec.param("dash_cooldown", 2.0)),
        effects: Default::default(),
        invulnerable: 0.0,
        facing: heading(-pos),
        last_fired: state.time,
        alive: true,
    };

    let id = state.next_entity_id();
    state.spawn_queue.push(Enemy { id, ..enemy });
    state.events.push(GameEvent::EnemySpawned {
        enemy_id: id,
        spec_id: spec_id.to_string(),
    });
    Some(id)
}

/// Advance every live enemy by one tick
pub fn update_enemies(state: &mut SimulationState, dt: f32) {
    let catalog = Arc::clone(&state.catalog);
    let planet_radius = state.tuning.planet_radius;
    let player_radius = state.tuning.player_radius;
    let steering_rate = state.tuning.enemy_steering;
    let damping = (1.0 - state.tuning.enemy_friction * dt).max(0.0);

    for i in 0..state.enemies.len() {
        if !state.enemies[i].alive {
            continue;
        }
        let Some(spec) = catalog.enemy(&state.enemies[i].spec_id) else {
            continue;
        };

        let enemy = &mut state.enemies[i];
        enemy.invulnerable = (enemy.invulnerable - dt).max(0.0);

        let status = tick_status_effects(enemy, &catalog, dt);
        if status.damage > 0.0 {
            enemy.hp = (enemy.hp - status.damage).max(0.0);
            if enemy.hp <= 0.0 {
                kill_enemy(state, i);
                continue;
            }
        }

        let enemy = &mut state.enemies[i];
        enemy.facing = heading(-enemy.pos);

        if !status.stunned {
            let steer = behavior::steer(enemy, spec, dt);
            let speed = enemy.speed * status.speed_multiplier;
            match steer.velocity_override {
                Some(vel) => enemy.vel = vel * status.speed_multiplier,
                None => enemy.vel += steer.thrust * speed * steering_rate * dt,
            }
            enemy.vel *= damping;
            enemy.pos += enemy.vel * dt;

            if let Some(attack) = steer.attack {
                enemy_attack(state, i, attack, spec.ranged.as_ref());
            }
        }

        // Destructive contact with the planet
        let enemy = &state.enemies[i];
        if enemy.pos.length() <= planet_radius + enemy.radius {
            let (id, pos, contact) = (enemy.id, enemy.pos, enemy.contact_damage);
            state.enemies[i].alive = false;
            state.events.push(GameEvent::EnemyImpact { enemy_id: id });
            state.emit_burst(pos, palette::PLANET, 10, 120.0);
            state.add_shake(0.3);
            damage_player(state, contact, DamageTarget::Planet);
            continue;
        }

        // Contact with the orbiter (enemy survives and is pushed away)
        let player_pos = state.player.pos();
        let enemy = &mut state.enemies[i];
        let offset = enemy.pos - player_pos;
        if offset.length() <= player_radius + enemy.radius {
            let contact = enemy.contact_damage;
            enemy.vel = offset.normalize_or_zero() * enemy.speed.max(60.0);
            damage_player(state, contact, DamageTarget::Orbiter);
        }
    }
}

fn enemy_attack(state: &mut SimulationState, idx: usize, attack: Attack, ranged: Option<&RangedAttack>) {
    let Some(ranged) = ranged else {
        return;
    };
    let enemy = &state.enemies[idx];
    let origin = enemy.pos;
    let target = match attack {
        Attack::AtPlayer => {
            let interval = 1.0 / ranged.fire_rate.max(0.01);
            if state.time - enemy.last_fired < interval {
                return;
            }
            state.player.pos()
        }
        Attack::Bomb => Vec2::ZERO,
    };

    state.enemies[idx].last_fired = state.time;
    let projectile = hostile_projectile(state, ranged, origin, target);
    state.projectiles.push(projectile);
}

/// Apply damage to an enemy.
///
/// Returns `None` when the hit is ignored (dead or briefly invulnerable).
pub fn damage_enemy(
    state: &mut SimulationState,
    idx: usize,
    amount: f32,
    hit: &HitContext<'_>,
) -> Option<DamageOutcome> {
    let catalog = Arc::clone(&state.catalog);
    let enemy = state.enemies.get(idx)?;
    if !enemy.alive || enemy.invulnerable > 0.0 {
        return None;
    }

    let mut damage = amount.max(0.0);

    // Frontal shield
    if let Some(shield) = catalog.enemy(&enemy.spec_id).and_then(|s| s.shield) {
        let to_impact = heading(hit.impact - enemy.pos);
        if normalize_angle(to_impact - enemy.facing).abs() <= shield.arc_width * 0.5 {
            damage *= 1.0 - shield.reduction.clamp(0.0, 1.0);
        }
    }

    let mut crit = false;
    if hit.can_crit {
        let chance = state.stat(StatKind::CritChance);
        if state.rng.random::<f32>() < chance {
            crit = true;
            damage *= state.stat(StatKind::CritMultiplier);
        }
    }

    let enemy = &mut state.enemies[idx];
    damage *= damage_taken_multiplier(enemy, &catalog);

    enemy.hp = (enemy.hp - damage).max(0.0);
    enemy.invulnerable = state.tuning.enemy_hit_invulnerability;
    enemy.vel += hit.knockback;
    let (enemy_id, pos, dead) = (enemy.id, enemy.pos, enemy.hp <= 0.0);

    for trigger in hit.triggers {
        if trigger.chance >= 1.0 || state.rng.random::<f32>() < trigger.chance {
            apply_status_effect(&mut state.enemies[idx], &catalog, &trigger.effect, trigger.stacks);
        }
    }

    state.events.push(GameEvent::EnemyHit {
        enemy_id,
        projectile_id: hit.projectile_id,
        damage,
        crit,
    });
    let color = if crit { palette::CRIT } else { palette::HIT };
    state.emit_burst(pos, color, if crit { 6 } else { 3 }, 90.0);

    if dead {
        kill_enemy(state, idx);
    }
    Some(DamageOutcome {
        dealt: damage,
        crit,
        killed: dead,
    })
}

/// Handle an enemy's death. Safe to call twice; only the first call counts.
pub fn kill_enemy(state: &mut SimulationState, idx: usize) {
    let catalog = Arc::clone(&state.catalog);
    let Some(enemy) = state.enemies.get_mut(idx) else {
        return;
    };
    if !enemy.alive {
        return;
    }
    enemy.alive = false;
    enemy.hp = 0.0;
    let (enemy_id, pos, spec_id) = (enemy.id, enemy.pos, enemy.spec_id.clone());

    let spec = catalog.enemy(&spec_id);
    if let Some(spec) = spec {
        state.progress.score += spec.value;
        state.progress.currency = state.progress.currency.saturating_add(spec.currency);
    }
    state.progress.total_kills += 1;
    state.round.kills += 1;
    state.progress.register_kill(&state.tuning);

    state.events.push(GameEvent::EnemyKilled {
        enemy_id,
        spec_id,
        pos,
    });
    state.emit_burst(pos, palette::DEATH, 12, 140.0);
    state.add_shake(0.15);

    if let Some(on_death) = spec.and_then(|s| s.on_death.as_ref()) {
        let count = on_death.count.max(1);
        for k in 0..count {
            let angle = k as f32 / count as f32 * std::f32::consts::TAU;
            spawn_enemy(state, &on_death.enemy, pos + polar_to_cartesian(14.0, angle));
        }
    }

    let total = state.progress.total_kills;
    let triggers: Vec<(TriggerAction, u32)> = active_effects(&state.items, &catalog)
        .into_iter()
        .filter_map(|(effect, stacks)| match effect {
            ItemEffect::OnKillCount { every, action } if *every > 0 && total % *every as u64 == 0 => {
                Some((action.clone(), stacks))
            }
            _ => None,
        })
        .collect();
    for (action, stacks) in triggers {
        run_trigger(state, &action, stacks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::state::{GamePhase, OwnedItem};
    use crate::sim::test_support::{spawn_now, test_state};

    fn clear_invuln(state: &mut SimulationState, idx: usize) {
        state.enemies[idx].invulnerable = 0.0;
    }

    #[test]
    fn test_hit_then_kill_exactly_once() {
        let mut state = test_state();
        let idx = spawn_now(&mut state, "dummy", Vec2::new(300.0, 0.0));
        let id = state.enemies[idx].id;

        let out = damage_enemy(&mut state, idx, 20.0, &HitContext::at(Vec2::new(290.0, 0.0))).unwrap();
        assert!(!out.killed);
        assert_eq!(state.enemies[idx].hp, 30.0);
        assert!(state.enemies[idx].alive);

        clear_invuln(&mut state, idx);
        let out = damage_enemy(&mut state, idx, 35.0, &HitContext::at(Vec2::new(290.0, 0.0))).unwrap();
        assert!(out.killed);
        assert_eq!(state.enemies[idx].hp, 0.0);

        // A second kill attempt is a no-op
        kill_enemy(&mut state, idx);
        let kills = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemyKilled { .. }))
            .count();
        assert_eq!(kills, 1);
        assert_eq!(state.progress.total_kills, 1);
        assert_eq!(state.progress.score, 10);
        assert_eq!(state.progress.currency, 1);

        state.sweep_dead();
        assert!(state.enemy_index(id).is_none());
    }

    #[test]
    fn test_invulnerability_blocks_double_hit() {
        let mut state = test_state();
        let idx = spawn_now(&mut state, "dummy", Vec2::new(300.0, 0.0));
        assert!(damage_enemy(&mut state, idx, 5.0, &HitContext::at(Vec2::ZERO)).is_some());
        assert!(damage_enemy(&mut state, idx, 5.0, &HitContext::at(Vec2::ZERO)).is_none());
        assert_eq!(state.enemies[idx].hp, 45.0);
    }

    #[test]
    fn test_shield_reduces_frontal_hits_only() {
        let mut state = test_state();
        let idx = spawn_now(&mut state, "turtle", Vec2::new(300.0, 0.0));
        // Facing the planet (toward -x)
        damage_enemy(&mut state, idx, 20.0, &HitContext::at(Vec2::new(290.0, 0.0)));
        assert_eq!(state.enemies[idx].hp, 90.0);

        clear_invuln(&mut state, idx);
        damage_enemy(&mut state, idx, 20.0, &HitContext::at(Vec2::new(310.0, 0.0)));
        assert_eq!(state.enemies[idx].hp, 70.0);
    }

    #[test]
    fn test_mark_amplifies_damage() {
        let mut state = test_state();
        let idx = spawn_now(&mut state, "dummy", Vec2::new(300.0, 0.0));
        let catalog = state.catalog.clone();
        apply_status_effect(&mut state.enemies[idx], &catalog, "mark", 1);
        let out = damage_enemy(&mut state, idx, 10.0, &HitContext::at(Vec2::ZERO)).unwrap();
        assert_eq!(out.dealt, 15.0);
    }

    #[test]
    fn test_guaranteed_crit() {
        let mut state = test_state();
        state.player.base.crit_chance = 1.0;
        let idx = spawn_now(&mut state, "dummy", Vec2::new(300.0, 0.0));
        let hit = HitContext {
            can_crit: true,
            ..HitContext::at(Vec2::ZERO)
        };
        let out = damage_enemy(&mut state, idx, 10.0, &hit).unwrap();
        assert!(out.crit);
        assert_eq!(out.dealt, 20.0);
    }

    #[test]
    fn test_status_triggers_apply_on_hit() {
        let mut state = test_state();
        let idx = spawn_now(&mut state, "dummy", Vec2::new(300.0, 0.0));
        let triggers = vec![StatusTrigger {
            effect: "burn".to_string(),
            stacks: 2,
            chance: 1.0,
        }];
        let hit = HitContext {
            triggers: &triggers,
            ..HitContext::at(Vec2::ZERO)
        };
        damage_enemy(&mut state, idx, 1.0, &hit);
        assert_eq!(state.enemies[idx].effects["burn"].stacks, 2);
    }

    #[test]
    fn test_dot_can_kill() {
        let mut state = test_state();
        let idx = spawn_now(&mut state, "runner", Vec2::new(400.0, 0.0));
        let catalog = state.catalog.clone();
        apply_status_effect(&mut state.enemies[idx], &catalog, "burn", 3);
        // 20 dps vs 10 hp
        for _ in 0..120 {
            update_enemies(&mut state, SIM_DT);
        }
        assert!(!state.enemies[idx].alive);
        assert_eq!(state.progress.total_kills, 1);
    }

    #[test]
    fn test_on_death_spawns_offspring() {
        let mut state = test_state();
        let idx = spawn_now(&mut state, "splitter", Vec2::new(300.0, 0.0));
        kill_enemy(&mut state, idx);
        assert_eq!(state.spawn_queue.len(), 2);
        assert_eq!(state.live_enemy_count(), 2);
        state.flush_spawns();
        state.sweep_dead();
        assert!(state.enemies.iter().all(|e| e.spec_id == "dummy"));
    }

    #[test]
    fn test_spawn_respects_cap_and_unknown_ids() {
        let mut state = test_state();
        state.tuning.max_enemies = 2;
        assert!(spawn_enemy(&mut state, "ghost", Vec2::new(300.0, 0.0)).is_none());
        assert!(spawn_enemy(&mut state, "dummy", Vec2::new(300.0, 0.0)).is_some());
        assert!(spawn_enemy(&mut state, "dummy", Vec2::new(300.0, 0.0)).is_some());
        assert!(spawn_enemy(&mut state, "dummy", Vec2::new(300.0, 0.0)).is_none());
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut state = test_state();
        let a = spawn_enemy(&mut state, "dummy", Vec2::new(300.0, 0.0)).unwrap();
        let b = spawn_enemy(&mut state, "dummy", Vec2::new(300.0, 0.0)).unwrap();
        assert!(b > a);
    }

    #[test]
    fn test_planet_contact_destroys_without_reward() {
        let mut state = test_state();
        let hp = state.player.hp;
        let idx = spawn_now(&mut state, "runner", Vec2::new(65.0, 0.0));
        update_enemies(&mut state, SIM_DT);
        assert!(!state.enemies[idx].alive);
        assert_eq!(state.progress.score, 0);
        assert_eq!(state.player.hp, hp - 10.0);
    }

    #[test]
    fn test_slow_halves_cruise_speed() {
        let mut state = test_state();
        let idx = spawn_now(&mut state, "runner", Vec2::new(3000.0, 0.0));
        for _ in 0..240 {
            update_enemies(&mut state, SIM_DT);
        }
        let cruise = state.enemies[idx].vel.length();

        let catalog = state.catalog.clone();
        apply_status_effect(&mut state.enemies[idx], &catalog, "slow", 1);
        for _ in 0..300 {
            update_enemies(&mut state, SIM_DT);
        }
        let slowed = state.enemies[idx].vel.length();
        assert!((slowed / cruise - 0.5).abs() < 0.02, "{} vs {}", slowed, cruise);

        // Slow (3s) has expired well within another 2s
        for _ in 0..240 {
            update_enemies(&mut state, SIM_DT);
        }
        let recovered = state.enemies[idx].vel.length();
        assert!((recovered / cruise - 1.0).abs() < 0.02);
    }

    #[test]
    fn test_stunned_enemy_does_not_move() {
        let mut state = test_state();
        let idx = spawn_now(&mut state, "runner", Vec2::new(1000.0, 0.0));
        let catalog = state.catalog.clone();
        apply_status_effect(&mut state.enemies[idx], &catalog, "stun", 1);
        state.enemies[idx].effects.get_mut("stun").unwrap().remaining = 0.4;
        let before = state.enemies[idx].pos;
        update_enemies(&mut state, SIM_DT);
        assert_eq!(state.enemies[idx].pos, before);
    }

    #[test]
    fn test_ranged_enemy_fires_at_player() {
        let mut state = test_state();
        spawn_now(&mut state, "gunner", Vec2::new(250.0, 0.0));
        state.time = 2.0;
        update_enemies(&mut state, SIM_DT);
        assert_eq!(state.projectiles.len(), 1);
        // Rate limited
        update_enemies(&mut state, SIM_DT);
        assert_eq!(state.projectiles.len(), 1);
    }

    #[test]
    fn test_kill_count_trigger() {
        let mut state = test_state();
        state.items.push(OwnedItem {
            item_id: "coin".to_string(),
            stacks: 2,
            rounds_left: None,
        });
        for _ in 0..2 {
            let idx = spawn_now(&mut state, "runner", Vec2::new(300.0, 0.0));
            kill_enemy(&mut state, idx);
        }
        // Every 2nd kill: 3 currency x 2 stacks
        assert_eq!(state.progress.currency, 6);
        assert_ne!(state.phase, GamePhase::GameOver);
    }
}
