//! Projectile engine
//!
//! Moves projectiles and resolves their hits. The live list is taken out of
//! the state for the pass, so chain children and fragments created mid-pass
//! land in `state.projectiles` and are merged back afterward; they first
//! move on the next tick.

use std::sync::Arc;

use glam::Vec2;

use crate::catalog::{BulletShape, BulletSpec, OnHitSpawn, RangedAttack};
use crate::{heading, normalize_angle, polar_to_cartesian};

use super::enemy::{HitContext, damage_enemy};
use super::player::{ShotModifiers, damage_player, player_projectile};
use super::round::select_reward;
use super::state::{DamageTarget, GamePhase, Owner, Projectile, SimulationState, palette};

/// Lifetime headroom for chain children so they reach a drifting target
const CHAIN_LIFETIME_SLACK: f32 = 1.25;

impl Projectile {
    /// Build a projectile from a bullet spec with explicit velocity and damage
    pub fn from_bullet(id: u32, bullet: &BulletSpec, owner: Owner, pos: Vec2, vel: Vec2, damage: f32) -> Self {
        Self {
            id,
            bullet_id: bullet.id.clone(),
            owner,
            pos,
            vel,
            lifetime: bullet.lifetime,
            damage,
            radius: bullet.radius,
            pierce: bullet.pierce,
            pierce_count: 0,
            bounce: bullet.bounce,
            chain: bullet.chain,
            chain_range: bullet.chain_range,
            chain_multiplier: bullet.chain_damage_multiplier,
            aoe_radius: bullet.aoe_radius,
            damage_type: bullet.damage_type.clone(),
            status_triggers: bullet.status_effects.clone(),
            knockback: bullet.knockback,
            homing: bullet.homing,
            on_hit_spawn: bullet.on_hit_spawn.clone(),
            shape: bullet.shape,
            hit_set: Default::default(),
        }
    }
}

/// Enemy shot aimed from `origin` at `target`
pub fn hostile_projectile(
    state: &mut SimulationState,
    ranged: &RangedAttack,
    origin: Vec2,
    target: Vec2,
) -> Projectile {
    let id = state.next_entity_id();
    let vel = (target - origin).normalize_or_zero() * ranged.speed;
    let bullet = ranged.bullet.as_deref().and_then(|b| state.catalog.bullet(b));

    match bullet {
        Some(bullet) => {
            let mut projectile = Projectile::from_bullet(id, bullet, Owner::Hostile, origin, vel, ranged.damage);
            projectile.lifetime = projectile.lifetime.max(4.0);
            projectile
        }
        None => Projectile {
            id,
            bullet_id: String::new(),
            owner: Owner::Hostile,
            pos: origin,
            vel,
            lifetime: 4.0,
            damage: ranged.damage,
            radius: 5.0,
            pierce: 0,
            pierce_count: 0,
            bounce: 0,
            chain: 0,
            chain_range: 0.0,
            chain_multiplier: 0.0,
            aoe_radius: 0.0,
            damage_type: "physical".to_string(),
            status_triggers: Vec::new(),
            knockback: 0.0,
            homing: None,
            on_hit_spawn: None,
            shape: BulletShape::Orb,
            hit_set: Default::default(),
        },
    }
}

/// Advance all projectiles by one tick and resolve their hits
pub fn update_projectiles(state: &mut SimulationState, dt: f32) {
    let mut projectiles = std::mem::take(&mut state.projectiles);
    let half = state.tuning.world_half_extents;
    let margin = state.tuning.despawn_margin;

    for projectile in projectiles.iter_mut() {
        if projectile.lifetime <= 0.0 {
            continue;
        }

        if let Some(homing) = projectile.homing {
            steer_homing(state, projectile, homing.seek_radius, homing.turn_rate, dt);
        }

        projectile.pos += projectile.vel * dt;
        projectile.lifetime -= dt;

        if projectile.bounce > 0 && projectile.pos.x.abs() > half.x {
            projectile.vel.x = -projectile.vel.x;
            projectile.pos.x = projectile.pos.x.clamp(-half.x, half.x);
            projectile.bounce -= 1;
        }
        if projectile.bounce > 0 && projectile.pos.y.abs() > half.y {
            projectile.vel.y = -projectile.vel.y;
            projectile.pos.y = projectile.pos.y.clamp(-half.y, half.y);
            projectile.bounce -= 1;
        }

        match projectile.owner {
            Owner::Player if state.phase == GamePhase::Reward => hit_reward_targets(state, projectile),
            Owner::Player => resolve_player_hits(state, projectile),
            Owner::Hostile => resolve_hostile_hits(state, projectile),
        }

        if projectile.pos.x.abs() > half.x + margin || projectile.pos.y.abs() > half.y + margin {
            projectile.lifetime = 0.0;
        }
    }

    let spawned = std::mem::take(&mut state.projectiles);
    projectiles.retain(|p| p.lifetime > 0.0);
    projectiles.extend(spawned);
    state.projectiles = projectiles;
}

fn steer_homing(state: &SimulationState, projectile: &mut Projectile, seek_radius: f32, turn_rate: f32, dt: f32) {
    let target = state
        .enemies
        .iter()
        .filter(|e| e.alive && !projectile.hit_set.contains(&e.id))
        .map(|e| (e.pos, e.pos.distance(projectile.pos)))
        .filter(|(_, dist)| *dist <= seek_radius)
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    if let Some((pos, _)) = target {
        let speed = projectile.vel.length();
        let current = heading(projectile.vel);
        let desired = heading(pos - projectile.pos);
        let max_turn = turn_rate * dt;
        let turn = normalize_angle(desired - current).clamp(-max_turn, max_turn);
        projectile.vel = polar_to_cartesian(speed, current + turn);
    }
}

fn resolve_player_hits(state: &mut SimulationState, projectile: &mut Projectile) {
    for i in 0..state.enemies.len() {
        let enemy = &state.enemies[i];
        if !enemy.alive || projectile.hit_set.contains(&enemy.id) {
            continue;
        }
        if enemy.pos.distance(projectile.pos) > projectile.radius + enemy.radius {
            continue;
        }
        let (enemy_id, enemy_pos) = (enemy.id, enemy.pos);

        projectile.hit_set.insert(enemy_id);
        let hit = HitContext {
            impact: projectile.pos,
            knockback: projectile.vel.normalize_or_zero() * projectile.knockback,
            triggers: &projectile.status_triggers,
            can_crit: true,
            projectile_id: Some(projectile.id),
        };
        damage_enemy(state, i, projectile.damage, &hit);

        if projectile.aoe_radius > 0.0 {
            splash(state, projectile);
        }
        if projectile.chain > 0 {
            spawn_chain(state, projectile, enemy_pos);
        }
        if let Some(spawn) = projectile.on_hit_spawn.clone() {
            spawn_fragments(state, projectile, &spawn, enemy_pos);
        }

        projectile.pierce_count += 1;
        if projectile.pierce_count > projectile.pierce {
            projectile.lifetime = 0.0;
            break;
        }
    }
}

/// Reduced-damage splash around the impact; victims join the hit set
fn splash(state: &mut SimulationState, projectile: &mut Projectile) {
    let center = projectile.pos;
    let damage = projectile.damage * state.tuning.aoe_splash_fraction;

    for j in 0..state.enemies.len() {
        let enemy = &state.enemies[j];
        if !enemy.alive || projectile.hit_set.contains(&enemy.id) {
            continue;
        }
        if enemy.pos.distance(center) > projectile.aoe_radius + enemy.radius {
            continue;
        }
        projectile.hit_set.insert(enemy.id);
        let hit = HitContext {
            triggers: &projectile.status_triggers,
            can_crit: true,
            projectile_id: Some(projectile.id),
            ..HitContext::at(center)
        };
        damage_enemy(state, j, damage, &hit);
    }
    state.emit_burst(center, palette::AOE, 8, projectile.aoe_radius * 2.0);
}

/// Jump to the nearest untouched enemy in range with a weaker child.
/// The child lives only as long as it needs to reach that target.
fn spawn_chain(state: &mut SimulationState, projectile: &Projectile, from: Vec2) {
    let target = state
        .enemies
        .iter()
        .filter(|e| e.alive && !projectile.hit_set.contains(&e.id))
        .map(|e| (e.pos, e.radius, e.pos.distance(from)))
        .filter(|(_, _, dist)| *dist <= projectile.chain_range)
        .min_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal));

    let Some((target_pos, target_radius, dist)) = target else {
        return;
    };
    let speed = projectile.vel.length().max(1.0);

    let id = state.next_entity_id();
    let mut child = projectile.clone();
    child.id = id;
    child.pos = from;
    child.vel = (target_pos - from).normalize_or_zero() * speed;
    child.lifetime = (dist + target_radius) / speed * CHAIN_LIFETIME_SLACK;
    child.damage = projectile.damage * projectile.chain_multiplier;
    child.chain = projectile.chain - 1;
    child.pierce = 0;
    child.pierce_count = 0;
    child.bounce = 0;
    child.aoe_radius = 0.0;
    child.homing = None;
    child.on_hit_spawn = None;
    state.projectiles.push(child);
}

/// Radial burst of secondary projectiles at the impact
fn spawn_fragments(state: &mut SimulationState, projectile: &Projectile, spawn: &OnHitSpawn, at: Vec2) {
    let catalog = Arc::clone(&state.catalog);
    let Some(bullet) = catalog.bullet(&spawn.bullet) else {
        log::warn!("Unknown on-hit bullet '{}' skipped", spawn.bullet);
        return;
    };
    let mods = ShotModifiers::resolve(state);
    let count = spawn.count.max(1);
    for k in 0..count {
        let angle = heading(projectile.vel) + k as f32 / count as f32 * std::f32::consts::TAU;
        let mut fragment = player_projectile(state, bullet, at, polar_to_cartesian(1.0, angle), &mods);
        fragment.hit_set = projectile.hit_set.clone();
        fragment.on_hit_spawn = None;
        state.projectiles.push(fragment);
    }
}

fn resolve_hostile_hits(state: &mut SimulationState, projectile: &mut Projectile) {
    if projectile.pos.length() <= state.tuning.planet_radius + projectile.radius {
        projectile.lifetime = 0.0;
        state.emit_burst(projectile.pos, palette::PLANET, 4, 80.0);
        damage_player(state, projectile.damage, DamageTarget::Planet);
        return;
    }
    if projectile.pos.distance(state.player.pos()) <= state.tuning.player_radius + projectile.radius {
        projectile.lifetime = 0.0;
        damage_player(state, projectile.damage, DamageTarget::Orbiter);
    }
}

fn hit_reward_targets(state: &mut SimulationState, projectile: &mut Projectile) {
    let hit = state
        .offers
        .iter()
        .position(|offer| offer.pos.distance(projectile.pos) <= offer.radius + projectile.radius);
    if let Some(idx) = hit {
        projectile.lifetime = 0.0;
        select_reward(state, idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::state::GameEvent;
    use crate::sim::test_support::{spawn_now, test_state};
    use proptest::prelude::*;

    fn fire_bullet(state: &mut SimulationState, bullet_id: &str, pos: Vec2, dir: Vec2) -> u32 {
        let catalog = state.catalog.clone();
        let bullet = catalog.bullet(bullet_id).unwrap();
        let id = state.next_entity_id();
        let projectile = Projectile::from_bullet(id, bullet, Owner::Player, pos, dir * bullet.speed, bullet.damage);
        state.projectiles.push(projectile);
        id
    }

    fn hits_by_enemy(state: &SimulationState) -> Vec<u32> {
        state
            .events
            .iter()
            .filter_map(|e| match e {
                GameEvent::EnemyHit { enemy_id, .. } => Some(*enemy_id),
                _ => None,
            })
            .collect()
    }

    fn run(state: &mut SimulationState, ticks: usize) {
        for _ in 0..ticks {
            update_projectiles(state, SIM_DT);
            for enemy in state.enemies.iter_mut() {
                enemy.invulnerable = 0.0;
            }
        }
    }

    #[test]
    fn test_single_hit_consumes_projectile() {
        let mut state = test_state();
        let idx = spawn_now(&mut state, "dummy", Vec2::new(200.0, 0.0));
        fire_bullet(&mut state, "basic", Vec2::new(150.0, 0.0), Vec2::X);
        run(&mut state, 30);
        assert_eq!(state.enemies[idx].hp, 40.0);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_pierce_hits_each_enemy_once() {
        let mut state = test_state();
        for x in [200.0, 230.0, 260.0, 290.0] {
            spawn_now(&mut state, "brute", Vec2::new(x, 0.0));
        }
        fire_bullet(&mut state, "piercer", Vec2::new(150.0, 0.0), Vec2::X);
        run(&mut state, 60);

        // pierce 2 -> three enemies
        let hits = hits_by_enemy(&state);
        assert_eq!(hits.len(), 3);
        let mut distinct = hits.clone();
        distinct.dedup();
        assert_eq!(distinct.len(), 3);
        assert_eq!(state.enemies[3].hp, 200.0);
    }

    #[test]
    fn test_aoe_splash_marks_victims() {
        let mut state = test_state();
        let a = spawn_now(&mut state, "brute", Vec2::new(200.0, 0.0));
        let b = spawn_now(&mut state, "brute", Vec2::new(200.0, 40.0));
        let far = spawn_now(&mut state, "brute", Vec2::new(200.0, 200.0));
        fire_bullet(&mut state, "splash", Vec2::new(150.0, 0.0), Vec2::X);
        run(&mut state, 30);

        assert_eq!(state.enemies[a].hp, 180.0);
        assert_eq!(state.enemies[b].hp, 190.0);
        assert_eq!(state.enemies[far].hp, 200.0);
    }

    #[test]
    fn test_splash_victims_roll_crits() {
        let mut state = test_state();
        state.player.base.crit_chance = 1.0;
        let multiplier = state.player.base.crit_multiplier;
        let a = spawn_now(&mut state, "brute", Vec2::new(200.0, 0.0));
        let b = spawn_now(&mut state, "brute", Vec2::new(200.0, 40.0));
        fire_bullet(&mut state, "splash", Vec2::new(150.0, 0.0), Vec2::X);
        run(&mut state, 30);

        assert!((state.enemies[a].hp - (200.0 - 20.0 * multiplier)).abs() < 1e-3);
        assert!((state.enemies[b].hp - (200.0 - 10.0 * multiplier)).abs() < 1e-3);
        let crits = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemyHit { crit: true, .. }))
            .count();
        assert_eq!(crits, 2);
    }

    #[test]
    fn test_chain_touches_distinct_enemies() {
        let mut state = test_state();
        for x in [200.0, 300.0, 400.0, 500.0, 600.0] {
            spawn_now(&mut state, "brute", Vec2::new(x, 60.0));
        }
        fire_bullet(&mut state, "chainer", Vec2::new(150.0, 60.0), Vec2::X);
        run(&mut state, 240);

        // Initial hit + 3 chain jumps
        let hits = hits_by_enemy(&state);
        assert_eq!(hits.len(), 4);
        let mut sorted = hits.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 4);

        // 20, 10, 5, 2.5
        assert_eq!(state.enemies[0].hp, 180.0);
        assert_eq!(state.enemies[1].hp, 190.0);
        assert_eq!(state.enemies[2].hp, 195.0);
        assert_eq!(state.enemies[3].hp, 197.5);
        assert_eq!(state.enemies[4].hp, 200.0);
    }

    #[test]
    fn test_chain_child_inherits_hit_set() {
        let mut state = test_state();
        spawn_now(&mut state, "brute", Vec2::new(200.0, 60.0));
        spawn_now(&mut state, "brute", Vec2::new(300.0, 60.0));
        fire_bullet(&mut state, "chainer", Vec2::new(190.0, 60.0), Vec2::X);
        update_projectiles(&mut state, SIM_DT);

        assert_eq!(state.projectiles.len(), 1);
        let child = &state.projectiles[0];
        assert_eq!(child.chain, 2);
        assert!(child.hit_set.contains(&state.enemies[0].id));
    }

    #[test]
    fn test_fragments_skip_struck_enemy() {
        let mut state = test_state();
        spawn_now(&mut state, "brute", Vec2::new(200.0, 60.0));
        fire_bullet(&mut state, "popper", Vec2::new(190.0, 60.0), Vec2::X);
        update_projectiles(&mut state, SIM_DT);

        let fragments: Vec<_> = state.projectiles.iter().filter(|p| p.bullet_id == "frag").collect();
        assert_eq!(fragments.len(), 4);
        assert!(fragments.iter().all(|f| f.hit_set.contains(&state.enemies[0].id)));
    }

    #[test]
    fn test_bounce_reflects_at_wall() {
        let mut state = test_state();
        let catalog = state.catalog.clone();
        let bullet = catalog.bullet("basic").unwrap();
        let mut projectile = Projectile::from_bullet(1, bullet, Owner::Player, Vec2::new(478.0, 200.0), Vec2::new(400.0, 0.0), 1.0);
        projectile.bounce = 1;
        state.projectiles.push(projectile);
        update_projectiles(&mut state, SIM_DT);

        let p = &state.projectiles[0];
        assert!(p.vel.x < 0.0);
        assert_eq!(p.bounce, 0);
        assert!(p.pos.x <= state.tuning.world_half_extents.x);
    }

    #[test]
    fn test_out_of_bounds_removed() {
        let mut state = test_state();
        fire_bullet(&mut state, "basic", Vec2::new(0.0, 350.0), Vec2::Y);
        run(&mut state, 60);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_hostile_shot_hits_planet() {
        let mut state = test_state();
        let ranged = RangedAttack {
            damage: 8.0,
            speed: 200.0,
            fire_rate: 1.0,
            bullet: None,
        };
        let shot = hostile_projectile(&mut state, &ranged, Vec2::new(-200.0, 0.0), Vec2::ZERO);
        state.projectiles.push(shot);
        run(&mut state, 120);
        assert_eq!(state.player.hp, state.player.max_hp - 8.0);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_homing_turns_toward_target() {
        let mut state = test_state();
        spawn_now(&mut state, "brute", Vec2::new(200.0, 100.0));
        let catalog = state.catalog.clone();
        let bullet = catalog.bullet("basic").unwrap();
        let mut projectile = Projectile::from_bullet(1, bullet, Owner::Player, Vec2::new(100.0, 0.0), Vec2::new(200.0, 0.0), 1.0);
        projectile.homing = Some(crate::catalog::Homing {
            seek_radius: 300.0,
            turn_rate: 4.0,
        });
        state.projectiles.push(projectile);
        update_projectiles(&mut state, SIM_DT);

        let p = &state.projectiles[0];
        assert!(p.vel.y > 0.0);
        assert!((p.vel.length() - 200.0).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_no_enemy_hit_twice_by_one_projectile(
            xs in prop::collection::vec(170.0f32..450.0, 1..8),
            ys in prop::collection::vec(-30.0f32..30.0, 8),
            bullet_idx in 0usize..4,
        ) {
            let bullets = ["basic", "piercer", "splash", "chainer"];
            let mut state = test_state();
            for (k, x) in xs.iter().enumerate() {
                spawn_now(&mut state, "brute", Vec2::new(*x, ys[k]));
            }
            fire_bullet(&mut state, bullets[bullet_idx], Vec2::new(150.0, 0.0), Vec2::X);
            run(&mut state, 120);

            let mut seen = std::collections::BTreeSet::new();
            for event in &state.events {
                if let GameEvent::EnemyHit { enemy_id, projectile_id: Some(pid), .. } = event {
                    prop_assert!(seen.insert((*pid, *enemy_id)));
                }
            }
        }
    }
}
