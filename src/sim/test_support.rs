//! Shared fixtures for simulation unit tests

use std::sync::Arc;

use glam::Vec2;

use super::enemy::spawn_enemy;
use super::state::SimulationState;
use crate::catalog::Catalog;
use crate::tuning::Tuning;

/// Small catalog with stationary targets and one of each mechanic
pub const TEST_CATALOG: &str = r#"{
    "bullets": [
        { "id": "basic", "damage": 10, "speed": 400, "lifetime": 2, "radius": 4 },
        { "id": "piercer", "damage": 10, "speed": 400, "lifetime": 2, "radius": 4, "pierce": 2 },
        { "id": "splash", "damage": 20, "speed": 400, "lifetime": 2, "radius": 4, "aoe_radius": 60 },
        { "id": "chainer", "damage": 20, "speed": 400, "lifetime": 2, "radius": 4,
          "chain": 3, "chain_range": 150, "chain_damage_multiplier": 0.5 },
        { "id": "burner", "damage": 1, "speed": 400, "lifetime": 2, "radius": 4,
          "status_effects": [ { "effect": "burn", "stacks": 1, "chance": 1.0 } ] },
        { "id": "frag", "damage": 5, "speed": 300, "lifetime": 0.5, "radius": 3 },
        { "id": "popper", "damage": 10, "speed": 400, "lifetime": 2, "radius": 4,
          "on_hit_spawn": { "bullet": "frag", "count": 4 } },
        { "id": "shot", "damage": 0, "speed": 200, "lifetime": 4, "radius": 5 },
        { "id": "fan", "damage": 5, "speed": 400, "lifetime": 2, "radius": 4,
          "spread": { "count": 3, "angle": 0.6 } }
    ],
    "enemies": [
        { "id": "dummy", "hp": 50, "speed": 0, "contact_damage": 5, "radius": 10,
          "cost": 5, "value": 10, "currency": 1 },
        { "id": "runner", "hp": 10, "speed": 40, "contact_damage": 10, "radius": 10,
          "cost": 1, "value": 1 },
        { "id": "brute", "hp": 200, "speed": 0, "contact_damage": 5, "radius": 10,
          "cost": 20, "value": 50 },
        { "id": "turtle", "hp": 100, "speed": 0, "contact_damage": 5, "radius": 10,
          "cost": 5, "value": 10, "shield": { "reduction": 0.5, "arc_width": 1.5 } },
        { "id": "splitter", "hp": 10, "speed": 0, "contact_damage": 5, "radius": 10,
          "cost": 5, "value": 10, "on_death": { "enemy": "dummy", "count": 2 } },
        { "id": "gunner", "hp": 30, "speed": 0, "contact_damage": 5, "radius": 10,
          "cost": 5, "value": 10, "attack_style": "ranged", "behavior": "sniper",
          "params": { "preferred_distance": 250 },
          "ranged": { "damage": 7, "speed": 200, "fire_rate": 1.0, "bullet": "shot" } }
    ],
    "status_effects": [
        { "id": "burn", "category": "dot", "damage_per_second": 10, "damage_per_stack": 5,
          "duration": 2, "max_stacks": 3 },
        { "id": "slow", "category": "debuff", "speed_multiplier": 0.5, "duration": 3 },
        { "id": "mark", "category": "debuff", "damage_multiplier": 1.5, "duration": 5 },
        { "id": "stun", "category": "stun", "stun_duration": 0.5, "duration": 2 }
    ],
    "items": [
        { "id": "lens", "rarity": "common", "effects": [ { "kind": "stat_add", "stat": "damage", "value": 5 } ] },
        { "id": "amp", "rarity": "rare", "effects": [ { "kind": "stat_mult", "stat": "damage", "value": 2 } ] },
        { "id": "crown", "rarity": "legendary", "stacking": "unique",
          "effects": [ { "kind": "stat_add", "stat": "crit_chance", "value": 0.1 } ] },
        { "id": "charm", "rarity": "uncommon", "item_type": "temporary", "duration_rounds": 2,
          "effects": [ { "kind": "stat_add", "stat": "fire_rate", "value": 1 } ] },
        { "id": "coin", "rarity": "common", "max_stacks": 2,
          "effects": [ { "kind": "on_kill_count", "every": 2, "action": { "action": "gain_currency", "amount": 3 } } ] },
        { "id": "twin", "rarity": "uncommon",
          "effects": [ { "kind": "stat_add", "stat": "projectiles_per_shot", "value": 1 } ] },
        { "id": "wingman", "rarity": "uncommon",
          "effects": [ { "kind": "on_shot_spawn", "bullet": "frag", "count": 2 } ] },
        { "id": "metronome", "rarity": "rare",
          "effects": [ { "kind": "on_shot_count", "every": 2, "action": { "action": "spawn_bullets", "bullet": "frag", "count": 4 } } ] },
        { "id": "scatter", "rarity": "rare", "stacking": "unique",
          "effects": [ { "kind": "replace_bullet", "bullet": "fan" } ] },
        { "id": "lance", "rarity": "rare", "stacking": "unique",
          "effects": [ { "kind": "replace_bullet", "bullet": "piercer" } ] }
    ],
    "rounds": [
        { "round": 1, "budget": 10, "pool": ["dummy"], "spawn_interval": 0.5, "duration": 30 },
        { "round": 10, "budget": 20, "pool": ["dummy"], "spawn_interval": 5, "duration": 30,
          "pattern": "ring", "burst": 4 },
        { "round": 11, "budget": 20, "pool": ["dummy"], "spawn_interval": 5, "duration": 30,
          "pattern": "cluster", "burst": 4 },
        { "round": 12, "budget": 5, "pool": ["dummy"], "spawn_interval": 5, "duration": 60,
          "secondary": { "pool": ["brute"], "spawn_interval": 0.5, "budget": 40 } }
    ]
}"#;

pub fn test_catalog() -> Arc<Catalog> {
    Arc::new(Catalog::from_json(TEST_CATALOG).unwrap())
}

/// Tuning with crits disabled so damage numbers are exact
pub fn test_tuning() -> Tuning {
    let mut tuning = Tuning::default();
    tuning.base_stats.crit_chance = 0.0;
    tuning
}

pub fn test_state() -> SimulationState {
    SimulationState::new(test_catalog(), test_tuning(), 12345)
}

/// Spawn an enemy and merge it into the live set right away
pub fn spawn_now(state: &mut SimulationState, spec_id: &str, pos: Vec2) -> usize {
    let id = spawn_enemy(state, spec_id, pos).unwrap();
    state.flush_spawns();
    state.enemy_index(id).unwrap()
}
