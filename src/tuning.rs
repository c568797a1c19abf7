//! Gameplay tuning
//!
//! Balance numbers that are not part of the per-entity catalog: world
//! geometry, caps, timers, the player's base stats and the reward economy.
//! Every field has a default so partial JSON overrides are accepted.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogError, Rarity, StatKind};

/// Player base stats before any item modifiers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseStats {
    pub damage: f32,
    /// Shots per second
    pub fire_rate: f32,
    /// Multiplier on the bullet's own speed
    pub projectile_speed: f32,
    pub crit_chance: f32,
    pub crit_multiplier: f32,
    pub pierce: f32,
    pub bounce: f32,
    pub chain: f32,
    pub aoe: f32,
    /// Extra projectiles per shot on top of the bullet's spread count
    pub projectiles_per_shot: f32,
    /// Fraction of incoming damage removed
    pub damage_reduction: f32,
}

impl Default for BaseStats {
    fn default() -> Self {
        Self {
            damage: 10.0,
            fire_rate: 3.0,
            projectile_speed: 1.0,
            crit_chance: 0.05,
            crit_multiplier: 2.0,
            pierce: 0.0,
            bounce: 0.0,
            chain: 0.0,
            aoe: 0.0,
            projectiles_per_shot: 0.0,
            damage_reduction: 0.0,
        }
    }
}

impl BaseStats {
    /// Base value for a stat (unknown stats have no base)
    pub fn get(&self, stat: StatKind) -> f32 {
        match stat {
            StatKind::Damage => self.damage,
            StatKind::FireRate => self.fire_rate,
            StatKind::ProjectileSpeed => self.projectile_speed,
            StatKind::CritChance => self.crit_chance,
            StatKind::CritMultiplier => self.crit_multiplier,
            StatKind::Pierce => self.pierce,
            StatKind::Bounce => self.bounce,
            StatKind::Chain => self.chain,
            StatKind::Aoe => self.aoe,
            StatKind::ProjectilesPerShot => self.projectiles_per_shot,
            StatKind::DamageReduction => self.damage_reduction,
            StatKind::Unknown => 0.0,
        }
    }
}

/// Offer weight per rarity tier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RarityWeights {
    pub common: f32,
    pub uncommon: f32,
    pub rare: f32,
    pub legendary: f32,
}

impl Default for RarityWeights {
    fn default() -> Self {
        Self {
            common: 60.0,
            uncommon: 28.0,
            rare: 10.0,
            legendary: 2.0,
        }
    }
}

impl RarityWeights {
    pub fn weight(&self, rarity: Rarity) -> f32 {
        match rarity {
            Rarity::Common => self.common,
            Rarity::Uncommon => self.uncommon,
            Rarity::Rare => self.rare,
            Rarity::Legendary => self.legendary,
        }
    }
}

/// Currency cost per rarity tier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RarityCosts {
    pub common: u32,
    pub uncommon: u32,
    pub rare: u32,
    pub legendary: u32,
}

impl Default for RarityCosts {
    fn default() -> Self {
        Self {
            common: 10,
            uncommon: 20,
            rare: 35,
            legendary: 60,
        }
    }
}

impl RarityCosts {
    pub fn cost(&self, rarity: Rarity) -> u32 {
        match rarity {
            Rarity::Common => self.common,
            Rarity::Uncommon => self.uncommon,
            Rarity::Rare => self.rare,
            Rarity::Legendary => self.legendary,
        }
    }
}

/// All gameplay tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World ===
    /// Half width/height of the playfield (planet sits at the origin)
    pub world_half_extents: Vec2,
    /// How far past the bounds a projectile may travel before removal
    pub despawn_margin: f32,
    pub planet_radius: f32,

    // === Player ===
    pub orbit_radius: f32,
    /// Radians per second at full rotate input
    pub orbit_speed: f32,
    pub player_radius: f32,
    pub max_hp: f32,
    /// Invulnerability after the orbiter is hit (seconds)
    pub player_invulnerability: f32,
    pub block_window: f32,
    pub block_cooldown: f32,
    /// Bullet fired by the player's weapon unless an item replaces it
    pub player_bullet: String,
    pub base_stats: BaseStats,
    /// Hard cap on incoming damage reduction
    pub max_damage_reduction: f32,

    // === Enemies ===
    /// Distance from the planet at which enemies appear
    pub enemy_spawn_radius: f32,
    pub max_enemies: usize,
    /// Invulnerability after an enemy is damaged (seconds)
    pub enemy_hit_invulnerability: f32,
    /// Velocity blending rate toward a behavior's desired direction
    pub enemy_steering: f32,
    /// Frictional damping applied after the behavior update
    pub enemy_friction: f32,
    /// Fraction of hit damage dealt to AOE splash victims
    pub aoe_splash_fraction: f32,

    // === Combo ===
    /// Seconds after a kill before the combo starts decaying
    pub combo_window: f32,
    /// Combo points lost per second once decaying
    pub combo_decay_rate: f32,
    /// Superlinear combo growth factor per kill
    pub combo_growth: f32,

    // === Rounds ===
    /// Breather between clearing a round and the reward offer (seconds)
    pub cleared_delay: f32,
    pub default_round_duration: f32,
    pub default_spawn_interval: f32,
    /// Budget added per round when synthesizing rounds past the schedule
    pub budget_growth_per_round: f32,
    /// Seconds added per round when synthesizing rounds past the schedule
    pub duration_growth_per_round: f32,

    // === Rewards ===
    pub reward_offer_count: usize,
    pub rarity_weights: RarityWeights,
    /// Round after which the legendary tier weight is raised
    pub legendary_unlock_round: u32,
    pub legendary_unlock_weight: f32,
    pub rarity_costs: RarityCosts,
    pub reward_target_radius: f32,
    /// Distance of reward targets from the planet center
    pub reward_target_distance: f32,

    // === Cosmetics ===
    pub max_particles: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            world_half_extents: Vec2::new(480.0, 360.0),
            despawn_margin: 80.0,
            planet_radius: 60.0,

            orbit_radius: 90.0,
            orbit_speed: 3.0,
            player_radius: 12.0,
            max_hp: 100.0,
            player_invulnerability: 1.0,
            block_window: 0.35,
            block_cooldown: 2.0,
            player_bullet: "basic".to_string(),
            base_stats: BaseStats::default(),
            max_damage_reduction: 0.9,

            enemy_spawn_radius: 520.0,
            max_enemies: 60,
            enemy_hit_invulnerability: 0.02,
            enemy_steering: 3.0,
            enemy_friction: 3.0,
            aoe_splash_fraction: 0.5,

            combo_window: 2.5,
            combo_decay_rate: 4.0,
            combo_growth: 0.1,

            cleared_delay: 1.5,
            default_round_duration: 60.0,
            default_spawn_interval: 1.2,
            budget_growth_per_round: 8.0,
            duration_growth_per_round: 5.0,

            reward_offer_count: 2,
            rarity_weights: RarityWeights::default(),
            legendary_unlock_round: 5,
            legendary_unlock_weight: 8.0,
            rarity_costs: RarityCosts::default(),
            reward_target_radius: 26.0,
            reward_target_distance: 200.0,

            max_particles: 256,
        }
    }
}

impl Tuning {
    /// Parse tuning overrides from JSON (missing fields keep their defaults)
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning)
    }

    /// Offer weight for a rarity tier in the given round
    pub fn rarity_weight(&self, rarity: Rarity, round: u32) -> f32 {
        if rarity == Rarity::Legendary && round > self.legendary_unlock_round {
            self.legendary_unlock_weight
        } else {
            self.rarity_weights.weight(rarity)
        }
    }
}
