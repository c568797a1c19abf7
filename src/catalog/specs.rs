//! Catalog entry types
//!
//! Every "type" tag from the data files is a closed enum with an explicit
//! fallback variant, so an unknown tag degrades to a safe default instead of
//! failing the whole catalog.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

fn one() -> f32 {
    1.0
}

fn one_u32() -> u32 {
    1
}

fn default_chain_multiplier() -> f32 {
    0.7
}

fn default_damage_type() -> String {
    "physical".to_string()
}

fn default_enemy_radius() -> f32 {
    12.0
}

// ---------------------------------------------------------------------------
// Bullets
// ---------------------------------------------------------------------------

/// Visual shape handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulletShape {
    Needle,
    Orb,
    Star,
    #[default]
    #[serde(other)]
    Circle,
}

/// A status effect a hit may apply, rolled independently per hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusTrigger {
    pub effect: String,
    #[serde(default = "one_u32")]
    pub stacks: u32,
    /// Probability in [0, 1]
    #[serde(default = "one")]
    pub chance: f32,
}

/// Fan of projectiles fired per shot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spread {
    pub count: u32,
    /// Total fan angle in radians
    pub angle: f32,
}

/// Steering toward the nearest untouched enemy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Homing {
    pub seek_radius: f32,
    /// Max heading change in radians per second
    pub turn_rate: f32,
}

/// Secondary projectiles released where a projectile hits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnHitSpawn {
    pub bullet: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletSpec {
    pub id: String,
    pub damage: f32,
    /// Multiplier on the shooter's fire rate
    #[serde(default = "one")]
    pub fire_rate: f32,
    pub speed: f32,
    /// Seconds
    pub lifetime: f32,
    pub radius: f32,
    #[serde(default)]
    pub pierce: u32,
    #[serde(default)]
    pub bounce: u32,
    #[serde(default)]
    pub chain: u32,
    #[serde(default)]
    pub chain_range: f32,
    #[serde(default = "default_chain_multiplier")]
    pub chain_damage_multiplier: f32,
    #[serde(default)]
    pub aoe_radius: f32,
    #[serde(default = "default_damage_type")]
    pub damage_type: String,
    #[serde(default)]
    pub status_effects: Vec<StatusTrigger>,
    #[serde(default)]
    pub knockback: f32,
    #[serde(default)]
    pub shape: BulletShape,
    #[serde(default)]
    pub spread: Option<Spread>,
    #[serde(default)]
    pub homing: Option<Homing>,
    #[serde(default)]
    pub on_hit_spawn: Option<OnHitSpawn>,
}

// ---------------------------------------------------------------------------
// Enemies
// ---------------------------------------------------------------------------

/// Movement/attack profile driving an enemy's behavior update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorProfile {
    Zigzag,
    Dasher,
    Orbiter,
    Sniper,
    Bomber,
    /// Straight approach; also the fallback for unknown tags
    #[default]
    #[serde(other)]
    Drifter,
}

/// How an enemy hurts the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackStyle {
    Ranged,
    Bomb,
    #[default]
    #[serde(other)]
    Contact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangedAttack {
    pub damage: f32,
    pub speed: f32,
    /// Shots per second
    pub fire_rate: f32,
    /// Bullet used for radius/lifetime/shape; falls back to a plain orb
    #[serde(default)]
    pub bullet: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnDeathSpawn {
    pub enemy: String,
    pub count: u32,
}

/// Frontal damage reduction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShieldSpec {
    /// Fraction of damage removed inside the arc, in [0, 1]
    pub reduction: f32,
    /// Full arc width in radians, centered on the facing angle
    pub arc_width: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemySpec {
    pub id: String,
    pub hp: f32,
    pub speed: f32,
    #[serde(default)]
    pub dash_speed: Option<f32>,
    pub contact_damage: f32,
    #[serde(default = "default_enemy_radius")]
    pub radius: f32,
    #[serde(default)]
    pub attack_style: AttackStyle,
    #[serde(default)]
    pub behavior: BehaviorProfile,
    /// Free-form numeric knobs read by the behavior profile
    #[serde(default)]
    pub params: BTreeMap<String, f32>,
    #[serde(default)]
    pub ranged: Option<RangedAttack>,
    /// Spawn budget cost
    pub cost: u32,
    /// Score awarded on kill
    pub value: u64,
    #[serde(default)]
    pub currency: u32,
    #[serde(default)]
    pub on_death: Option<OnDeathSpawn>,
    #[serde(default)]
    pub shield: Option<ShieldSpec>,
}

impl EnemySpec {
    /// Behavior parameter with a fallback
    pub fn param(&self, key: &str, default: f32) -> f32 {
        self.params.get(key).copied().unwrap_or(default)
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    #[default]
    Permanent,
    Temporary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stacking {
    /// Re-acquiring replaces the owned copy
    Unique,
    #[default]
    Stackable,
}

/// Player stats that items can modify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Damage,
    FireRate,
    ProjectileSpeed,
    CritChance,
    CritMultiplier,
    Pierce,
    Bounce,
    Chain,
    Aoe,
    ProjectilesPerShot,
    DamageReduction,
    #[serde(other)]
    Unknown,
}

/// What a counted trigger does when it fires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TriggerAction {
    /// Radial burst of player projectiles from the orbiter
    SpawnBullets { bullet: String, count: u32 },
    Heal { amount: f32 },
    GainCurrency { amount: u32 },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemEffect {
    StatAdd {
        stat: StatKind,
        value: f32,
    },
    StatMult {
        stat: StatKind,
        value: f32,
    },
    StatSet {
        stat: StatKind,
        value: f32,
    },
    /// Extra projectiles fired alongside every shot
    OnShotSpawn {
        bullet: String,
        count: u32,
    },
    /// Fires when the total shot count is a multiple of `every`
    OnShotCount {
        every: u32,
        action: TriggerAction,
    },
    /// Fires when the total kill count is a multiple of `every`
    OnKillCount {
        every: u32,
        action: TriggerAction,
    },
    /// Nested effects active while at least `min_count` owned items carry `tag`
    ConditionalByTag {
        tag: String,
        #[serde(default = "one_u32")]
        min_count: u32,
        effects: Vec<ItemEffect>,
    },
    /// Swap the player's weapon bullet
    ReplaceBullet {
        bullet: String,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSpec {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub rarity: Rarity,
    #[serde(default)]
    pub item_type: ItemType,
    /// Rounds a temporary item lasts
    #[serde(default)]
    pub duration_rounds: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    pub effects: Vec<ItemEffect>,
    #[serde(default)]
    pub stacking: Stacking,
    #[serde(default)]
    pub max_stacks: Option<u32>,
}

impl ItemSpec {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

// ---------------------------------------------------------------------------
// Status effects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    /// Damage over time
    Dot,
    /// Slow and/or damage-taken multiplier
    Debuff,
    Stun,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEffectSpec {
    pub id: String,
    pub category: StatusCategory,
    #[serde(default)]
    pub damage_per_second: f32,
    /// Extra damage per second for every stack beyond the first
    #[serde(default)]
    pub damage_per_stack: f32,
    #[serde(default = "one")]
    pub speed_multiplier: f32,
    /// Damage-taken multiplier (the "mark" debuff)
    #[serde(default = "one")]
    pub damage_multiplier: f32,
    /// Tail of the duration window during which the target is stunned
    #[serde(default)]
    pub stun_duration: f32,
    pub duration: f32,
    #[serde(default = "one_u32")]
    pub max_stacks: u32,
}

// ---------------------------------------------------------------------------
// Rounds
// ---------------------------------------------------------------------------

/// Where a spawn event places its enemies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnPattern {
    /// Enemies of one spawn event clustered around a single angle
    Cluster,
    /// Enemies of one spawn event spaced evenly around the planet
    Ring,
    /// One random angle per enemy
    #[default]
    #[serde(other)]
    Scatter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryWave {
    pub pool: Vec<String>,
    pub spawn_interval: f32,
    pub budget: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSpec {
    pub round: u32,
    pub budget: u32,
    #[serde(default)]
    pub pattern: SpawnPattern,
    pub pool: Vec<String>,
    pub spawn_interval: f32,
    /// Enemies per spawn event
    #[serde(default)]
    pub burst: Option<u32>,
    #[serde(default)]
    pub boss: bool,
    #[serde(default)]
    pub boss_id: Option<String>,
    #[serde(default)]
    pub secondary: Option<SecondaryWave>,
    /// Hard round timer in seconds
    #[serde(default)]
    pub duration: Option<f32>,
}
