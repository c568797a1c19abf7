//! Simulation state and core entity types
//!
//! The simulation owns every runtime collection; the catalog is shared
//! read-only behind an `Arc`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::catalog::{BehaviorProfile, BulletShape, Catalog, Homing, OnHitSpawn, RoundSpec, StatusTrigger};
use crate::polar_to_cartesian;
use crate::tuning::{BaseStats, Tuning};

/// Current phase of the round state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    /// Round spec is loaded on the next tick
    Setup,
    /// Enemies spawn from the round budget
    Spawning,
    /// Round over, short breather before the reward offer
    Cleared,
    /// Waiting for the player to shoot a reward target
    Reward,
    /// Run ended
    GameOver,
}

/// Where incoming damage landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DamageTarget {
    /// The defended planet (no invulnerability window)
    Planet,
    /// The orbiting ship
    Orbiter,
}

/// Events for the host (audio, camera, HUD); drained each frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    EnemySpawned { enemy_id: u32, spec_id: String },
    EnemyHit { enemy_id: u32, projectile_id: Option<u32>, damage: f32, crit: bool },
    EnemyKilled { enemy_id: u32, spec_id: String, pos: Vec2 },
    /// Enemy reached the planet and was destroyed on impact
    EnemyImpact { enemy_id: u32 },
    PlayerDamaged { target: DamageTarget, amount: f32 },
    Blocked,
    RoundStarted { round: u32 },
    RoundCleared { round: u32, timed_out: bool },
    RewardOffered { item_ids: Vec<String> },
    RewardTaken { item_id: String, cost: u32 },
    RewardSkipped,
    RewardUnaffordable { item_id: String, cost: u32 },
    CameraShake { intensity: f32 },
    GameOver { score: u64 },
}

/// An active status effect on one enemy
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActiveEffect {
    pub stacks: u32,
    /// Seconds left; removed at <= 0
    pub remaining: f32,
}

/// Per-profile behavior scratch state
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum BehaviorState {
    Drifter,
    Zigzag { clock: f32 },
    Dasher { cooldown: f32, dashing: bool, dash_time: f32 },
    Orbiter,
    Sniper,
    Bomber { retreating: bool },
}

impl BehaviorState {
    pub fn for_profile(profile: BehaviorProfile, dash_cooldown: f32) -> Self {
        match profile {
            BehaviorProfile::Drifter => BehaviorState::Drifter,
            BehaviorProfile::Zigzag => BehaviorState::Zigzag { clock: 0.0 },
            BehaviorProfile::Dasher => BehaviorState::Dasher {
                cooldown: dash_cooldown,
                dashing: false,
                dash_time: 0.0,
            },
            BehaviorProfile::Orbiter => BehaviorState::Orbiter,
            BehaviorProfile::Sniper => BehaviorState::Sniper,
            BehaviorProfile::Bomber => BehaviorState::Bomber { retreating: false },
        }
    }
}

/// A live enemy
#[derive(Debug, Clone)]
pub struct Enemy {
    /// Monotonic, never reused
    pub id: u32,
    pub spec_id: String,
    pub pos: Vec2,
    pub vel: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub speed: f32,
    pub contact_damage: f32,
    pub radius: f32,
    pub behavior: BehaviorState,
    /// Status id -> active state (ordered for deterministic iteration)
    pub effects: BTreeMap<String, ActiveEffect>,
    /// Brief window after a hit during which further hits are ignored
    pub invulnerable: f32,
    /// Angle toward the current target
    pub facing: f32,
    /// Simulation time of the last ranged shot
    pub last_fired: f32,
    /// Cleared on death/impact; swept at the end of the tick
    pub alive: bool,
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Owner {
    Player,
    Hostile,
}

/// A projectile in flight
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: u32,
    pub bullet_id: String,
    pub owner: Owner,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds left; removed at <= 0
    pub lifetime: f32,
    pub damage: f32,
    pub radius: f32,
    /// Extra enemies this projectile may damage after the first
    pub pierce: u32,
    /// Enemies damaged so far
    pub pierce_count: u32,
    pub bounce: u32,
    pub chain: u32,
    pub chain_range: f32,
    pub chain_multiplier: f32,
    pub aoe_radius: f32,
    pub damage_type: String,
    pub status_triggers: Vec<StatusTrigger>,
    pub knockback: f32,
    pub homing: Option<Homing>,
    pub on_hit_spawn: Option<OnHitSpawn>,
    pub shape: BulletShape,
    /// Enemies this instance has already touched; never damaged again by it
    pub hit_set: BTreeSet<u32>,
}

/// An item the player owns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnedItem {
    pub item_id: String,
    pub stacks: u32,
    /// Rounds left for temporary items
    pub rounds_left: Option<u32>,
}

/// The orbiting ship and the planet it defends (one shared hp pool)
#[derive(Debug, Clone)]
pub struct Player {
    pub orbit_angle: f32,
    pub orbit_radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub base: BaseStats,
    /// Aim direction of the last shot (radians)
    pub aim_angle: f32,
    pub invulnerable: f32,
    pub block_window: f32,
    pub block_cooldown: f32,
    pub fire_cooldown: f32,
    pub shots_fired: u64,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            orbit_angle: -std::f32::consts::FRAC_PI_2,
            orbit_radius: tuning.orbit_radius,
            hp: tuning.max_hp,
            max_hp: tuning.max_hp,
            base: tuning.base_stats.clone(),
            aim_angle: -std::f32::consts::FRAC_PI_2,
            invulnerable: 0.0,
            block_window: 0.0,
            block_cooldown: 0.0,
            fire_cooldown: 0.0,
            shots_fired: 0,
        }
    }

    /// Derived orbiter position
    pub fn pos(&self) -> Vec2 {
        polar_to_cartesian(self.orbit_radius, self.orbit_angle)
    }

    pub fn is_blocking(&self) -> bool {
        self.block_window > 0.0
    }
}

/// Per-round spawn bookkeeping
#[derive(Debug, Clone)]
pub struct RoundState {
    pub round: u32,
    /// Resolved spec (authored or synthesized)
    pub spec: Option<RoundSpec>,
    /// Hard round timer; the round ends when it reaches 0
    pub timer: f32,
    pub budget: u32,
    pub spawn_timer: f32,
    pub secondary_budget: u32,
    pub secondary_timer: f32,
    /// Breather countdown while `Cleared`
    pub cleared_timer: f32,
    pub kills: u32,
}

impl RoundState {
    pub fn new(round: u32) -> Self {
        Self {
            round,
            spec: None,
            timer: 0.0,
            budget: 0,
            spawn_timer: 0.0,
            secondary_budget: 0,
            secondary_timer: 0.0,
            cleared_timer: 0.0,
            kills: 0,
        }
    }

    /// Budget left across the primary and secondary waves
    pub fn remaining_budget(&self) -> u32 {
        self.budget + self.secondary_budget
    }
}

/// Score, kills, combo and currency
#[derive(Debug, Clone, Default, Serialize)]
pub struct Progress {
    pub score: u64,
    pub total_kills: u64,
    pub combo: f32,
    /// Seconds before the combo starts decaying
    pub combo_timer: f32,
    pub currency: u32,
}

/// What a reward target does when shot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RewardChoice {
    Item { item_id: String, cost: u32 },
    Skip,
}

/// A shootable reward target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewardOffer {
    pub choice: RewardChoice,
    pub pos: Vec2,
    pub radius: f32,
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Palette index for the renderer
    pub color: u32,
    /// 0-1, decreases over time
    pub life: f32,
    pub size: f32,
}

/// Particle palette indices
pub mod palette {
    pub const HIT: u32 = 0;
    pub const CRIT: u32 = 1;
    pub const AOE: u32 = 2;
    pub const DEATH: u32 = 3;
    pub const PLANET: u32 = 4;
    pub const BLOCK: u32 = 5;
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub catalog: Arc<Catalog>,
    pub tuning: Tuning,
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Simulation time in seconds
    pub time: f32,
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub paused: bool,
    pub player: Player,
    /// Owned items in acquisition order
    pub items: Vec<OwnedItem>,
    /// Live enemies (sorted by id)
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub particles: Vec<Particle>,
    pub round: RoundState,
    pub progress: Progress,
    pub offers: Vec<RewardOffer>,
    pub events: Vec<GameEvent>,
    pub screen_shake: f32,
    /// Enemies created this tick, merged at tick end
    pub(crate) spawn_queue: Vec<Enemy>,
    next_id: u32,
    /// Bursts emitted so far; decorrelates bursts within one tick
    burst_seq: u32,
}

impl SimulationState {
    pub fn new(catalog: Arc<Catalog>, tuning: Tuning, seed: u64) -> Self {
        let player = Player::new(&tuning);
        Self {
            catalog,
            tuning,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time: 0.0,
            time_ticks: 0,
            phase: GamePhase::Setup,
            paused: false,
            player,
            items: Vec::new(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            particles: Vec::new(),
            round: RoundState::new(1),
            progress: Progress::default(),
            offers: Vec::new(),
            events: Vec::new(),
            screen_shake: 0.0,
            spawn_queue: Vec::new(),
            next_id: 1,
            burst_seq: 0,
        }
    }

    /// Reset everything for a new run, keeping catalog and tuning
    pub fn restart(&mut self, seed: u64) {
        log::info!("Restarting run with seed {}", seed);
        *self = Self::new(Arc::clone(&self.catalog), self.tuning.clone(), seed);
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Enemies still alive, including ones queued this tick
    pub fn live_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.alive).count()
            + self.spawn_queue.iter().filter(|e| e.alive).count()
    }

    pub fn enemy_index(&self, id: u32) -> Option<usize> {
        self.enemies.iter().position(|e| e.id == id)
    }

    /// Events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn add_shake(&mut self, amount: f32) {
        self.screen_shake = (self.screen_shake + amount).min(1.0);
        self.events.push(GameEvent::CameraShake { intensity: amount });
    }

    /// Merge enemies spawned during the tick into the live set
    pub fn flush_spawns(&mut self) {
        if !self.spawn_queue.is_empty() {
            self.enemies.append(&mut self.spawn_queue);
        }
    }

    /// Drop dead enemies and keep deterministic ordering
    pub fn sweep_dead(&mut self) {
        self.enemies.retain(|e| e.alive);
        self.enemies.sort_by_key(|e| e.id);
        self.projectiles.retain(|p| p.lifetime > 0.0);
    }

    /// Emit a cosmetic burst (hash-seeded so the gameplay RNG is untouched)
    pub fn emit_burst(&mut self, pos: Vec2, color: u32, count: usize, speed: f32) {
        self.burst_seq = self.burst_seq.wrapping_add(1);
        let seed = (self.time_ticks as u32).wrapping_mul(2654435761)
            ^ self.burst_seq.wrapping_mul(0x9E37_79B9)
            ^ pos.x.to_bits().rotate_left(7)
            ^ pos.y.to_bits().rotate_left(19);
        for i in 0..count {
            if self.particles.len() >= self.tuning.max_particles {
                // Remove oldest particles to make room
                self.particles.remove(0);
            }
            let hash = seed.wrapping_add(i as u32 * 7919).wrapping_mul(31337);
            let angle = (hash % 1000) as f32 / 1000.0 * std::f32::consts::TAU;
            let speed_factor = 0.5 + ((hash >> 10) % 1000) as f32 / 1000.0;
            let size = 2.0 + ((hash >> 20) % 100) as f32 / 100.0 * 3.0;
            self.particles.push(Particle {
                pos,
                vel: polar_to_cartesian(speed * speed_factor, angle),
                color,
                life: 1.0,
                size,
            });
        }
    }
}
