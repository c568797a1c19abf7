//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod behavior;
pub mod clock;
pub mod combo;
pub mod enemy;
pub mod player;
pub mod projectile;
pub mod round;
pub mod snapshot;
pub mod state;
pub mod stats;
pub mod status;
pub mod tick;

#[cfg(test)]
pub(crate) mod test_support;

pub use clock::FrameClock;
pub use enemy::{DamageOutcome, HitContext, damage_enemy, kill_enemy, spawn_enemy};
pub use player::damage_player;
pub use round::{RewardResult, pick_affordable, select_reward};
pub use snapshot::Snapshot;
pub use state::{
    ActiveEffect, BehaviorState, DamageTarget, Enemy, GameEvent, GamePhase, OwnedItem, Owner,
    Player, Progress, Projectile, RewardChoice, RewardOffer, RoundState, SimulationState,
};
pub use stats::resolve_stat;
pub use status::{StatusTick, apply_status_effect, tick_status_effects};
pub use tick::{TickInput, tick};
