//! Status effect engine
//!
//! Each (enemy, effect id) pair is either absent or active with a stack
//! count and a remaining duration. Re-applying refreshes the duration to the
//! spec default; it never extends it.

use crate::catalog::{Catalog, StatusCategory};

use super::state::{ActiveEffect, Enemy};

/// Aggregate effect of an enemy's statuses for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusTick {
    /// Damage-over-time dealt this tick
    pub damage: f32,
    /// Product of active slows (this tick only)
    pub speed_multiplier: f32,
    pub stunned: bool,
}

impl Default for StatusTick {
    fn default() -> Self {
        Self {
            damage: 0.0,
            speed_multiplier: 1.0,
            stunned: false,
        }
    }
}

/// Apply (or refresh) a status effect. Returns false for unknown ids.
pub fn apply_status_effect(enemy: &mut Enemy, catalog: &Catalog, id: &str, stacks: u32) -> bool {
    let Some(spec) = catalog.status(id) else {
        log::warn!("Unknown status effect '{}' skipped", id);
        return false;
    };
    let incoming = stacks.max(1);
    let max_stacks = spec.max_stacks.max(1);

    enemy
        .effects
        .entry(id.to_string())
        .and_modify(|active| {
            active.stacks = (active.stacks + incoming).min(max_stacks);
            active.remaining = spec.duration;
        })
        .or_insert(ActiveEffect {
            stacks: incoming.min(max_stacks),
            remaining: spec.duration,
        });
    true
}

/// Age every effect by `dt` and report what the survivors do this tick
pub fn tick_status_effects(enemy: &mut Enemy, catalog: &Catalog, dt: f32) -> StatusTick {
    let mut out = StatusTick::default();

    enemy.effects.retain(|id, active| {
        active.remaining -= dt;
        if active.remaining <= 0.0 {
            return false;
        }
        let Some(spec) = catalog.status(id) else {
            return false;
        };
        match spec.category {
            StatusCategory::Dot => {
                let extra = active.stacks.saturating_sub(1) as f32;
                out.damage += (spec.damage_per_second + spec.damage_per_stack * extra) * dt;
            }
            StatusCategory::Debuff => {
                out.speed_multiplier *= spec.speed_multiplier;
            }
            StatusCategory::Stun => {
                // Only the tail of the window stuns
                if active.remaining <= spec.stun_duration {
                    out.stunned = true;
                }
            }
            StatusCategory::Unknown => {}
        }
        true
    });

    out.speed_multiplier = out.speed_multiplier.max(0.0);
    out
}

/// Damage-taken multiplier from active debuffs ("mark")
pub fn damage_taken_multiplier(enemy: &Enemy, catalog: &Catalog) -> f32 {
    enemy
        .effects
        .keys()
        .filter_map(|id| catalog.status(id))
        .filter(|spec| spec.category == StatusCategory::Debuff)
        .map(|spec| spec.damage_multiplier)
        .product()
}
