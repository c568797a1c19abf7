//! Stat resolution from owned items
//!
//! Stats are never cached: items change between rounds (and temporary items
//! expire), so every read folds the current item list again.

use crate::catalog::{Catalog, ItemEffect, StatKind};
use crate::tuning::BaseStats;

use super::state::{OwnedItem, SimulationState};

/// Flatten owned items into their active effects, in acquisition order.
///
/// `conditional_by_tag` effects are expanded in place when their tag
/// requirement holds. Unknown item ids are skipped.
pub fn active_effects<'a>(items: &[OwnedItem], catalog: &'a Catalog) -> Vec<(&'a ItemEffect, u32)> {
    let mut out = Vec::new();
    for owned in items {
        let Some(spec) = catalog.item(&owned.item_id) else {
            log::warn!("Owned item '{}' missing from catalog", owned.item_id);
            continue;
        };
        expand(&spec.effects, owned.stacks, items, catalog, &mut out);
    }
    out
}

fn expand<'a>(
    effects: &'a [ItemEffect],
    stacks: u32,
    items: &[OwnedItem],
    catalog: &Catalog,
    out: &mut Vec<(&'a ItemEffect, u32)>,
) {
    for effect in effects {
        match effect {
            ItemEffect::ConditionalByTag {
                tag,
                min_count,
                effects,
            } => {
                if tag_count(items, catalog, tag) >= *min_count {
                    expand(effects, stacks, items, catalog, out);
                }
            }
            _ => out.push((effect, stacks)),
        }
    }
}

/// Number of owned items carrying `tag` (stacks do not count twice)
pub fn tag_count(items: &[OwnedItem], catalog: &Catalog, tag: &str) -> u32 {
    items
        .iter()
        .filter_map(|owned| catalog.item(&owned.item_id))
        .filter(|spec| spec.has_tag(tag))
        .count() as u32
}

/// Resolve a live stat: `(base + Σadd) × Πmult`.
///
/// A `stat_set` effect returns its value immediately, so only effects from
/// items acquired before it have been folded at that point and anything
/// after it is ignored.
pub fn resolve_stat(base: &BaseStats, items: &[OwnedItem], catalog: &Catalog, stat: StatKind) -> f32 {
    let mut additive = 0.0;
    let mut multiplicative = 1.0;

    for (effect, stacks) in active_effects(items, catalog) {
        match effect {
            ItemEffect::StatAdd { stat: s, value } if *s == stat => {
                additive += value * stacks as f32;
            }
            ItemEffect::StatMult { stat: s, value } if *s == stat => {
                multiplicative *= value.powi(stacks as i32);
            }
            ItemEffect::StatSet { stat: s, value } if *s == stat => {
                return *value;
            }
            _ => {}
        }
    }

    (base.get(stat) + additive) * multiplicative
}

impl SimulationState {
    /// Current value of a player stat
    pub fn stat(&self, stat: StatKind) -> f32 {
        resolve_stat(&self.player.base, &self.items, &self.catalog, stat)
    }

    /// Bullet the player's weapon fires (last `replace_bullet` wins)
    pub fn player_bullet_id(&self) -> String {
        active_effects(&self.items, &self.catalog)
            .into_iter()
            .filter_map(|(effect, _)| match effect {
                ItemEffect::ReplaceBullet { bullet } => Some(bullet.clone()),
                _ => None,
            })
            .last()
            .unwrap_or_else(|| self.tuning.player_bullet.clone())
    }
}
