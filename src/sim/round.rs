//! Round flow and enemy spawning
//!
//! `Setup -> Spawning -> Cleared -> Reward -> Setup(round + 1)`, with
//! `GameOver` reachable from anywhere through player damage.

use std::f32::consts::{FRAC_PI_2, TAU};
use std::sync::Arc;

use rand::Rng;

use crate::catalog::{Catalog, ItemSpec, ItemType, RoundSpec, SpawnPattern, Stacking};
use crate::polar_to_cartesian;
use crate::tuning::Tuning;

use super::enemy::spawn_enemy;
use super::state::{GameEvent, GamePhase, OwnedItem, RewardChoice, RewardOffer, RoundState, SimulationState};

/// Outcome of shooting (or selecting) a reward target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewardResult {
    Taken { item_id: String },
    Skipped,
    /// Not enough currency; the offer stays open
    Unaffordable,
    /// Not in the reward phase or no such target
    Invalid,
}

/// Advance the round state machine by one tick
pub fn update_round(state: &mut SimulationState, dt: f32) {
    match state.phase {
        GamePhase::Setup => setup_round(state),
        GamePhase::Spawning => update_spawning(state, dt),
        GamePhase::Cleared => {
            state.round.cleared_timer -= dt;
            if state.round.cleared_timer <= 0.0 {
                open_reward(state);
            }
        }
        GamePhase::Reward | GamePhase::GameOver => {}
    }
}

/// Authored spec for `round`, or one scaled up from the last authored round
pub fn resolve_round_spec(catalog: &Catalog, tuning: &Tuning, round: u32) -> RoundSpec {
    if let Some(spec) = catalog.round(round) {
        return spec.clone();
    }

    match catalog.last_round_before(round) {
        Some(template) => {
            let extra = round.saturating_sub(template.round) as f32;
            let duration = template.duration.unwrap_or(tuning.default_round_duration);
            RoundSpec {
                round,
                budget: template.budget + (tuning.budget_growth_per_round * extra).round() as u32,
                boss: false,
                boss_id: None,
                duration: Some(duration + tuning.duration_growth_per_round * extra),
                ..template.clone()
            }
        }
        None => {
            let extra = round.saturating_sub(1) as f32;
            let pool = catalog
                .enemy_ids()
                .filter(|id| catalog.enemy(id).is_some_and(|e| e.cost > 0))
                .map(str::to_string)
                .collect();
            RoundSpec {
                round,
                budget: (10.0 + tuning.budget_growth_per_round * extra).round() as u32,
                pattern: SpawnPattern::Scatter,
                pool,
                spawn_interval: tuning.default_spawn_interval,
                burst: None,
                boss: false,
                boss_id: None,
                secondary: None,
                duration: Some(tuning.default_round_duration + tuning.duration_growth_per_round * extra),
            }
        }
    }
}

fn setup_round(state: &mut SimulationState) {
    let round = state.round.round;
    if state.catalog.round(round).is_none() {
        log::info!("Round {} is past the schedule, scaling the last authored round", round);
    }
    let spec = resolve_round_spec(&state.catalog, &state.tuning, round);

    state.round.timer = spec.duration.unwrap_or(state.tuning.default_round_duration);
    state.round.budget = spec.budget;
    state.round.spawn_timer = 0.0;
    state.round.secondary_budget = spec.secondary.as_ref().map_or(0, |s| s.budget);
    state.round.secondary_timer = spec.secondary.as_ref().map_or(0.0, |s| s.spawn_interval);
    state.phase = GamePhase::Spawning;

    if spec.boss {
        match &spec.boss_id {
            Some(boss) => {
                let angle = state.rng.random_range(0.0..TAU);
                let pos = polar_to_cartesian(state.tuning.enemy_spawn_radius, angle);
                spawn_enemy(state, boss, pos);
            }
            None => log::warn!("Round {} is a boss round without a boss id", round),
        }
    }

    log::info!(
        "Round {} started: budget {}, {:.0}s{}",
        round,
        spec.budget,
        state.round.timer,
        if spec.boss { ", boss" } else { "" }
    );
    state.round.spec = Some(spec);
    state.events.push(GameEvent::RoundStarted { round });
}

fn update_spawning(state: &mut SimulationState, dt: f32) {
    let Some(spec) = state.round.spec.take() else {
        state.phase = GamePhase::Setup;
        return;
    };

    state.round.timer -= dt;

    state.round.spawn_timer -= dt;
    if state.round.budget > 0 && state.round.spawn_timer <= 0.0 {
        state.round.spawn_timer = spec.spawn_interval.max(0.05);
        let burst = spec.burst.unwrap_or(1).max(1);
        let budget = state.round.budget;
        state.round.budget = spawn_wave(state, &spec.pool, spec.pattern, burst, budget);
    }

    if let Some(secondary) = &spec.secondary {
        state.round.secondary_timer -= dt;
        if state.round.secondary_budget > 0 && state.round.secondary_timer <= 0.0 {
            state.round.secondary_timer = secondary.spawn_interval.max(0.05);
            let budget = state.round.secondary_budget;
            state.round.secondary_budget = spawn_wave(state, &secondary.pool, SpawnPattern::Scatter, 1, budget);
        }
    }

    state.round.spec = Some(spec);

    let exhausted = state.round.remaining_budget() == 0 && state.live_enemy_count() == 0;
    if exhausted || state.round.timer <= 0.0 {
        clear_round(state, !exhausted);
    }
}

/// One spawn event. Returns the budget left afterward.
fn spawn_wave(state: &mut SimulationState, pool: &[String], pattern: SpawnPattern, burst: u32, budget: u32) -> u32 {
    let catalog = Arc::clone(&state.catalog);
    let radius = state.tuning.enemy_spawn_radius;
    let base_angle = state.rng.random_range(0.0..TAU);
    let mut budget = budget;

    for k in 0..burst {
        if state.live_enemy_count() >= state.tuning.max_enemies {
            log::debug!("Enemy cap reached, holding spawn budget {}", budget);
            break;
        }
        let Some((id, cost)) = pick_affordable(&mut state.rng, &catalog, pool, budget) else {
            // Nothing left in the pool fits the budget
            budget = 0;
            break;
        };
        let angle = match pattern {
            SpawnPattern::Scatter if k > 0 => state.rng.random_range(0.0..TAU),
            SpawnPattern::Scatter => base_angle,
            SpawnPattern::Cluster => base_angle + state.rng.random_range(-0.25..0.25),
            SpawnPattern::Ring => base_angle + k as f32 / burst as f32 * TAU,
        };
        if spawn_enemy(state, &id, polar_to_cartesian(radius, angle)).is_some() {
            budget = budget.saturating_sub(cost);
        }
    }
    budget
}

/// Pick an affordable enemy from `pool`, weighted by 1 / cost.
///
/// Returns the id and the cost to deduct (at least 1, so zero-cost entries
/// still drain the budget). Unknown ids are skipped.
pub fn pick_affordable<R: Rng>(rng: &mut R, catalog: &Catalog, pool: &[String], budget: u32) -> Option<(String, u32)> {
    let candidates: Vec<(&str, u32)> = pool
        .iter()
        .filter_map(|id| catalog.enemy(id))
        .map(|spec| (spec.id.as_str(), spec.cost.max(1)))
        .filter(|(_, cost)| *cost <= budget)
        .collect();
    let (last_id, last_cost) = *candidates.last()?;

    let total: f32 = candidates.iter().map(|(_, cost)| 1.0 / *cost as f32).sum();
    let mut roll = rng.random_range(0.0..total);
    for (id, cost) in &candidates {
        let weight = 1.0 / *cost as f32;
        if roll < weight {
            return Some((id.to_string(), *cost));
        }
        roll -= weight;
    }
    Some((last_id.to_string(), last_cost))
}

fn clear_round(state: &mut SimulationState, timed_out: bool) {
    let round = state.round.round;
    log::info!(
        "Round {} cleared ({} kills{})",
        round,
        state.round.kills,
        if timed_out { ", timer expired" } else { "" }
    );
    state.enemies.clear();
    state.spawn_queue.clear();
    state.projectiles.clear();
    state.round.cleared_timer = state.tuning.cleared_delay;
    state.phase = GamePhase::Cleared;
    state.events.push(GameEvent::RoundCleared { round, timed_out });
}

fn open_reward(state: &mut SimulationState) {
    let banked = state.progress.bank_combo();
    let item_ids = roll_offers(state);

    let mut choices: Vec<RewardChoice> = item_ids
        .iter()
        .filter_map(|id| state.catalog.item(id))
        .map(|item| RewardChoice::Item {
            item_id: item.id.clone(),
            cost: state.tuning.rarity_costs.cost(item.rarity),
        })
        .collect();
    choices.push(RewardChoice::Skip);

    let count = choices.len();
    let distance = state.tuning.reward_target_distance;
    let radius = state.tuning.reward_target_radius;
    state.offers = choices
        .into_iter()
        .enumerate()
        .map(|(k, choice)| RewardOffer {
            choice,
            pos: polar_to_cartesian(distance, FRAC_PI_2 + k as f32 / count as f32 * TAU),
            radius,
        })
        .collect();

    log::info!(
        "Reward offered after round {}: banked {} combo, {} currency",
        state.round.round,
        banked,
        state.progress.currency
    );
    state.phase = GamePhase::Reward;
    state.events.push(GameEvent::RewardOffered { item_ids });
}

fn offer_eligible(items: &[OwnedItem], item: &ItemSpec) -> bool {
    let Some(owned) = items.iter().find(|o| o.item_id == item.id) else {
        return true;
    };
    match item.stacking {
        Stacking::Unique => false,
        Stacking::Stackable => item.max_stacks.is_none_or(|max| owned.stacks < max),
    }
}

/// Weighted draw (by rarity) without replacement
fn roll_offers(state: &mut SimulationState) -> Vec<String> {
    let catalog = Arc::clone(&state.catalog);
    let round = state.round.round;
    let mut pool: Vec<(&ItemSpec, f32)> = catalog
        .items()
        .filter(|item| offer_eligible(&state.items, item))
        .map(|item| (item, state.tuning.rarity_weight(item.rarity, round)))
        .filter(|(_, weight)| *weight > 0.0)
        .collect();

    let mut picks = Vec::new();
    while picks.len() < state.tuning.reward_offer_count && !pool.is_empty() {
        let total: f32 = pool.iter().map(|(_, w)| w).sum();
        let mut roll = state.rng.random_range(0.0..total);
        let mut chosen = pool.len() - 1;
        for (i, (_, weight)) in pool.iter().enumerate() {
            if roll < *weight {
                chosen = i;
                break;
            }
            roll -= weight;
        }
        let (item, _) = pool.remove(chosen);
        picks.push(item.id.clone());
    }
    picks
}

/// Take (or skip) the reward target at `idx`
pub fn select_reward(state: &mut SimulationState, idx: usize) -> RewardResult {
    if state.phase != GamePhase::Reward {
        return RewardResult::Invalid;
    }
    let Some(offer) = state.offers.get(idx) else {
        return RewardResult::Invalid;
    };

    let result = match offer.choice.clone() {
        RewardChoice::Item { item_id, cost } => {
            if state.progress.currency < cost {
                state.events.push(GameEvent::RewardUnaffordable { item_id, cost });
                return RewardResult::Unaffordable;
            }
            state.progress.currency -= cost;
            expire_temporaries(state);
            acquire_item(state, &item_id);
            log::info!("Took '{}' for {}", item_id, cost);
            state.events.push(GameEvent::RewardTaken {
                item_id: item_id.clone(),
                cost,
            });
            RewardResult::Taken { item_id }
        }
        RewardChoice::Skip => {
            expire_temporaries(state);
            state.events.push(GameEvent::RewardSkipped);
            RewardResult::Skipped
        }
    };

    state.offers.clear();
    state.round = RoundState::new(state.round.round + 1);
    state.phase = GamePhase::Setup;
    result
}

/// Count temporary items down one round and drop the expired ones
fn expire_temporaries(state: &mut SimulationState) {
    state.items.retain_mut(|owned| match owned.rounds_left.as_mut() {
        Some(left) => {
            *left = left.saturating_sub(1);
            if *left == 0 {
                log::info!("Temporary item '{}' expired", owned.item_id);
            }
            *left > 0
        }
        None => true,
    });
}

/// Add an item to the inventory following its stacking policy
pub fn acquire_item(state: &mut SimulationState, item_id: &str) {
    let Some(spec) = state.catalog.item(item_id) else {
        log::warn!("Unknown item '{}' not acquired", item_id);
        return;
    };
    let rounds_left = match spec.item_type {
        ItemType::Temporary => Some(spec.duration_rounds.max(1)),
        ItemType::Permanent => None,
    };
    let max_stacks = spec.max_stacks.unwrap_or(u32::MAX).max(1);
    let stacking = spec.stacking;

    match state.items.iter_mut().find(|o| o.item_id == item_id) {
        Some(owned) => {
            owned.stacks = match stacking {
                Stacking::Unique => 1,
                Stacking::Stackable => owned.stacks.saturating_add(1).min(max_stacks),
            };
            owned.rounds_left = rounds_left;
        }
        None => state.items.push(OwnedItem {
            item_id: item_id.to_string(),
            stacks: 1,
            rounds_left,
        }),
    }
}
