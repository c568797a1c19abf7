//! Immutable data catalog
//!
//! Bullet, enemy, item, status-effect and round tables, supplied wholesale at
//! startup and shared read-only by the simulation for the rest of the run.
//! Lookups of unknown ids return `None`; callers log and skip.

pub mod specs;

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

pub use specs::*;

/// Default catalog shipped with the crate
const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.json");

/// Catalog / tuning load failures
#[derive(Debug)]
pub enum CatalogError {
    /// Malformed JSON or a required field missing
    Parse(serde_json::Error),
    /// Two entries in one table share an id
    DuplicateId { table: &'static str, id: String },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Parse(err) => write!(f, "catalog parse error: {}", err),
            CatalogError::DuplicateId { table, id } => {
                write!(f, "duplicate id '{}' in {} table", id, table)
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Parse(err) => Some(err),
            CatalogError::DuplicateId { .. } => None,
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Parse(err)
    }
}

/// On-disk layout: one array per table
#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    bullets: Vec<BulletSpec>,
    #[serde(default)]
    enemies: Vec<EnemySpec>,
    #[serde(default)]
    items: Vec<ItemSpec>,
    #[serde(default)]
    status_effects: Vec<StatusEffectSpec>,
    #[serde(default)]
    rounds: Vec<RoundSpec>,
}

/// Indexed, read-only game data
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    bullets: BTreeMap<String, BulletSpec>,
    enemies: BTreeMap<String, EnemySpec>,
    items: BTreeMap<String, ItemSpec>,
    statuses: BTreeMap<String, StatusEffectSpec>,
    /// Sorted by round number
    rounds: Vec<RoundSpec>,
}

fn index<T>(
    table: &'static str,
    entries: Vec<T>,
    id_of: impl Fn(&T) -> &str,
) -> Result<BTreeMap<String, T>, CatalogError> {
    let mut map = BTreeMap::new();
    for entry in entries {
        let id = id_of(&entry).to_string();
        if map.contains_key(&id) {
            return Err(CatalogError::DuplicateId { table, id });
        }
        map.insert(id, entry);
    }
    Ok(map)
}

impl Catalog {
    /// Parse and index a catalog. Dangling cross-references are logged, not rejected.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;

        let mut rounds = file.rounds;
        rounds.sort_by_key(|r| r.round);
        if let Some(pair) = rounds.windows(2).find(|w| w[0].round == w[1].round) {
            return Err(CatalogError::DuplicateId {
                table: "rounds",
                id: pair[0].round.to_string(),
            });
        }

        let catalog = Self {
            bullets: index("bullets", file.bullets, |b| b.id.as_str())?,
            enemies: index("enemies", file.enemies, |e| e.id.as_str())?,
            items: index("items", file.items, |i| i.id.as_str())?,
            statuses: index("status_effects", file.status_effects, |s| s.id.as_str())?,
            rounds,
        };

        for problem in catalog.validate() {
            log::warn!("Catalog: {}", problem);
        }
        log::info!(
            "Catalog loaded: {} bullets, {} enemies, {} items, {} statuses, {} rounds",
            catalog.bullets.len(),
            catalog.enemies.len(),
            catalog.items.len(),
            catalog.statuses.len(),
            catalog.rounds.len()
        );

        Ok(catalog)
    }

    /// The catalog bundled in `data/catalog.json`
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn bullet(&self, id: &str) -> Option<&BulletSpec> {
        self.bullets.get(id)
    }

    pub fn enemy(&self, id: &str) -> Option<&EnemySpec> {
        self.enemies.get(id)
    }

    pub fn item(&self, id: &str) -> Option<&ItemSpec> {
        self.items.get(id)
    }

    pub fn status(&self, id: &str) -> Option<&StatusEffectSpec> {
        self.statuses.get(id)
    }

    /// Authored spec for a round, if the schedule covers it
    pub fn round(&self, round: u32) -> Option<&RoundSpec> {
        self.rounds.iter().find(|r| r.round == round)
    }

    /// Last authored round at or before `round` (template for synthesized rounds)
    pub fn last_round_before(&self, round: u32) -> Option<&RoundSpec> {
        self.rounds.iter().rev().find(|r| r.round <= round)
    }

    pub fn enemy_ids(&self) -> impl Iterator<Item = &str> {
        self.enemies.keys().map(String::as_str)
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemSpec> {
        self.items.values()
    }

    /// Describe every cross-table reference that points nowhere
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for bullet in self.bullets.values() {
            for trigger in &bullet.status_effects {
                if !self.statuses.contains_key(&trigger.effect) {
                    problems.push(format!(
                        "bullet '{}' applies unknown status '{}'",
                        bullet.id, trigger.effect
                    ));
                }
            }
            if let Some(spawn) = &bullet.on_hit_spawn {
                if !self.bullets.contains_key(&spawn.bullet) {
                    problems.push(format!(
                        "bullet '{}' spawns unknown bullet '{}'",
                        bullet.id, spawn.bullet
                    ));
                }
            }
        }

        for enemy in self.enemies.values() {
            if let Some(spawn) = &enemy.on_death {
                if !self.enemies.contains_key(&spawn.enemy) {
                    problems.push(format!(
                        "enemy '{}' spawns unknown enemy '{}' on death",
                        enemy.id, spawn.enemy
                    ));
                }
            }
            if let Some(bullet) = enemy.ranged.as_ref().and_then(|r| r.bullet.as_ref()) {
                if !self.bullets.contains_key(bullet) {
                    problems.push(format!(
                        "enemy '{}' fires unknown bullet '{}'",
                        enemy.id, bullet
                    ));
                }
            }
        }

        for item in self.items.values() {
            self.validate_effects(&item.id, &item.effects, &mut problems);
        }

        for round in &self.rounds {
            let secondary = round.secondary.iter().flat_map(|s| s.pool.iter());
            for id in round.pool.iter().chain(secondary).chain(round.boss_id.iter()) {
                if !self.enemies.contains_key(id) {
                    problems.push(format!(
                        "round {} references unknown enemy '{}'",
                        round.round, id
                    ));
                }
            }
        }

        problems
    }

    fn validate_effects(&self, item_id: &str, effects: &[ItemEffect], problems: &mut Vec<String>) {
        for effect in effects {
            let bullet = match effect {
                ItemEffect::OnShotSpawn { bullet, .. } | ItemEffect::ReplaceBullet { bullet } => {
                    Some(bullet)
                }
                ItemEffect::OnShotCount { action, .. } | ItemEffect::OnKillCount { action, .. } => {
                    match action {
                        TriggerAction::SpawnBullets { bullet, .. } => Some(bullet),
                        _ => None,
                    }
                }
                ItemEffect::ConditionalByTag { effects, .. } => {
                    self.validate_effects(item_id, effects, problems);
                    None
                }
                ItemEffect::Unknown => {
                    problems.push(format!("item '{}' has an effect of unknown kind", item_id));
                    None
                }
                _ => None,
            };
            if let Some(bullet) = bullet {
                if !self.bullets.contains_key(bullet) {
                    problems.push(format!(
                        "item '{}' references unknown bullet '{}'",
                        item_id, bullet
                    ));
                }
            }
        }
    }
}
