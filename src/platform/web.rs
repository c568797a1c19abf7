//! Browser bindings
//!
//! The page owns rendering, audio and input devices; it feeds one `frame`
//! call per animation frame and reads back JSON snapshots and events.

use std::sync::Arc;

use glam::Vec2;
use wasm_bindgen::prelude::*;

use crate::catalog::Catalog;
use crate::highscores::HighScores;
use crate::sim::{RewardResult, select_reward};
use crate::tuning::Tuning;

use super::Session;

fn js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Already installed by an earlier module instance
        return;
    }
    log::info!("Paper Planet core loaded");
}

#[wasm_bindgen]
pub struct WebGame {
    session: Session<HighScores>,
}

impl WebGame {
    fn build(catalog: Catalog, tuning: Tuning, seed: u64) -> WebGame {
        log::info!("Starting run with seed {}", seed);
        WebGame {
            session: Session::new(Arc::new(catalog), tuning, seed, HighScores::new()),
        }
    }
}

#[wasm_bindgen]
impl WebGame {
    /// New run with the bundled catalog and default tuning
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Result<WebGame, JsValue> {
        let catalog = Catalog::builtin().map_err(js_err)?;
        Ok(Self::build(catalog, Tuning::default(), seed))
    }

    /// New run from host-supplied catalog and tuning JSON
    pub fn with_data(catalog_json: &str, tuning_json: Option<String>, seed: u64) -> Result<WebGame, JsValue> {
        let catalog = Catalog::from_json(catalog_json).map_err(js_err)?;
        let tuning = match tuning_json {
            Some(json) => Tuning::from_json(&json).map_err(js_err)?,
            None => Tuning::default(),
        };
        Ok(Self::build(catalog, tuning, seed))
    }

    /// Advance one animation frame. `has_aim` selects manual aim along
    /// (`aim_x`, `aim_y`); otherwise shots auto-aim. `block` and `pause`
    /// are edge-triggered. Returns the number of ticks run.
    #[allow(clippy::too_many_arguments)]
    pub fn frame(
        &mut self,
        dt: f32,
        rotate: f32,
        has_aim: bool,
        aim_x: f32,
        aim_y: f32,
        fire: bool,
        block: bool,
        pause: bool,
    ) -> u32 {
        let input = self.session.input_mut();
        input.rotate = rotate.clamp(-1.0, 1.0);
        input.aim = has_aim.then(|| Vec2::new(aim_x, aim_y));
        input.fire = fire;
        input.block |= block;
        input.pause |= pause;
        self.session.frame(dt)
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        self.session.snapshot().to_json().map_err(js_err)
    }

    pub fn drain_events_json(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.drain_events()).map_err(js_err)
    }

    /// Pick a reward target without shooting it (menus, keyboard)
    pub fn select_reward(&mut self, index: usize) -> bool {
        !matches!(
            select_reward(&mut self.session.state, index),
            RewardResult::Invalid | RewardResult::Unaffordable
        )
    }

    pub fn restart(&mut self, seed: u64) {
        self.session.restart(seed);
    }

    pub fn high_scores_json(&self) -> Result<String, JsValue> {
        self.session.sink().to_json().map_err(js_err)
    }

    /// Restore a leaderboard the page persisted earlier
    pub fn load_high_scores(&mut self, json: &str) -> Result<(), JsValue> {
        *self.session.sink_mut() = HighScores::from_json(json).map_err(js_err)?;
        Ok(())
    }
}
