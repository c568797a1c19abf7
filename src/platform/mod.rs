//! Platform abstraction layer
//!
//! `Session` is the host-side loop shared by the native demo and the
//! browser build: it owns the frame clock, the pending input and the
//! score sink. Browser bindings live in `web`.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::highscores::ScoreSink;
use crate::sim::{FrameClock, GameEvent, GamePhase, SimulationState, Snapshot, TickInput};
use crate::tuning::Tuning;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub struct Session<S: ScoreSink> {
    pub state: SimulationState,
    clock: FrameClock,
    input: TickInput,
    sink: S,
    /// Final score already forwarded for this run
    submitted: bool,
}

impl<S: ScoreSink> Session<S> {
    pub fn new(catalog: Arc<Catalog>, tuning: Tuning, seed: u64, sink: S) -> Self {
        Self {
            state: SimulationState::new(catalog, tuning, seed),
            clock: FrameClock::new(),
            input: TickInput::default(),
            sink,
            submitted: false,
        }
    }

    /// Input applied to the next frame. One-shot flags stay set until a
    /// tick consumes them.
    pub fn input_mut(&mut self) -> &mut TickInput {
        &mut self.input
    }

    /// Advance by one rendered frame; returns the ticks run
    pub fn frame(&mut self, frame_dt: f32) -> u32 {
        let steps = self.clock.advance(&mut self.state, &mut self.input, frame_dt);

        if self.state.phase == GamePhase::GameOver && !self.submitted {
            self.submitted = true;
            let (score, round) = (self.state.progress.score, self.state.round.round);
            self.sink.submit(score, round);
        }
        steps
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state)
    }

    pub fn restart(&mut self, seed: u64) {
        self.state.restart(seed);
        self.clock.reset();
        self.input = TickInput::default();
        self.submitted = false;
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}
