//! Frame clock
//!
//! Turns variable frame deltas into fixed `SIM_DT` ticks.

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

use super::state::SimulationState;
use super::tick::{TickInput, tick};

#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run as many fixed ticks as the frame covers. One-shot intents
    /// (block, pause) are cleared once a tick has consumed them.
    /// Returns the number of ticks run.
    pub fn advance(&mut self, state: &mut SimulationState, input: &mut TickInput, frame_dt: f32) -> u32 {
        let dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(state, input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            input.block = false;
            input.pause = false;
        }

        // Drop any backlog the substep cap could not absorb
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }

    /// Forget accumulated time (after a restart or a long stall)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
