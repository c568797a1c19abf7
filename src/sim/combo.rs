//! Combo counter and currency
//!
//! Kills grow the combo superlinearly; once the decay timer runs out it
//! bleeds off at a fixed rate. At the reward screen it is banked as currency.

use crate::tuning::Tuning;

use super::state::Progress;

impl Progress {
    /// Grow the combo for one kill and re-arm the decay timer
    pub fn register_kill(&mut self, tuning: &Tuning) {
        self.combo += 1.0 + (self.combo * tuning.combo_growth).floor();
        self.combo_timer = tuning.combo_window;
    }

    /// Count the decay timer down, then decay the combo toward zero
    pub fn update_combo(&mut self, tuning: &Tuning, dt: f32) {
        if self.combo_timer > 0.0 {
            self.combo_timer = (self.combo_timer - dt).max(0.0);
            return;
        }
        self.combo = (self.combo - tuning.combo_decay_rate * dt).max(0.0);
    }

    /// Convert the combo to currency and reset it. Returns the amount banked.
    pub fn bank_combo(&mut self) -> u32 {
        let banked = self.combo.max(0.0).floor() as u32;
        self.currency = self.currency.saturating_add(banked);
        self.combo = 0.0;
        self.combo_timer = 0.0;
        banked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use proptest::prelude::*;

    #[test]
    fn test_combo_grows_superlinearly() {
        let tuning = Tuning::default();
        let mut progress = Progress::default();
        let mut gains = Vec::new();
        for _ in 0..25 {
            let before = progress.combo;
            progress.register_kill(&tuning);
            gains.push(progress.combo - before);
        }
        assert_eq!(gains[0], 1.0);
        assert!(gains.windows(2).all(|w| w[1] >= w[0]));
        assert!(gains[24] > 1.0);
    }

    #[test]
    fn test_combo_holds_until_timer_expires() {
        let tuning = Tuning::default();
        let mut progress = Progress::default();
        progress.register_kill(&tuning);
        progress.register_kill(&tuning);
        let held = progress.combo;

        progress.update_combo(&tuning, tuning.combo_window * 0.5);
        assert_eq!(progress.combo, held);

        progress.update_combo(&tuning, tuning.combo_window);
        progress.update_combo(&tuning, 0.25);
        assert!((progress.combo - (held - tuning.combo_decay_rate * 0.25)).abs() < 1e-5);
    }

    #[test]
    fn test_bank_combo_converts_and_resets() {
        let tuning = Tuning::default();
        let mut progress = Progress {
            currency: 4,
            ..Default::default()
        };
        for _ in 0..3 {
            progress.register_kill(&tuning);
        }
        assert_eq!(progress.bank_combo(), 3);
        assert_eq!(progress.currency, 7);
        assert_eq!(progress.combo, 0.0);
    }

    proptest! {
        #[test]
        fn prop_combo_decay_monotone_and_non_negative(kills in 0usize..40, steps in 1usize..2000) {
            let tuning = Tuning::default();
            let mut progress = Progress::default();
            for _ in 0..kills {
                progress.register_kill(&tuning);
            }
            progress.combo_timer = 0.0;

            let mut last = progress.combo;
            for _ in 0..steps {
                progress.update_combo(&tuning, SIM_DT);
                prop_assert!(progress.combo <= last);
                prop_assert!(progress.combo >= 0.0);
                last = progress.combo;
            }
        }
    }
}
