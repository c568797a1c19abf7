//! Paper Planet entry point
//!
//! Native builds run a headless demo: scripted orbit, auto-aim, and a
//! greedy reward pick, logging round progress until the planet falls or
//! the round limit is reached. The browser build drives the library
//! through `platform::web::WebGame` instead.

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::sync::Arc;

    use paper_planet::platform::Session;
    use paper_planet::sim::{GameEvent, GamePhase, RewardChoice, select_reward};
    use paper_planet::{Catalog, HighScores, Tuning};

    /// Rendered frame rate the demo pretends to run at
    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Hard stop so a flawless run still ends (one hour of game time)
    const MAX_FRAMES: u64 = 60 * 60 * 60;
    const DEFAULT_SEED: u64 = 42;
    const DEFAULT_MAX_ROUNDS: u32 = 10;

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let mut args = std::env::args().skip(1);
        let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_SEED);
        let max_rounds = args
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_ROUNDS);

        let catalog = Arc::new(Catalog::builtin()?);
        let tuning = match std::env::var("PAPER_PLANET_TUNING") {
            Ok(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
            Err(_) => Tuning::default(),
        };

        let mut session = Session::new(catalog, tuning, seed, HighScores::new());
        log::info!("Headless run: seed {}, up to {} rounds", seed, max_rounds);

        for frame in 0..MAX_FRAMES {
            if session.state.round.round > max_rounds {
                break;
            }
            script_input(&mut session, frame);
            session.frame(FRAME_DT);

            if session.state.phase == GamePhase::Reward {
                pick_reward(&mut session);
            }
            for event in session.drain_events() {
                report(&event);
            }
            if session.state.phase == GamePhase::GameOver {
                break;
            }
        }

        // Survivors still get their score on the board
        if session.state.phase != GamePhase::GameOver {
            use paper_planet::ScoreSink;
            let (score, round) = (session.state.progress.score, session.state.round.round);
            session.sink_mut().submit(score, round);
        }

        let progress = &session.state.progress;
        println!();
        println!("Reached round {}", session.state.round.round);
        println!("Score {}  kills {}  currency {}", progress.score, progress.total_kills, progress.currency);
        let items: Vec<String> = session
            .state
            .items
            .iter()
            .map(|i| format!("{} x{}", i.item_id, i.stacks))
            .collect();
        println!("Items: {}", if items.is_empty() { "none".to_string() } else { items.join(", ") });
        for (rank, entry) in session.sink().entries.iter().enumerate() {
            println!("#{:<2} {:>8}  round {}", rank + 1, entry.score, entry.round);
        }
        Ok(())
    }

    /// Sweep back and forth around the orbit, fire constantly, block now and then
    fn script_input(session: &mut Session<HighScores>, frame: u64) {
        let t = frame as f32 * FRAME_DT;
        let input = session.input_mut();
        input.rotate = (t * 0.4).sin();
        input.aim = None;
        input.fire = true;
        if frame % 180 == 0 {
            input.block = true;
        }
    }

    /// Take the priciest affordable item, otherwise skip
    fn pick_reward(session: &mut Session<HighScores>) {
        let currency = session.state.progress.currency;
        let mut best: Option<(usize, u32)> = None;
        let mut skip = None;
        for (idx, offer) in session.state.offers.iter().enumerate() {
            match &offer.choice {
                RewardChoice::Item { cost, .. } if *cost <= currency => {
                    if best.is_none_or(|(_, c)| *cost > c) {
                        best = Some((idx, *cost));
                    }
                }
                RewardChoice::Item { .. } => {}
                RewardChoice::Skip => skip = Some(idx),
            }
        }
        if let Some(idx) = best.map(|(idx, _)| idx).or(skip) {
            select_reward(&mut session.state, idx);
        }
    }

    fn report(event: &GameEvent) {
        match event {
            GameEvent::RoundCleared { round, timed_out } => {
                log::info!("Round {} {}", round, if *timed_out { "timed out" } else { "cleared" });
            }
            GameEvent::RewardTaken { item_id, cost } => log::info!("Bought {} for {}", item_id, cost),
            GameEvent::RewardSkipped => log::info!("Skipped the reward"),
            GameEvent::GameOver { score } => log::info!("Planet destroyed, final score {}", score),
            _ => {}
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Paper Planet (native) starting...");

    if let Err(err) = demo::run() {
        log::error!("Demo failed: {}", err);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::wasm_start, this is just to satisfy the compiler
}
