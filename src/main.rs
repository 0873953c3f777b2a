//! Goal Rush headless demo
//!
//! Runs the engine for a fixed number of simulated frames and prints the
//! recorded events as JSON. Usage: `goal-rush [settings.json]`

use std::cell::RefCell;
use std::rc::Rc;

use goal_rush::sim::{BallEngine, EventLog, EventSink};
use goal_rush::{Result, Settings};

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Goal Rush (native) starting...");

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on the web; nothing to run here
}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> Result<()> {
    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(path)?,
        None => {
            log::info!("No settings file given, using defaults");
            Settings::default()
        }
    };

    let mut engine = BallEngine::from_settings(&settings)?;
    let events = Rc::new(RefCell::new(EventLog::new()));
    engine.set_call_back(EventSink::new(events.clone()));
    engine.reset(0, settings.num_balls)?;

    let mut departed = 0;
    for frame in 1..=u64::from(settings.frames) {
        engine.update(frame * settings.frame_ms)?;
        departed += engine.take_departed().len();
    }

    let elapsed = u64::from(settings.frames) * settings.frame_ms;
    {
        let events = events.borrow();
        log::info!(
            "{}ms simulated: {} goals, {} hits, {} exits",
            elapsed,
            events.goal_count(),
            events.hit_count(),
            events.exit_count()
        );
    }
    log::info!(
        "Outer region holds {} balls, goal holds {}, {} left the field",
        engine.region()?.len(),
        engine.goal_region()?.len(),
        departed
    );

    println!("{}", serde_json::to_string_pretty(&*events.borrow())?);
    Ok(())
}
