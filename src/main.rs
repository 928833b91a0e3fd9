//! Sky Raid headless runner
//!
//! Drives the simulation with a fixed timestep and a scripted pilot, logs the
//! session, and prints the final draw list as JSON. Rendering and device
//! input belong to the embedding front end.
//!
//! Usage: `sky-raid [settings.json] [seed] [easy|normal|hard]`

#[cfg(not(target_arch = "wasm32"))]
use sky_raid::{
    Difficulty, Settings,
    consts::SIM_DT_MS,
    sim::{GameEvent, GameState, TickInput, tick},
};

/// Simulated session length
#[cfg(not(target_arch = "wasm32"))]
const RUN_MS: u64 = 60_000;

/// Pull the trigger every this many ticks
#[cfg(not(target_arch = "wasm32"))]
const FIRE_EVERY: u64 = 6;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let mut settings = match args.next() {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let seed = match args.next() {
        Some(s) => s.parse::<u64>()?,
        None => 0x5EED,
    };
    if let Some(name) = args.next() {
        settings.apply_difficulty(name.parse::<Difficulty>()?);
    }

    log::info!("Sky Raid (headless) starting with seed {}", seed);
    let mut state = GameState::new(seed, settings)?;

    let mut stats = SessionStats::default();
    let mut now = 0;
    while now <= RUN_MS && !state.is_game_over() {
        let input = autopilot(&state);
        tick(&mut state, &input, now, SIM_DT_MS);
        for event in state.drain_events() {
            stats.record(&event);
        }
        now += SIM_DT_MS;
    }

    log::info!(
        "Session ended at {}ms: {} lives, {} shots, {} spawned, {} destroyed, {} hits taken",
        state.now(),
        state.lives,
        stats.shots,
        stats.spawned,
        stats.destroyed,
        stats.hits
    );
    println!("{}", serde_json::to_string_pretty(&state.draw_list())?);
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is embedded by a web front end; nothing to run here
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
struct SessionStats {
    shots: u32,
    spawned: u32,
    destroyed: u32,
    hits: u32,
}

#[cfg(not(target_arch = "wasm32"))]
impl SessionStats {
    fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::ShotFired { .. } => self.shots += 1,
            GameEvent::EnemySpawned { .. } => self.spawned += 1,
            GameEvent::EnemyDestroyed { .. } => self.destroyed += 1,
            GameEvent::PlayerHit { .. } => self.hits += 1,
            GameEvent::EnemyFired { .. } | GameEvent::GameOver => {}
        }
    }
}

/// Slide under the lowest enemy on screen and keep firing
#[cfg(not(target_arch = "wasm32"))]
fn autopilot(state: &GameState) -> TickInput {
    let target = state
        .enemies
        .iter_active()
        .map(|(_, e)| e)
        .filter(|e| e.pos.y > 0.0)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

    let dx = target.map_or(0.0, |e| e.pos.x - state.player.pos.x);
    TickInput {
        left: dx < -8.0,
        right: dx > 8.0,
        fire_pressed: state.time_ticks % FIRE_EVERY == 0,
        ..Default::default()
    }
}
