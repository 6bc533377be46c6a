//! Wall Defense headless driver
//!
//! Plays one stage with a simple bot and prints the session result as JSON.
//!
//! Usage: `wall-defense [config.json] [--stage N] [--difficulty hard] [--seed N]`

#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;
#[cfg(not(target_arch = "wasm32"))]
use wall_defense::{
    ConfigError, Difficulty, GameConfig, SessionSetup,
    consts::*,
    objective_position,
    sim::{Command, GameEvent, SessionState, TickInput, tick},
};

/// Fixed step for the driver loop (~60 Hz)
#[cfg(not(target_arch = "wasm32"))]
const SIM_DT_MS: u64 = 16;
/// Give up after ten simulated minutes
#[cfg(not(target_arch = "wasm32"))]
const MAX_SIM_MS: u64 = 10 * 60 * 1000;
/// Only spend barriers on adversaries this close to the objective
#[cfg(not(target_arch = "wasm32"))]
const BOT_ENGAGE_DISTANCE: f32 = 260.0;
#[cfg(not(target_arch = "wasm32"))]
const BOT_BARRIER_HALF_LENGTH: f32 = 35.0;
#[cfg(not(target_arch = "wasm32"))]
const BOT_LEAD_DISTANCE: f32 = 30.0;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug)]
#[command(
    name = "wall-defense",
    about = "Play one Wall Defense stage with a bot and print the result as JSON"
)]
struct Args {
    /// JSON tables to load instead of the built-in defaults
    config: Option<PathBuf>,

    /// Stage to play
    #[arg(long, default_value_t = 1)]
    stage: u32,

    /// Difficulty tier (normal or hard)
    #[arg(long, default_value_t = Difficulty::Normal)]
    difficulty: Difficulty,

    /// Shorthand for `--difficulty hard`
    #[arg(long, conflicts_with = "difficulty")]
    hard: bool,

    /// Seed for the session RNG
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[cfg(not(target_arch = "wasm32"))]
impl Args {
    fn setup(&self) -> SessionSetup {
        SessionSetup {
            stage_id: self.stage,
            difficulty: if self.hard {
                Difficulty::Hard
            } else {
                self.difficulty
            },
            seed: self.seed,
            ..SessionSetup::default()
        }
    }
}

/// Draw a short barrier across the path of the adversary nearest the objective
#[cfg(not(target_arch = "wasm32"))]
fn bot_commands(state: &SessionState) -> Vec<Command> {
    if !state.can_draw() || state.gesture.is_some() {
        return Vec::new();
    }

    let objective = objective_position();
    let Some(target) = state
        .adversaries
        .iter()
        .filter(|a| a.pos.distance(objective) < BOT_ENGAGE_DISTANCE)
        .min_by(|a, b| a.pos.distance(objective).total_cmp(&b.pos.distance(objective)))
    else {
        return Vec::new();
    };

    let heading = (objective - target.pos).normalize_or_zero();
    let across = heading.perp();
    let center = target.pos + heading * BOT_LEAD_DISTANCE;
    let clamp = |p: glam::Vec2| p.with_y(p.y.clamp(PLAYFIELD_TOP, PLAYFIELD_BOTTOM));

    vec![
        Command::BeginDraw(clamp(center - across * BOT_BARRIER_HALF_LENGTH)),
        Command::ExtendDraw(clamp(center)),
        Command::ExtendDraw(clamp(center + across * BOT_BARRIER_HALF_LENGTH)),
        Command::EndDraw,
    ]
}

#[cfg(not(target_arch = "wasm32"))]
fn run(args: Args) -> Result<(), ConfigError> {
    let config = match &args.config {
        Some(path) => {
            log::info!("Loading tables from {}", path.display());
            GameConfig::load(path)?
        }
        None => GameConfig::default(),
    };

    let mut state = SessionState::new(&config, args.setup())?;
    let mut input = TickInput::default();

    while !state.is_finished() && state.now_ms < MAX_SIM_MS {
        input.commands = bot_commands(&state);
        tick(&mut state, &input, SIM_DT_MS);

        for event in state.drain_events() {
            match event {
                GameEvent::WaveCleared {
                    wave_number,
                    total_waves,
                } => log::info!("Cleared wave {}/{}", wave_number, total_waves),
                GameEvent::ObjectiveDamaged { health, max_health } => {
                    log::info!("Objective hit: {}/{}", health, max_health)
                }
                GameEvent::MultiKill { kill_count, bonus, .. } => {
                    log::info!("Multi-kill x{} (+{})", kill_count, bonus)
                }
                _ => {}
            }
        }
    }

    match state.result.take() {
        Some(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        None => {
            log::warn!("Session still running after {}ms, stopping", state.now_ms);
            state.teardown();
            println!("{}", serde_json::to_string_pretty(&state.snapshot())?);
        }
    }
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    let args = Args::parse();
    env_logger::init();
    log::info!("Wall Defense (headless) starting...");

    if let Err(e) = run(args) {
        log::error!("{}", e);
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is embedded by a host page; nothing to run here
}
