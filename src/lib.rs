//! Wall Defense - wave/combat simulation core
//!
//! The player draws short-lived barriers to stop adversaries converging on a
//! central objective. Everything here is headless and deterministic for a
//! given seed and input stream.
//!
//! Core modules:
//! - `sim`: Barriers, adversaries, waves, collision resolution, session control
//! - `config`: Data-driven adversary/barrier/stage tables and upgrades
//! - `results`: End-of-session grading
//! - `error`: Error taxonomy

pub mod config;
pub mod error;
pub mod results;
pub mod sim;

pub use config::{Difficulty, GameConfig, SessionSetup, Upgrades};
pub use error::{ConfigError, SimError};
pub use results::{Bonuses, EconomyRank, Outcome, SessionResult};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Playfield dimensions (pixels)
    pub const PLAYFIELD_WIDTH: f32 = 800.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;
    /// Drawable band: below the top HUD strip, above the bottom HUD strip
    pub const PLAYFIELD_TOP: f32 = 50.0;
    pub const PLAYFIELD_BOTTOM: f32 = 550.0;

    /// Objective sits in the middle of the playfield
    pub const OBJECTIVE_X: f32 = 400.0;
    pub const OBJECTIVE_Y: f32 = 300.0;
    /// Objective radius + adversary radius used for the arrival check
    pub const OBJECTIVE_REACH_DISTANCE: f32 = 40.0;

    /// Barrier geometry
    pub const BARRIER_THICKNESS: f32 = 16.0;
    pub const BARRIER_HALF_THICKNESS: f32 = BARRIER_THICKNESS / 2.0;
    pub const BARRIER_MIN_LENGTH: f32 = 50.0;
    /// Barrier lifetime before upgrades (ms)
    pub const BARRIER_BASE_DURATION_MS: u64 = 5000;
    /// Simultaneous barriers before upgrades
    pub const BARRIER_BASE_CAP: usize = 3;

    /// Drawing gesture
    pub const DRAW_COOLDOWN_MS: u64 = 500;
    pub const DRAW_POINT_SPACING: f32 = 5.0;

    /// Status effects (ms)
    pub const STUN_DURATION_MS: u64 = 500;
    pub const DEFAULT_SLOW_DURATION_MS: u64 = 2000;
    pub const DEFAULT_DOT_DURATION_MS: u64 = 3000;
    pub const DEFAULT_DOT_INTERVAL_MS: u64 = 500;

    /// Special abilities
    pub const STEALTH_TOGGLE_MS: u64 = 2000;
    pub const DASH_CYCLE_MS: u64 = 3000;
    pub const DASH_ACTIVE_MS: u64 = 1000;
    pub const DASH_SPEED_MULTIPLIER: f32 = 3.0;
    pub const BROOD_SIZE: usize = 3;
    /// Brood spawns land within ±half of this around the parent
    pub const BROOD_SPREAD: f32 = 50.0;
    pub const BROOD_ADVERSARY_ID: &str = "bug_small";

    /// Spawn placement
    pub const SPAWN_EDGE_MARGIN: f32 = 20.0;
    pub const SPAWN_LANE_INSET: f32 = 50.0;
    pub const DEFAULT_SPAWN_INTERVAL_MS: u64 = 1000;

    /// Session timing (ms)
    pub const INTRO_DELAY_MS: u64 = 1000;
    pub const WAVE_WARMUP_MS: u64 = 3000;
    pub const WAVE_TRANSITION_MS: u64 = 3000;

    /// Scoring
    pub const WAVE_CLEAR_BONUS: u64 = 100;
    pub const MULTI_KILL_BONUS_PER_KILL: u64 = 50;
    pub const MULTI_KILL_THRESHOLD: u32 = 2;
    /// Barrier length assumed when a kill has no recorded barrier
    pub const DEFAULT_KILL_BARRIER_LENGTH: f32 = 150.0;
    pub const NO_DAMAGE_BONUS: u64 = 1000;
    pub const DEFAULT_TARGET_BARRIERS: u32 = 20;
}

/// Fixed position of the objective
#[inline]
pub fn objective_position() -> Vec2 {
    Vec2::new(consts::OBJECTIVE_X, consts::OBJECTIVE_Y)
}

/// Whether a pointer y coordinate is inside the drawable band
#[inline]
pub fn in_playfield_band(y: f32) -> bool {
    (consts::PLAYFIELD_TOP..=consts::PLAYFIELD_BOTTOM).contains(&y)
}
