//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Virtual clock only (integer milliseconds supplied to `tick`)
//! - Seeded RNG only
//! - Stable iteration order (placement/spawn order)
//! - No rendering, audio or platform dependencies

pub mod adversary;
pub mod barrier;
pub mod combat;
pub mod geometry;
pub mod gesture;
pub mod schedule;
pub mod state;
pub mod tick;
pub mod wave;

pub use adversary::{Adversary, BarrierHit, DamageOverTime};
pub use barrier::Barrier;
pub use combat::{CombatReport, kill_score, length_multiplier, multi_kill_bonus, resolve_collisions};
pub use geometry::{Segment, distance_point_to_segment, polyline_length};
pub use gesture::{Gesture, GestureStep};
pub use schedule::{ScheduledEvent, ScheduledKind, Scheduler};
pub use state::{AdversaryView, BarrierView, GameEvent, GamePhase, SessionState, Snapshot, Stats};
pub use tick::{Command, TickInput, apply_command, tick};
pub use wave::{SpawnRequest, WaveDirector, expand_roster, parse_wave, spawn_position};
