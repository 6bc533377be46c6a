//! Session state and core simulation types
//!
//! One `SessionState` owns everything a run mutates. Collaborators read it
//! through `snapshot()` and the drained `GameEvent` queue, never directly.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::adversary::Adversary;
use super::barrier::Barrier;
use super::gesture::Gesture;
use super::schedule::{ScheduledKind, Scheduler};
use super::wave::WaveDirector;
use crate::config::{
    Difficulty, DifficultySettings, Direction, GameConfig, SessionSetup, Stage, Upgrades,
};
use crate::consts::*;
use crate::error::ConfigError;
use crate::results::SessionResult;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Short lead-in before the first wave
    Intro,
    /// Approach directions announced, spawning starts after the warm-up
    WaveWarmup,
    /// Roster is being spawned and fought
    Spawning,
    /// Wave cleared, waiting to announce the next one
    WaveClearing,
    /// Every wave cleared (terminal)
    StageCleared,
    /// Objective destroyed (terminal)
    Failed,
}

impl GamePhase {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::StageCleared | GamePhase::Failed)
    }
}

/// Running statistics for grading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub barriers_used: u32,
    pub total_kills: u32,
    /// Barriers that expired with two or more kills
    pub multi_kill_count: u32,
    /// Adversaries that reached the objective
    pub damage_taken: u32,
    pub elapsed_ms: u64,
}

/// Notifications for rendering/UI/audio, drained once per frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    ObjectiveDamaged { health: u32, max_health: u32 },
    ScoreChanged { score: u64 },
    /// Approach-direction warning at the start of a wave's warm-up
    WaveIncoming {
        wave_index: usize,
        directions: Vec<Direction>,
    },
    /// `wave_number` is 1-based (waves cleared so far)
    WaveCleared {
        wave_number: usize,
        total_waves: usize,
    },
    AdversarySpawned {
        id: u32,
        kind: String,
        position: Vec2,
    },
    AdversaryKilled {
        id: u32,
        kind: String,
        points: u64,
    },
    BarrierPlaced { id: u32, length: f32 },
    /// Barrier left the field by expiring or by being evicted at the cap
    BarrierExpired { id: u32, kill_count: u32 },
    MultiKill {
        barrier_id: u32,
        kill_count: u32,
        bonus: u64,
    },
    BarrierExploded { barrier_id: u32, position: Vec2 },
    ShieldBroken { adversary_id: u32 },
    SessionEnded(SessionResult),
}

/// Complete session state (deterministic for a given setup and input stream)
#[derive(Debug, Clone)]
pub struct SessionState {
    pub config: GameConfig,
    pub stage: Stage,
    pub difficulty: Difficulty,
    pub settings: DifficultySettings,
    pub upgrades: Upgrades,
    pub seed: u64,

    /// Virtual clock, advanced only by `tick`
    pub now_ms: u64,
    pub phase: GamePhase,
    /// Wave currently announced, spawning or last cleared
    pub wave_index: usize,
    pub waves_cleared: usize,
    pub score: u64,
    pub objective_health: u32,
    pub objective_max_health: u32,

    /// Active barriers in placement order (oldest first)
    pub barriers: Vec<Barrier>,
    pub adversaries: Vec<Adversary>,
    pub director: WaveDirector,
    pub scheduler: Scheduler,
    pub rng: Pcg32,
    pub stats: Stats,

    pub gesture: Option<Gesture>,
    /// Time of the last accepted barrier (draw cooldown)
    pub last_draw_ms: Option<u64>,
    pub selected_barrier: String,
    pub result: Option<SessionResult>,

    events: Vec<GameEvent>,
    next_id: u32,
    torn_down: bool,
}

impl SessionState {
    /// Start a session; the first wave is announced after the intro delay
    pub fn new(config: &GameConfig, setup: SessionSetup) -> Result<Self, ConfigError> {
        config.validate()?;
        let stage = config
            .stage(setup.stage_id)
            .cloned()
            .ok_or(ConfigError::UnknownStage(setup.stage_id))?;
        if stage.waves.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "stage {} has no waves",
                stage.id
            )));
        }

        let selected_barrier = config
            .barrier("basic")
            .or_else(|| config.walls.first())
            .map(|w| w.id.clone())
            .ok_or_else(|| ConfigError::Invalid("no barrier types configured".into()))?;

        let settings = setup.difficulty.settings();
        let objective_max_health = (stage.cpu_hp + setup.upgrades.objective_bonus())
            .saturating_sub(settings.objective_hp_penalty)
            .max(1);

        let mut scheduler = Scheduler::new();
        scheduler.schedule(INTRO_DELAY_MS, ScheduledKind::BeginWave { wave_index: 0 });

        log::info!(
            "Session start: stage {} ({}), {}, seed {}, objective {} hp, {} waves",
            stage.id,
            stage.name,
            setup.difficulty.as_str(),
            setup.seed,
            objective_max_health,
            stage.waves.len()
        );

        Ok(Self {
            config: config.clone(),
            stage,
            difficulty: setup.difficulty,
            settings,
            upgrades: setup.upgrades,
            seed: setup.seed,
            now_ms: 0,
            phase: GamePhase::Intro,
            wave_index: 0,
            waves_cleared: 0,
            score: 0,
            objective_health: objective_max_health,
            objective_max_health,
            barriers: Vec::new(),
            adversaries: Vec::new(),
            director: WaveDirector::new(),
            scheduler,
            rng: Pcg32::seed_from_u64(setup.seed),
            stats: Stats::default(),
            gesture: None,
            last_draw_ms: None,
            selected_barrier,
            result: None,
            events: Vec::new(),
            next_id: 1,
            torn_down: false,
        })
    }

    /// Get next entity ID (barriers and adversaries share the sequence)
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every notification queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn total_waves(&self) -> usize {
        self.stage.waves.len()
    }

    pub fn barrier_cap(&self) -> usize {
        self.upgrades.barrier_cap()
    }

    /// Draw cooldown has elapsed (always true before the first barrier)
    pub fn can_draw(&self) -> bool {
        self.last_draw_ms
            .is_none_or(|last| self.now_ms.saturating_sub(last) >= DRAW_COOLDOWN_MS)
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Stop the session: cancel every pending deferred event and drop any
    /// in-progress gesture. Later ticks and commands are ignored.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        let cancelled = self.scheduler.cancel_all();
        self.gesture = None;
        self.torn_down = true;
        log::info!(
            "Session torn down at {}ms ({} scheduled events cancelled)",
            self.now_ms,
            cancelled
        );
    }

    /// Read-only view for renderers
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            now_ms: self.now_ms,
            phase: self.phase,
            wave_index: self.wave_index,
            total_waves: self.total_waves(),
            spawned: self.director.spawn_index(),
            wave_size: self.director.total(),
            score: self.score,
            objective_health: self.objective_health,
            objective_max_health: self.objective_max_health,
            selected_barrier: self.selected_barrier.clone(),
            barriers: self
                .barriers
                .iter()
                .map(|b| BarrierView {
                    id: b.id,
                    points: b.points().to_vec(),
                    color: b.kind.color_rgb(),
                    remaining: b.remaining_fraction(self.now_ms),
                })
                .collect(),
            adversaries: self
                .adversaries
                .iter()
                .map(|a| AdversaryView {
                    id: a.id,
                    kind: a.kind.clone(),
                    position: a.pos,
                    radius: a.radius,
                    health_fraction: if a.max_health > 0.0 {
                        (a.health / a.max_health).clamp(0.0, 1.0)
                    } else {
                        0.0
                    },
                    alpha: a.alpha(),
                    dashing: a.dashing,
                    stunned: a.stunned,
                    shielded: a.shield_active,
                })
                .collect(),
            gesture: self
                .gesture
                .as_ref()
                .map(|g| g.points().to_vec())
                .unwrap_or_default(),
            stats: self.stats,
        }
    }
}

/// Serializable frame of state for a renderer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub now_ms: u64,
    pub phase: GamePhase,
    pub wave_index: usize,
    pub total_waves: usize,
    /// Spawn progress through the current wave
    pub spawned: usize,
    pub wave_size: usize,
    pub score: u64,
    pub objective_health: u32,
    pub objective_max_health: u32,
    pub selected_barrier: String,
    pub barriers: Vec<BarrierView>,
    pub adversaries: Vec<AdversaryView>,
    /// Preview of the stroke being drawn
    pub gesture: Vec<Vec2>,
    pub stats: Stats,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarrierView {
    pub id: u32,
    pub points: Vec<Vec2>,
    pub color: u32,
    /// Remaining life, 1.0 when placed
    pub remaining: f32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdversaryView {
    pub id: u32,
    pub kind: String,
    pub position: Vec2,
    pub radius: f32,
    pub health_fraction: f32,
    pub alpha: f32,
    pub dashing: bool,
    pub stunned: bool,
    pub shielded: bool,
}
