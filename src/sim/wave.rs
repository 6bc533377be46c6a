//! Wave director: roster expansion, spawn cadence and clear detection

use glam::Vec2;
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};

use super::schedule::{ScheduledKind, Scheduler};
use crate::config::{DifficultySettings, Direction, WaveSpec};
use crate::consts::*;
use crate::error::SimError;

/// Split one `id:count` roster entry
pub fn parse_entry(entry: &str) -> Result<(&str, u32), SimError> {
    let malformed = || SimError::MalformedWave {
        entry: entry.trim().to_string(),
    };
    let (id, count) = entry.split_once(':').ok_or_else(malformed)?;
    let id = id.trim();
    if id.is_empty() {
        return Err(malformed());
    }
    let count = count.trim().parse::<u32>().map_err(|_| malformed())?;
    Ok((id, count))
}

/// Expand a wave's compact roster into a flat id list (authored order),
/// scaling each count by the difficulty multiplier. Malformed entries are
/// logged and skipped.
pub fn expand_roster(wave: &WaveSpec, settings: &DifficultySettings) -> Vec<String> {
    let mut roster = Vec::new();
    for entry in wave.enemies.split(',') {
        match parse_entry(entry) {
            Ok((id, count)) => {
                let count = settings.scale_count(count);
                roster.extend(std::iter::repeat_n(id.to_string(), count));
            }
            Err(e) => log::warn!("Skipping wave entry: {}", e),
        }
    }
    roster
}

/// Expanded and shuffled roster so types interleave
pub fn parse_wave<R: Rng + ?Sized>(
    wave: &WaveSpec,
    settings: &DifficultySettings,
    rng: &mut R,
) -> Vec<String> {
    let mut roster = expand_roster(wave, settings);
    roster.shuffle(rng);
    roster
}

/// Entry point on the playfield edge for an approach direction
pub fn spawn_position<R: Rng + ?Sized>(direction: Direction, rng: &mut R) -> Vec2 {
    let x_lane = SPAWN_LANE_INSET..=PLAYFIELD_WIDTH - SPAWN_LANE_INSET;
    let y_lane = PLAYFIELD_TOP + SPAWN_LANE_INSET..=PLAYFIELD_BOTTOM - SPAWN_LANE_INSET;
    match direction {
        Direction::Top => Vec2::new(rng.random_range(x_lane), PLAYFIELD_TOP + SPAWN_EDGE_MARGIN),
        Direction::Bottom => Vec2::new(
            rng.random_range(x_lane),
            PLAYFIELD_BOTTOM - SPAWN_EDGE_MARGIN,
        ),
        Direction::Left => Vec2::new(SPAWN_EDGE_MARGIN, rng.random_range(y_lane)),
        Direction::Right => Vec2::new(
            PLAYFIELD_WIDTH - SPAWN_EDGE_MARGIN,
            rng.random_range(y_lane),
        ),
    }
}

/// A spawn the director wants placed this tick
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    pub adversary_id: String,
    pub direction: Direction,
}

/// Tracks the current wave's spawn queue
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaveDirector {
    queue: Vec<String>,
    spawn_index: usize,
    interval_ms: u64,
    directions: Vec<Direction>,
    /// Spawning has begun for the loaded wave
    started: bool,
}

impl WaveDirector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a wave's shuffled roster. The caller takes the first spawn
    /// straight away with `next_spawn`; later ones come from the scheduler.
    pub fn start_spawning<R: Rng + ?Sized>(
        &mut self,
        wave_index: usize,
        wave: &WaveSpec,
        settings: &DifficultySettings,
        rng: &mut R,
    ) {
        self.queue = parse_wave(wave, settings, rng);
        self.spawn_index = 0;
        self.interval_ms = wave.spawn_interval_ms();
        self.directions = wave.directions.clone();
        self.started = true;

        log::info!(
            "Wave {} spawning {} adversaries every {}ms",
            wave_index + 1,
            self.queue.len(),
            self.interval_ms
        );
    }

    /// Pop the next queued adversary and pick its approach direction.
    /// Schedules the following spawn one interval after `due_at_ms`, or
    /// nothing once the queue is exhausted.
    pub fn next_spawn<R: Rng + ?Sized>(
        &mut self,
        due_at_ms: u64,
        rng: &mut R,
        scheduler: &mut Scheduler,
    ) -> Option<SpawnRequest> {
        let adversary_id = self.queue.get(self.spawn_index)?.clone();
        self.spawn_index += 1;
        let direction = match self.directions.choose(rng) {
            Some(&direction) => direction,
            None => {
                // Sessions reject direction-less waves up front
                log::warn!(
                    "Wave has no approach directions, spawning {} from the right",
                    adversary_id
                );
                Direction::Right
            }
        };

        if !self.is_exhausted() {
            scheduler.schedule(due_at_ms + self.interval_ms, ScheduledKind::SpawnNext);
        }

        Some(SpawnRequest {
            adversary_id,
            direction,
        })
    }

    /// Every queued adversary has been spawned
    pub fn is_exhausted(&self) -> bool {
        self.spawn_index >= self.queue.len()
    }

    /// Spawning began, the queue is spent, and nothing is left alive
    pub fn is_wave_cleared(&self, alive: usize) -> bool {
        self.started && self.is_exhausted() && alive == 0
    }

    /// Forget the current wave (after it clears)
    pub fn finish(&mut self) {
        self.started = false;
    }

    /// Adversaries spawned so far in this wave
    pub fn spawn_index(&self) -> usize {
        self.spawn_index
    }

    /// Size of the wave's expanded roster
    pub fn total(&self) -> usize {
        self.queue.len()
    }
}
