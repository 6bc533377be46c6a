//! Deferred events evaluated against the simulation clock
//!
//! Replaces engine timers: an entry fires on the first tick where
//! `due_at_ms <= now`. Nothing runs outside `tick`, so cancelling is just
//! dropping entries.

use serde::{Deserialize, Serialize};

/// What a scheduled entry does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledKind {
    /// Announce the next wave and start its warm-up
    BeginWave { wave_index: usize },
    /// Warm-up over: shuffle the roster and start spawning
    BeginSpawning { wave_index: usize },
    /// Spawn the next queued adversary
    SpawnNext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub due_at_ms: u64,
    /// Insertion order, breaks ties between equal due times
    pub seq: u64,
    pub kind: ScheduledKind,
}

/// Pending deferred events
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    entries: Vec<ScheduledEvent>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_at_ms: u64, kind: ScheduledKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(ScheduledEvent {
            due_at_ms,
            seq,
            kind,
        });
    }

    /// Remove and return the earliest entry due at `now_ms`, if any
    pub fn pop_due(&mut self, now_ms: u64) -> Option<ScheduledEvent> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_at_ms <= now_ms)
            .min_by_key(|(_, e)| (e.due_at_ms, e.seq))
            .map(|(i, _)| i)?;
        Some(self.entries.remove(index))
    }

    /// Drop every pending entry; returns how many were cancelled
    pub fn cancel_all(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = &ScheduledEvent> {
        self.entries.iter()
    }
}
