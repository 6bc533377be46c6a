//! Player-drawn barrier entity
//!
//! Shape is fixed at construction; only age and kill count change afterwards.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Segment, polyline_length, segments_of};
use crate::config::BarrierType;
use crate::consts::*;
use crate::error::SimError;

/// A barrier on the field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Barrier {
    pub id: u32,
    /// Drawn points (at least two)
    points: Vec<Vec2>,
    segments: Vec<Segment>,
    /// Total polyline length
    length: f32,
    pub created_at_ms: u64,
    pub duration_ms: u64,
    pub damage_multiplier: f32,
    /// Adversaries this barrier landed the last hit on
    pub kill_count: u32,
    pub kind: BarrierType,
}

impl Barrier {
    /// Build a barrier from a finished gesture.
    ///
    /// Rejects paths shorter than `BARRIER_MIN_LENGTH` (inclusive lower
    /// bound) and paths with non-finite coordinates. The upper bound is the
    /// gesture's job, not ours.
    pub fn new(
        id: u32,
        points: Vec<Vec2>,
        kind: BarrierType,
        created_at_ms: u64,
        duration_ms: u64,
        damage_multiplier: f32,
    ) -> Result<Self, SimError> {
        debug_assert!(duration_ms > 0, "barrier duration must be positive");
        debug_assert!(
            damage_multiplier >= 0.0,
            "barrier damage multiplier must be non-negative"
        );

        let length = polyline_length(&points);
        if points.len() < 2 || !length.is_finite() || length < BARRIER_MIN_LENGTH {
            return Err(SimError::InvalidGesture { length });
        }

        Ok(Self {
            id,
            segments: segments_of(&points),
            points,
            length,
            created_at_ms,
            duration_ms,
            damage_multiplier,
            kill_count: 0,
            kind,
        })
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[inline]
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.created_at_ms)
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.age_ms(now_ms) >= self.duration_ms
    }

    /// Remaining life in [0, 1], used for fade-out
    pub fn remaining_fraction(&self, now_ms: u64) -> f32 {
        (1.0 - self.age_ms(now_ms) as f32 / self.duration_ms as f32).clamp(0.0, 1.0)
    }

    /// True if any segment comes closer than the adversary radius plus half
    /// the barrier thickness to the adversary's centre
    pub fn intersects(&self, center: Vec2, radius: f32) -> bool {
        let reach = radius + BARRIER_HALF_THICKNESS;
        self.segments.iter().any(|s| s.distance_to(center) < reach)
    }

    pub fn register_kill(&mut self) {
        self.kill_count += 1;
    }
}
