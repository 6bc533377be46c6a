//! In-progress barrier drawing
//!
//! Samples pointer positions into a polyline and cuts it off at the
//! difficulty's maximum length, so anything handed to `Barrier::new` is
//! already within bounds.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::DRAW_POINT_SPACING;

/// Outcome of feeding one pointer sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureStep {
    /// Too close to the previous point, not finite, or gesture already closed
    Ignored,
    Added,
    /// Reached the maximum length; the gesture is closed
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gesture {
    points: Vec<Vec2>,
    length: f32,
    max_length: f32,
    closed: bool,
}

impl Gesture {
    pub fn begin(start: Vec2, max_length: f32) -> Self {
        Self {
            points: vec![start],
            length: 0.0,
            max_length,
            closed: false,
        }
    }

    pub fn extend(&mut self, point: Vec2) -> GestureStep {
        if self.closed || !point.is_finite() {
            return GestureStep::Ignored;
        }
        let Some(&last) = self.points.last() else {
            return GestureStep::Ignored;
        };

        let dist = last.distance(point);
        if dist < DRAW_POINT_SPACING {
            return GestureStep::Ignored;
        }

        if self.length + dist > self.max_length {
            // Truncate the last stroke so the total lands exactly on the cap
            let remaining = self.max_length - self.length;
            if remaining > 0.0 {
                self.points.push(last + (point - last) / dist * remaining);
            }
            self.length = self.max_length;
            self.closed = true;
            return GestureStep::Completed;
        }

        self.points.push(point);
        self.length += dist;
        GestureStep::Added
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn into_points(self) -> Vec<Vec2> {
        self.points
    }
}
