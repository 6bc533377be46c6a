//! Point/segment distance math for barrier collision

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A straight piece of a barrier polyline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
}

impl Segment {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    #[inline]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        distance_point_to_segment(point, self.start, self.end)
    }
}

/// Distance from `point` to the closest point on segment `start..end`
///
/// Projects onto the segment and clamps to its endpoints. A degenerate
/// segment is treated as a single point.
pub fn distance_point_to_segment(point: Vec2, start: Vec2, end: Vec2) -> f32 {
    let line_vec = end - start;
    let len_sq = line_vec.length_squared();

    if len_sq == 0.0 {
        return point.distance(start);
    }

    let t = ((point - start).dot(line_vec) / len_sq).clamp(0.0, 1.0);
    let closest = start + line_vec * t;
    point.distance(closest)
}

/// Total length of a polyline
pub fn polyline_length(points: &[Vec2]) -> f32 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Consecutive point pairs as segments
pub fn segments_of(points: &[Vec2]) -> Vec<Segment> {
    points.windows(2).map(|w| Segment::new(w[0], w[1])).collect()
}
