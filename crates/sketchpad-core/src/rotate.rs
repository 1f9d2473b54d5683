//! Rotation about an element's center.

use crate::snap::{normalize_degrees, snap_angle};
use kurbo::Point;

/// Angle in degrees from `center` to `point`, normalized to `[0, 360)`.
///
/// On a y-down canvas, increasing angles run clockwise.
pub fn angle(center: Point, point: Point) -> f64 {
    normalize_degrees((point.y - center.y).atan2(point.x - center.x).to_degrees())
}

/// Signed difference `current - start`, wrapped into `[-180, 180]`.
///
/// A drag crossing the 0°/360° boundary yields a small delta instead of a
/// jump of nearly a full turn.
pub fn rotation_delta(start_angle: f64, current_angle: f64) -> f64 {
    let mut delta = current_angle - start_angle;
    if delta > 180.0 {
        delta -= 360.0;
    } else if delta < -180.0 {
        delta += 360.0;
    }
    delta
}

/// Context captured when a rotate drag starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationDrag {
    pub center: Point,
    /// Angle from the center to the pointer at drag start.
    pub start_angle: f64,
    /// Element rotation at drag start.
    pub start_rotation: f64,
}

impl RotationDrag {
    pub fn begin(center: Point, pointer: Point, start_rotation: f64) -> Self {
        Self {
            center,
            start_angle: angle(center, pointer),
            start_rotation,
        }
    }

    /// Rotation for the current pointer position, recomputed from the start
    /// state. `snap_increment` rounds the result when given.
    pub fn update(&self, pointer: Point, snap_increment: Option<f64>) -> f64 {
        let delta = rotation_delta(self.start_angle, angle(self.center, pointer));
        let rotation = normalize_degrees(self.start_rotation + delta);
        match snap_increment {
            Some(increment) => snap_angle(rotation, increment),
            None => rotation,
        }
    }
}
