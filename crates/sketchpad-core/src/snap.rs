//! Grid and angle snapping.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Default grid cell size in canvas units.
pub const DEFAULT_GRID_SIZE: f64 = 20.0;

/// Angle snap increment in degrees.
pub const ANGLE_SNAP_INCREMENT: f64 = 15.0;

/// Grid snapping settings consumed by move and resize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapSettings {
    /// Whether snapping is applied at all.
    pub enabled: bool,
    /// Grid cell size (must be positive).
    pub grid_size: f64,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            grid_size: DEFAULT_GRID_SIZE,
        }
    }
}

impl SnapSettings {
    /// Enabled snapping with the given cell size.
    pub fn grid(grid_size: f64) -> Self {
        Self {
            enabled: true,
            grid_size,
        }
    }

    /// Whether snapping should actually be applied.
    pub fn is_active(&self) -> bool {
        self.enabled && self.grid_size > 0.0
    }
}

/// Snap a scalar to the nearest multiple of `grid_size`.
///
/// A non-positive grid leaves the value untouched.
pub fn snap_to_grid(value: f64, grid_size: f64) -> f64 {
    if !(grid_size > 0.0) {
        return value;
    }
    (value / grid_size).round() * grid_size
}

/// Snap both coordinates of a point independently.
pub fn snap_point(point: Point, grid_size: f64) -> Point {
    Point::new(snap_to_grid(point.x, grid_size), snap_to_grid(point.y, grid_size))
}

/// Snap all four edges of a box to the grid.
///
/// Width and height are re-derived from the snapped edges. If the snap
/// collapses a side below `min_size`, that side is widened to at least one
/// grid cell (and never less than `min_size`).
pub fn snap_rect(rect: Rect, grid_size: f64, min_size: f64) -> Rect {
    if !(grid_size > 0.0) {
        return rect;
    }
    let x0 = snap_to_grid(rect.x0, grid_size);
    let y0 = snap_to_grid(rect.y0, grid_size);
    let mut width = snap_to_grid(rect.x1, grid_size) - x0;
    let mut height = snap_to_grid(rect.y1, grid_size) - y0;

    if width < min_size {
        width = (min_size / grid_size).ceil().max(1.0) * grid_size;
    }
    if height < min_size {
        height = (min_size / grid_size).ceil().max(1.0) * grid_size;
    }
    Rect::new(x0, y0, x0 + width, y0 + height)
}

/// Normalize an angle in degrees to `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Snap an angle to the nearest increment.
/// Returns the snapped angle in degrees (0-360).
pub fn snap_angle(angle_degrees: f64, increment: f64) -> f64 {
    if !(increment > 0.0) {
        return normalize_degrees(angle_degrees);
    }
    normalize_degrees((angle_degrees / increment).round() * increment)
}
