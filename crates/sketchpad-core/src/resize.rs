//! Handle-driven resizing of element boxes.

use crate::selection::ResizeHandle;
use crate::snap::{SnapSettings, snap_rect};
use kurbo::{Rect, Vec2};

/// Default minimum width/height a resize may produce.
pub const DEFAULT_MIN_SIZE: f64 = 10.0;

/// How the box responds to a handle drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleMode {
    /// The side or corner opposite the handle stays fixed.
    Edge,
    /// The box grows symmetrically about its center. Used for rotated
    /// elements, where a fixed opposite edge would visibly drift.
    Center,
}

impl ScaleMode {
    pub fn for_rotation(rotation: f64) -> Self {
        if rotation.rem_euclid(360.0).abs() < f64::EPSILON {
            ScaleMode::Edge
        } else {
            ScaleMode::Center
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeOptions {
    pub mode: ScaleMode,
    /// Keep the starting width/height ratio.
    pub keep_aspect: bool,
    pub min_size: f64,
    /// Element rotation in degrees, used by center mode to map the drag
    /// into the element's local frame.
    pub rotation: f64,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            mode: ScaleMode::Edge,
            keep_aspect: false,
            min_size: DEFAULT_MIN_SIZE,
            rotation: 0.0,
        }
    }
}

impl ResizeOptions {
    /// Options for an element with the given rotation; picks the scale mode.
    pub fn for_rotation(rotation: f64) -> Self {
        Self {
            mode: ScaleMode::for_rotation(rotation),
            rotation,
            ..Default::default()
        }
    }

    pub fn with_aspect_lock(mut self, keep_aspect: bool) -> Self {
        self.keep_aspect = keep_aspect;
        self
    }

    pub fn with_min_size(mut self, min_size: f64) -> Self {
        self.min_size = min_size.max(0.0);
        self
    }
}

/// Resize `start` by dragging `handle` by `delta` (canvas units).
///
/// The result never has a side smaller than `opts.min_size`. The minimum is
/// enforced before the aspect ratio is applied and again afterwards by
/// scaling both sides up together.
pub fn resize(start: Rect, handle: ResizeHandle, delta: Vec2, opts: &ResizeOptions) -> Rect {
    let start = start.abs();
    match opts.mode {
        ScaleMode::Edge => resize_from_edges(start, handle, delta, opts),
        ScaleMode::Center => resize_from_center(start, handle, delta, opts),
    }
}

/// [`resize`] followed by grid snapping of all four edges.
///
/// Snapping only applies in edge mode; snapping the edges of a rotated box
/// would move it off its center.
pub fn resize_snapped(
    start: Rect,
    handle: ResizeHandle,
    delta: Vec2,
    opts: &ResizeOptions,
    snap: &SnapSettings,
) -> Rect {
    let rect = resize(start, handle, delta, opts);
    if snap.is_active() && opts.mode == ScaleMode::Edge {
        snap_rect(rect, snap.grid_size, opts.min_size)
    } else {
        rect
    }
}

fn resize_from_edges(start: Rect, handle: ResizeHandle, delta: Vec2, opts: &ResizeOptions) -> Rect {
    let min = opts.min_size;
    let (mut x0, mut y0, mut x1, mut y1) = (start.x0, start.y0, start.x1, start.y1);

    if handle.moves_left() {
        x0 = (x0 + delta.x).min(x1 - min);
    }
    if handle.moves_right() {
        x1 = (x1 + delta.x).max(x0 + min);
    }
    if handle.moves_top() {
        y0 = (y0 + delta.y).min(y1 - min);
    }
    if handle.moves_bottom() {
        y1 = (y1 + delta.y).max(y0 + min);
    }
    let mut size = enforce_min(Vec2::new(x1 - x0, y1 - y0), min);

    if opts.keep_aspect {
        size = lock_aspect(start, handle, size, min);
    }

    // Re-anchor against the edges that did not move.
    let center = start.center();
    let x0 = if handle.moves_left() {
        start.x1 - size.x
    } else if handle.moves_right() {
        start.x0
    } else {
        center.x - size.x / 2.0
    };
    let y0 = if handle.moves_top() {
        start.y1 - size.y
    } else if handle.moves_bottom() {
        start.y0
    } else {
        center.y - size.y / 2.0
    };
    Rect::new(x0, y0, x0 + size.x, y0 + size.y)
}

fn resize_from_center(start: Rect, handle: ResizeHandle, delta: Vec2, opts: &ResizeOptions) -> Rect {
    let (sin, cos) = opts.rotation.to_radians().sin_cos();
    let local = Vec2::new(delta.x * cos + delta.y * sin, -delta.x * sin + delta.y * cos);
    let dir = handle.direction();

    let size = Vec2::new(
        start.width() + 2.0 * dir.x * local.x,
        start.height() + 2.0 * dir.y * local.y,
    );
    let mut size = enforce_min(size, opts.min_size);
    if opts.keep_aspect {
        size = lock_aspect(start, handle, size, opts.min_size);
    }
    Rect::from_center_size(start.center(), (size.x, size.y))
}

fn enforce_min(size: Vec2, min: f64) -> Vec2 {
    Vec2::new(size.x.max(min), size.y.max(min))
}

/// Derive one side from the other using the starting ratio.
///
/// Edge handles drive the side they move. Corner handles drive with
/// whichever side changed more, which flips abruptly near the diagonal.
fn lock_aspect(start: Rect, handle: ResizeHandle, size: Vec2, min: f64) -> Vec2 {
    if start.width() <= 0.0 || start.height() <= 0.0 {
        return size;
    }
    let ratio = start.width() / start.height();

    let width_drives = if handle.is_corner() {
        (size.x - start.width()).abs() >= (size.y - start.height()).abs()
    } else {
        handle.direction().x != 0.0
    };
    let locked = if width_drives {
        Vec2::new(size.x, size.x / ratio)
    } else {
        Vec2::new(size.y * ratio, size.y)
    };

    // Deriving a side can undercut the minimum again; grow both together.
    let factor = (min / locked.x).max(min / locked.y);
    if factor > 1.0 && factor.is_finite() {
        locked * factor
    } else {
        locked
    }
}
