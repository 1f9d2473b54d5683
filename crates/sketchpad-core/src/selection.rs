//! Selection handles: positions, hit testing and resize cursors.

use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::SQRT_2;

/// Handle hit tolerance in screen pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 10.0;
/// Distance of rotation handles from the box corners (canvas units).
pub const ROTATE_HANDLE_OFFSET: f64 = 20.0;

/// One of the eight resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

/// Resize handles in clockwise order starting at north. Each occupies one
/// 45° slot.
pub const RESIZE_HANDLES: [ResizeHandle; 8] = [
    ResizeHandle::N,
    ResizeHandle::Ne,
    ResizeHandle::E,
    ResizeHandle::Se,
    ResizeHandle::S,
    ResizeHandle::Sw,
    ResizeHandle::W,
    ResizeHandle::Nw,
];

impl ResizeHandle {
    /// Position in the clockwise slot sequence.
    pub fn slot(self) -> usize {
        match self {
            ResizeHandle::N => 0,
            ResizeHandle::Ne => 1,
            ResizeHandle::E => 2,
            ResizeHandle::Se => 3,
            ResizeHandle::S => 4,
            ResizeHandle::Sw => 5,
            ResizeHandle::W => 6,
            ResizeHandle::Nw => 7,
        }
    }

    pub fn from_slot(slot: usize) -> Self {
        RESIZE_HANDLES[slot % 8]
    }

    pub fn is_corner(self) -> bool {
        matches!(self, ResizeHandle::Ne | ResizeHandle::Se | ResizeHandle::Sw | ResizeHandle::Nw)
    }

    pub fn moves_left(self) -> bool {
        matches!(self, ResizeHandle::Nw | ResizeHandle::W | ResizeHandle::Sw)
    }

    pub fn moves_right(self) -> bool {
        matches!(self, ResizeHandle::Ne | ResizeHandle::E | ResizeHandle::Se)
    }

    pub fn moves_top(self) -> bool {
        matches!(self, ResizeHandle::Nw | ResizeHandle::N | ResizeHandle::Ne)
    }

    pub fn moves_bottom(self) -> bool {
        matches!(self, ResizeHandle::Sw | ResizeHandle::S | ResizeHandle::Se)
    }

    /// Unit direction from the box center towards this handle
    /// (`-1`, `0` or `1` on each axis).
    pub fn direction(self) -> Vec2 {
        let x = if self.moves_left() {
            -1.0
        } else if self.moves_right() {
            1.0
        } else {
            0.0
        };
        let y = if self.moves_top() {
            -1.0
        } else if self.moves_bottom() {
            1.0
        } else {
            0.0
        };
        Vec2::new(x, y)
    }

    /// Handle position on an unrotated box.
    pub fn position_on(self, rect: Rect) -> Point {
        let center = rect.center();
        let dir = self.direction();
        Point::new(
            center.x + dir.x * rect.width() / 2.0,
            center.y + dir.y * rect.height() / 2.0,
        )
    }

    /// CSS cursor for this handle on an element rotated by `rotation` degrees.
    ///
    /// The rotation shifts the cursor by `round(rotation / 45)` slots, so a
    /// handle that visually points north-east shows the north-east cursor.
    pub fn cursor(self, rotation: f64) -> &'static str {
        let shift = (rotation / 45.0).round() as i64;
        let slot = (self.slot() as i64 + shift).rem_euclid(8) as usize;
        ResizeHandle::from_slot(slot).css_cursor()
    }

    /// CSS cursor for the unrotated handle.
    pub fn css_cursor(self) -> &'static str {
        match self {
            ResizeHandle::N => "n-resize",
            ResizeHandle::Ne => "ne-resize",
            ResizeHandle::E => "e-resize",
            ResizeHandle::Se => "se-resize",
            ResizeHandle::S => "s-resize",
            ResizeHandle::Sw => "sw-resize",
            ResizeHandle::W => "w-resize",
            ResizeHandle::Nw => "nw-resize",
        }
    }
}

/// One of the four rotation handles, diagonally outside each corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotateCorner {
    Nw,
    Ne,
    Se,
    Sw,
}

pub const ROTATE_CORNERS: [RotateCorner; 4] =
    [RotateCorner::Nw, RotateCorner::Ne, RotateCorner::Se, RotateCorner::Sw];

impl RotateCorner {
    fn as_resize(self) -> ResizeHandle {
        match self {
            RotateCorner::Nw => ResizeHandle::Nw,
            RotateCorner::Ne => ResizeHandle::Ne,
            RotateCorner::Se => ResizeHandle::Se,
            RotateCorner::Sw => ResizeHandle::Sw,
        }
    }

    /// Handle position on an unrotated box, `offset` away from the corner
    /// along the 45° diagonal.
    pub fn position_on(self, rect: Rect, offset: f64) -> Point {
        let corner = self.as_resize().position_on(rect);
        let dir = self.as_resize().direction();
        let step = offset / SQRT_2;
        Point::new(corner.x + dir.x * step, corner.y + dir.y * step)
    }
}

/// Kind of handle hit by the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    Resize(ResizeHandle),
    Rotate(RotateCorner),
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Position in canvas coordinates.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point (in canvas coordinates) hits this handle.
    /// `tolerance` should be adjusted for the viewport zoom.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= tolerance * tolerance
    }
}

/// All handles of a box rotated by `rotation` degrees about its center.
///
/// Resize handles come first (clockwise from north), then rotation handles.
pub fn get_handles(rect: Rect, rotation: f64, rotate_offset: f64) -> Vec<Handle> {
    let rotate = Affine::rotate_about(rotation.to_radians(), rect.center());
    let resize = RESIZE_HANDLES
        .iter()
        .map(|&h| Handle::new(rotate * h.position_on(rect), HandleKind::Resize(h)));
    let rotation_handles = ROTATE_CORNERS
        .iter()
        .map(|&c| Handle::new(rotate * c.position_on(rect, rotate_offset), HandleKind::Rotate(c)));
    resize.chain(rotation_handles).collect()
}

/// Find which handle (if any) is hit at the given canvas point.
///
/// `zoom` converts the screen-pixel hit tolerance into canvas units.
pub fn hit_test_handles(
    rect: Rect,
    rotation: f64,
    rotate_offset: f64,
    point: Point,
    zoom: f64,
) -> Option<HandleKind> {
    let tolerance = HANDLE_HIT_TOLERANCE / zoom;
    get_handles(rect, rotation, rotate_offset)
        .into_iter()
        .find(|h| h.hit_test(point, tolerance))
        .map(|h| h.kind)
}
