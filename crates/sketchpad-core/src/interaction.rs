//! Drag state machine for pan, move, resize and rotate gestures.
//!
//! `begin` captures the starting geometry, `update` recomputes the result
//! from that captured state (never by accumulating deltas) and `end` drops
//! it. Pointer positions are container-relative screen coordinates.

use crate::config::SceneConfig;
use crate::element::ElementId;
use crate::resize::{ResizeOptions, resize_snapped};
use crate::rotate::RotationDrag;
use crate::selection::ResizeHandle;
use crate::snap::snap_point;
use crate::viewport::{ViewportState, screen_delta_to_canvas};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Keyboard modifiers held during a gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };
}

/// Kind of gesture to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Pan,
    Move,
    Resize(ResizeHandle),
    Rotate,
}

/// Active gesture and the geometry captured when it began.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Panning {
        start_pointer: Point,
        start_viewport: ViewportState,
    },
    Moving {
        start_pointer: Point,
        viewport: ViewportState,
        /// Starting position of every moved element.
        origins: Vec<(ElementId, Point)>,
    },
    Resizing {
        start_pointer: Point,
        viewport: ViewportState,
        id: ElementId,
        handle: ResizeHandle,
        start_bounds: Rect,
        rotation: f64,
    },
    Rotating {
        viewport: ViewportState,
        id: ElementId,
        drag: RotationDrag,
    },
}

/// What an update asks the owner to commit.
#[derive(Debug, Clone, PartialEq)]
pub enum DragUpdate {
    None,
    Viewport(ViewportState),
    Positions(Vec<(ElementId, Point)>),
    Bounds { id: ElementId, bounds: Rect },
    Rotation { id: ElementId, rotation: f64 },
}

impl DragState {
    pub fn is_idle(&self) -> bool {
        matches!(self, DragState::Idle)
    }

    pub fn mode(&self) -> Option<DragMode> {
        match self {
            DragState::Idle => None,
            DragState::Panning { .. } => Some(DragMode::Pan),
            DragState::Moving { .. } => Some(DragMode::Move),
            DragState::Resizing { handle, .. } => Some(DragMode::Resize(*handle)),
            DragState::Rotating { .. } => Some(DragMode::Rotate),
        }
    }

    /// Recompute the gesture result for the current pointer position.
    ///
    /// Shift locks the aspect ratio while resizing and snaps the angle while
    /// rotating.
    pub fn update(&self, pointer: Point, modifiers: Modifiers, config: &SceneConfig) -> DragUpdate {
        match self {
            DragState::Idle => DragUpdate::None,
            DragState::Panning {
                start_pointer,
                start_viewport,
            } => DragUpdate::Viewport(start_viewport.panned_by(pointer - *start_pointer)),
            DragState::Moving {
                start_pointer,
                viewport,
                origins,
            } => {
                let delta = screen_delta_to_canvas(pointer - *start_pointer, viewport);
                DragUpdate::Positions(
                    origins
                        .iter()
                        .map(|(id, origin)| (*id, moved_position(*origin, delta, config)))
                        .collect(),
                )
            }
            DragState::Resizing {
                start_pointer,
                viewport,
                id,
                handle,
                start_bounds,
                rotation,
            } => {
                let delta = screen_delta_to_canvas(pointer - *start_pointer, viewport);
                let opts = ResizeOptions::for_rotation(*rotation)
                    .with_aspect_lock(modifiers.shift)
                    .with_min_size(config.min_element_size);
                DragUpdate::Bounds {
                    id: *id,
                    bounds: resize_snapped(*start_bounds, *handle, delta, &opts, &config.snap),
                }
            }
            DragState::Rotating { viewport, id, drag } => {
                let canvas_pointer = viewport.inverse_transform() * pointer;
                let snap = modifiers.shift.then_some(config.rotation_snap_degrees);
                DragUpdate::Rotation {
                    id: *id,
                    rotation: drag.update(canvas_pointer, snap),
                }
            }
        }
    }
}

/// Position after a move, snapped to the grid when snapping is on.
pub fn moved_position(origin: Point, delta: Vec2, config: &SceneConfig) -> Point {
    let moved = origin + delta;
    if config.snap.is_active() {
        snap_point(moved, config.snap.grid_size)
    } else {
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snap::SnapSettings;
    use uuid::Uuid;

    #[test]
    fn test_idle_update_is_noop() {
        let state = DragState::default();
        assert!(state.is_idle());
        assert_eq!(state.mode(), None);
        assert_eq!(
            state.update(Point::new(5.0, 5.0), Modifiers::NONE, &SceneConfig::default()),
            DragUpdate::None
        );
    }

    #[test]
    fn test_pan_recomputes_from_start() {
        let state = DragState::Panning {
            start_pointer: Point::new(100.0, 100.0),
            start_viewport: ViewportState::new(Vec2::new(10.0, 10.0), 2.0),
        };
        let config = SceneConfig::default();
        // Repeated updates with the same pointer give the same result.
        for _ in 0..3 {
            let update = state.update(Point::new(130.0, 90.0), Modifiers::NONE, &config);
            assert_eq!(update, DragUpdate::Viewport(ViewportState::new(Vec2::new(40.0, 0.0), 2.0)));
        }
    }

    #[test]
    fn test_move_converts_screen_delta() {
        let id = Uuid::new_v4();
        let state = DragState::Moving {
            start_pointer: Point::new(0.0, 0.0),
            viewport: ViewportState::new(Vec2::ZERO, 2.0),
            origins: vec![(id, Point::new(10.0, 10.0))],
        };
        let update = state.update(Point::new(20.0, -8.0), Modifiers::NONE, &SceneConfig::default());
        assert_eq!(update, DragUpdate::Positions(vec![(id, Point::new(20.0, 6.0))]));
    }

    #[test]
    fn test_move_snaps() {
        let id = Uuid::new_v4();
        let state = DragState::Moving {
            start_pointer: Point::ZERO,
            viewport: ViewportState::default(),
            origins: vec![(id, Point::new(0.0, 0.0))],
        };
        let config = SceneConfig {
            snap: SnapSettings::grid(20.0),
            ..Default::default()
        };
        let update = state.update(Point::new(27.0, 9.0), Modifiers::NONE, &config);
        assert_eq!(update, DragUpdate::Positions(vec![(id, Point::new(20.0, 0.0))]));
    }

    #[test]
    fn test_resize_with_shift_locks_aspect() {
        let id = Uuid::new_v4();
        let state = DragState::Resizing {
            start_pointer: Point::ZERO,
            viewport: ViewportState::default(),
            id,
            handle: ResizeHandle::Se,
            start_bounds: Rect::new(0.0, 0.0, 100.0, 50.0),
            rotation: 0.0,
        };
        let config = SceneConfig::default();
        let free = state.update(Point::new(50.0, 0.0), Modifiers::NONE, &config);
        assert_eq!(free, DragUpdate::Bounds { id, bounds: Rect::new(0.0, 0.0, 150.0, 50.0) });
        let locked = state.update(Point::new(50.0, 0.0), Modifiers::SHIFT, &config);
        assert_eq!(locked, DragUpdate::Bounds { id, bounds: Rect::new(0.0, 0.0, 150.0, 75.0) });
    }

    #[test]
    fn test_rotate_with_shift_snaps() {
        let id = Uuid::new_v4();
        let viewport = ViewportState::default();
        let drag = RotationDrag::begin(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 0.0);
        let state = DragState::Rotating { viewport, id, drag };
        let pointer = Point::new(10.0, 10.0 * 20f64.to_radians().tan());
        let config = SceneConfig::default();
        match state.update(pointer, Modifiers::SHIFT, &config) {
            DragUpdate::Rotation { rotation, .. } => assert!((rotation - 15.0).abs() < 1e-9),
            other => panic!("unexpected update {other:?}"),
        }
        match state.update(pointer, Modifiers::NONE, &config) {
            DragUpdate::Rotation { rotation, .. } => assert!((rotation - 20.0).abs() < 1e-9),
            other => panic!("unexpected update {other:?}"),
        }
    }
}
