//! Viewport transform: pan/zoom and screen ↔ canvas conversion.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 4.0;

/// Preset zoom steps used by stepped zoom in/out.
pub const ZOOM_LADDER: [f64; 10] = [0.1, 0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 2.0, 3.0, 4.0];

/// Clamp a zoom factor to `[MIN_ZOOM, MAX_ZOOM]`.
pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_nan() {
        return 1.0;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Pan offset and zoom factor mapping canvas space to screen space.
///
/// The zoom factor is always within `[MIN_ZOOM, MAX_ZOOM]`; every
/// constructor and mutator clamps it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawViewport", into = "RawViewport")]
pub struct ViewportState {
    pan: Vec2,
    zoom: f64,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawViewport {
    pan_x: f64,
    pan_y: f64,
    zoom: f64,
}

impl From<RawViewport> for ViewportState {
    fn from(raw: RawViewport) -> Self {
        Self::new(Vec2::new(raw.pan_x, raw.pan_y), raw.zoom)
    }
}

impl From<ViewportState> for RawViewport {
    fn from(viewport: ViewportState) -> Self {
        Self {
            pan_x: viewport.pan.x,
            pan_y: viewport.pan.y,
            zoom: viewport.zoom,
        }
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl ViewportState {
    pub fn new(pan: Vec2, zoom: f64) -> Self {
        Self {
            pan,
            zoom: clamp_zoom(zoom),
        }
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Transform from canvas coordinates to container-relative screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Transform from container-relative screen coordinates to canvas coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan)
    }

    /// Same pan, zoom clamped to range.
    pub fn with_zoom(&self, zoom: f64) -> Self {
        Self::new(self.pan, zoom)
    }

    pub fn with_pan(&self, pan: Vec2) -> Self {
        Self { pan, zoom: self.zoom }
    }

    /// Shift the pan by a screen-space delta.
    pub fn panned_by(&self, delta: Vec2) -> Self {
        self.with_pan(self.pan + delta)
    }

    /// Change zoom while keeping the canvas point under `screen_point` fixed.
    ///
    /// `screen_point` is relative to the viewport container.
    pub fn zoom_to_point(&self, new_zoom: f64, screen_point: Point) -> Self {
        let anchor = self.inverse_transform() * screen_point;
        let zoom = clamp_zoom(new_zoom);
        let pan = screen_point.to_vec2() - anchor.to_vec2() * zoom;
        Self { pan, zoom }
    }

    /// Zoom to the next ladder step above the current zoom, about `screen_point`.
    pub fn zoom_in(&self, screen_point: Point) -> Self {
        self.zoom_to_point(next_zoom_step(self.zoom), screen_point)
    }

    /// Zoom to the next ladder step below the current zoom, about `screen_point`.
    pub fn zoom_out(&self, screen_point: Point) -> Self {
        self.zoom_to_point(previous_zoom_step(self.zoom), screen_point)
    }

    /// Viewport that shows `bounds` centered in a container of `container` size.
    ///
    /// A zero-width or zero-height box (a straight line) fits on its other
    /// axis; a single point is centered at zoom 1.
    pub fn fit_to_bounds(bounds: Rect, container: Size, padding: f64) -> Self {
        let bounds = bounds.abs();
        let available = Size::new(
            (container.width - padding * 2.0).max(1.0),
            (container.height - padding * 2.0).max(1.0),
        );
        let fit_x = (bounds.width() > 0.0).then(|| available.width / bounds.width());
        let fit_y = (bounds.height() > 0.0).then(|| available.height / bounds.height());
        let zoom = clamp_zoom(match (fit_x, fit_y) {
            (Some(x), Some(y)) => x.min(y),
            (Some(z), None) | (None, Some(z)) => z,
            (None, None) => 1.0,
        });

        let center = bounds.center();
        let pan = Vec2::new(
            container.width / 2.0 - center.x * zoom,
            container.height / 2.0 - center.y * zoom,
        );
        Self { pan, zoom }
    }
}

/// Smallest ladder value strictly greater than `zoom`, or the top of the ladder.
pub fn next_zoom_step(zoom: f64) -> f64 {
    ZOOM_LADDER
        .iter()
        .copied()
        .find(|&step| step > zoom + 1e-9)
        .unwrap_or(ZOOM_LADDER[ZOOM_LADDER.len() - 1])
}

/// Largest ladder value strictly less than `zoom`, or the bottom of the ladder.
pub fn previous_zoom_step(zoom: f64) -> f64 {
    ZOOM_LADDER
        .iter()
        .rev()
        .copied()
        .find(|&step| step < zoom - 1e-9)
        .unwrap_or(ZOOM_LADDER[0])
}

/// Convert a screen point to canvas coordinates.
///
/// `container_origin` is the screen position of the viewport container's
/// top-left corner.
pub fn screen_to_canvas(screen: Point, viewport: &ViewportState, container_origin: Point) -> Point {
    let local = screen - container_origin.to_vec2();
    viewport.inverse_transform() * local
}

/// Convert a canvas point to screen coordinates (inverse of [`screen_to_canvas`]).
pub fn canvas_to_screen(canvas: Point, viewport: &ViewportState, container_origin: Point) -> Point {
    viewport.transform() * canvas + container_origin.to_vec2()
}

/// Convert a screen-space drag delta to canvas units.
pub fn screen_delta_to_canvas(delta: Vec2, viewport: &ViewportState) -> Vec2 {
    delta / viewport.zoom()
}
