//! Viewport tweening driven by an external frame clock.
//!
//! A tween holds no timer. The owner calls [`ViewportTween::tick`] with the
//! current time on every frame until it reports completion.

use crate::viewport::ViewportState;
use std::time::Duration;

/// Exponential ease-out: fast start, gentle settle. Exactly 1 at `t = 1`.
pub fn ease_out_expo(t: f64) -> f64 {
    if t >= 1.0 {
        1.0
    } else {
        1.0 - 2f64.powf(-10.0 * t)
    }
}

/// Linear interpolation between two scalars.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Interpolate pan and zoom independently.
pub fn lerp_viewport(start: &ViewportState, end: &ViewportState, t: f64) -> ViewportState {
    ViewportState::new(start.pan().lerp(end.pan(), t), lerp(start.zoom(), end.zoom(), t))
}

/// Output of a single tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenFrame {
    pub viewport: ViewportState,
    /// True once the end state has been reached.
    pub done: bool,
}

/// Animation from one viewport state to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTween {
    start: ViewportState,
    end: ViewportState,
    duration: Duration,
    started_at: Duration,
    done: bool,
}

impl ViewportTween {
    /// `started_at` is a timestamp on the same clock later passed to `tick`.
    pub fn new(start: ViewportState, end: ViewportState, duration: Duration, started_at: Duration) -> Self {
        Self {
            start,
            end,
            duration,
            started_at,
            done: false,
        }
    }

    pub fn start(&self) -> ViewportState {
        self.start
    }

    pub fn end(&self) -> ViewportState {
        self.end
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Linear progress in `[0, 1]` at `now`.
    pub fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Advance to `now` and return the live viewport.
    pub fn tick(&mut self, now: Duration) -> TweenFrame {
        let progress = self.progress(now);
        let viewport = if progress >= 1.0 {
            self.done = true;
            self.end
        } else {
            lerp_viewport(&self.start, &self.end, ease_out_expo(progress))
        };
        TweenFrame {
            viewport,
            done: self.done,
        }
    }
}
