//! Engine configuration.

use crate::error::{SceneError, SceneResult};
use crate::resize::DEFAULT_MIN_SIZE;
use crate::selection::ROTATE_HANDLE_OFFSET;
use crate::snap::{ANGLE_SNAP_INCREMENT, SnapSettings};
use crate::svg::DEFAULT_EXPORT_PADDING;
use serde::{Deserialize, Serialize};

/// Default duration of animated viewport changes, in milliseconds.
pub const DEFAULT_ANIMATION_MS: u64 = 300;

/// Accent colors handed out to elements created by drag-and-drop.
pub const DEFAULT_ACCENT_PALETTE: [&str; 8] = [
    "#6366f1", "#ec4899", "#f59e0b", "#10b981", "#3b82f6", "#ef4444", "#8b5cf6", "#14b8a6",
];

/// Tunable settings for a [`Store`](crate::store::Store).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Grid snapping for move and resize.
    pub snap: SnapSettings,
    /// Smallest width/height a resize may produce.
    pub min_element_size: f64,
    /// Distance of rotation handles from the box corners.
    pub rotate_handle_offset: f64,
    /// Increment used when rotation snapping is engaged.
    pub rotation_snap_degrees: f64,
    /// Padding around exported SVG documents.
    pub export_padding: f64,
    /// Duration of animated viewport changes.
    pub animation_duration_ms: u64,
    /// Colors assigned to dropped elements.
    pub accent_palette: Vec<String>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            snap: SnapSettings::default(),
            min_element_size: DEFAULT_MIN_SIZE,
            rotate_handle_offset: ROTATE_HANDLE_OFFSET,
            rotation_snap_degrees: ANGLE_SNAP_INCREMENT,
            export_padding: DEFAULT_EXPORT_PADDING,
            animation_duration_ms: DEFAULT_ANIMATION_MS,
            accent_palette: DEFAULT_ACCENT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl SceneConfig {
    /// Parse and validate a configuration document.
    pub fn from_json(json: &str) -> SceneResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SceneError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot work with.
    pub fn validate(&self) -> SceneResult<()> {
        if !(self.snap.grid_size > 0.0) {
            return Err(SceneError::Config(format!(
                "grid_size must be positive, got {}",
                self.snap.grid_size
            )));
        }
        if self.min_element_size < 0.0 {
            return Err(SceneError::Config(format!(
                "min_element_size must not be negative, got {}",
                self.min_element_size
            )));
        }
        if !(self.rotation_snap_degrees > 0.0) {
            return Err(SceneError::Config(format!(
                "rotation_snap_degrees must be positive, got {}",
                self.rotation_snap_degrees
            )));
        }
        if self.accent_palette.is_empty() {
            return Err(SceneError::Config("accent_palette is empty".to_string()));
        }
        Ok(())
    }
}
