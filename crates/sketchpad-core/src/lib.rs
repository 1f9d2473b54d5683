//! Sketchpad Core Library
//!
//! Scene geometry and transform engine for an infinite design canvas:
//! elements and vector paths, the viewport transform, snapping, resize and
//! rotate, z-order and grouping, viewport tweening and SVG export. Nothing
//! here renders; callers feed in geometry and read back new scene state.

pub mod animation;
pub mod arrange;
pub mod config;
pub mod element;
pub mod error;
pub mod group;
pub mod interaction;
pub mod resize;
pub mod rotate;
pub mod scene;
pub mod selection;
pub mod snap;
pub mod store;
pub mod svg;
pub mod viewport;

pub use animation::{ViewportTween, ease_out_expo};
pub use config::SceneConfig;
pub use element::{Element, ElementId, ElementKind, ElementPatch, ElementStyle, PathData, PathPoint};
pub use error::{SceneError, SceneResult};
pub use interaction::{DragMode, DragState, Modifiers};
pub use resize::{ResizeOptions, ScaleMode, resize};
pub use rotate::{angle, rotation_delta};
pub use scene::Scene;
pub use selection::{HandleKind, ResizeHandle, RotateCorner};
pub use snap::{SnapSettings, snap_angle, snap_to_grid};
pub use store::{DropPayload, Store};
pub use svg::{ExportOptions, elements_to_svg};
pub use viewport::{MAX_ZOOM, MIN_ZOOM, ViewportState, canvas_to_screen, screen_to_canvas};
